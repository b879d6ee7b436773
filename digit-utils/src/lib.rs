//! Common helpers shared across the digit recognition crates.

/// Application configuration and settings management.
pub mod config;
/// Image loading, grayscale conversion, and tensor staging.
pub mod image_utils;
/// Synthetic digit images for tests and examples.
pub mod samples;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use config::{AppSettings, RankSettings, SourcePolarity, default_settings_path};
pub use image_utils::{luma_to_scaled_nhwc, resize_luma};
pub use samples::{dark_stroke_on_light, flat_gray, light_stroke_on_dark};
pub use telemetry::{TELEMETRY_TARGET, TimingGuard, timing_guard};

/// Initialize logging once for the CLI and any embedding front end.
///
/// This function respects the `RUST_LOG` environment variable if it is set.
/// Otherwise, it falls back to the provided default filter level.
///
/// # Arguments
///
/// * `default_filter` - The `LevelFilter` to use if `RUST_LOG` is not set.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(TELEMETRY_TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
///
/// # Arguments
///
/// * `path` - The path to validate and normalize.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
