//! Shared configuration types consumed across the digit recognition workspace.
//!
//! These structures provide a common representation for preprocessing and
//! ranking settings that can be serialized to disk and reused by any front end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Pixel polarity convention of a source image.
///
/// The classifier was trained on bright digits over a dark background, so the
/// normalizer performs exactly one inversion for `DarkOnLight` sources and
/// none for `LightOnDark` sources. The convention is declared per source and
/// never auto-detected, which keeps the total number of inversions at one for
/// every path through the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolarity {
    /// Dark digit on a light background (uploads, scans). The default.
    #[default]
    DarkOnLight,
    /// Bright digit on a dark background (drawing-canvas buffers).
    LightOnDark,
}

impl fmt::Display for SourcePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourcePolarity::DarkOnLight => "dark-on-light",
                SourcePolarity::LightOnDark => "light-on-dark",
            }
        )
    }
}

impl FromStr for SourcePolarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "dark-on-light" => Ok(SourcePolarity::DarkOnLight),
            "light-on-dark" => Ok(SourcePolarity::LightOnDark),
            other => Err(format!(
                "invalid polarity '{other}'; expected 'dark-on-light' or 'light-on-dark'"
            )),
        }
    }
}

/// Ranking parameters applied to the raw class scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RankSettings {
    /// How many candidate digits to report, highest confidence first.
    pub top_k: usize,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

impl RankSettings {
    /// Clamp `top_k` to the valid range for a ten-class digit model.
    pub fn sanitize(&mut self) {
        self.top_k = self.top_k.clamp(1, 10);
    }
}

/// Persistent application settings consumed by front ends.
///
/// This struct aggregates all user-configurable parameters, allowing them to
/// be loaded from and saved to a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Optional override for the digit classifier ONNX model path.
    /// If `None`, a default path is used.
    pub model_path: Option<String>,
    /// Polarity convention of the images this front end supplies.
    pub polarity: SourcePolarity,
    /// The parameters for ranking class scores.
    pub ranking: RankSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model_path: Some("models/digit_recognition.onnx".into()),
            polarity: SourcePolarity::default(),
            ranking: RankSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from a JSON file.
    ///
    /// If the file does not exist or cannot be parsed, an error is returned.
    /// If the `model_path` is missing from the JSON, it falls back to the default.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;

        if settings.model_path.is_none() {
            settings.model_path = AppSettings::default().model_path;
        }

        settings.ranking.sanitize();

        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON.
    ///
    /// This will overwrite the file if it already exists.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Returns the default path for persisted application settings (`config/settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/settings.json"))
}
