use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use digit_core::{DigitRecognizer, PreprocessConfig, RankConfig};
use digit_utils::{
    config::{AppSettings, SourcePolarity, default_settings_path},
    init_logging, normalize_path,
};

/// Recognize handwritten digits in images or directories.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct RecognizeArgs {
    /// Path to an image file or a directory containing images.
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the digit classifier ONNX model. Defaults to the settings
    /// file's `model_path`, or `models/digit_recognition.onnx`.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Optional settings JSON. Defaults to `config/settings.json` when
    /// present, otherwise built-in parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of candidate digits to report per image.
    #[arg(long)]
    top_k: Option<usize>,

    /// Source polarity: `dark-on-light` (uploads, scans) or `light-on-dark`
    /// (drawing-canvas exports).
    #[arg(long, value_name = "MODE")]
    polarity: Option<SourcePolarity>,

    /// Write predictions to a JSON file instead of stdout.
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Per-image result in the wire shape of the original prediction endpoint:
/// parallel label and confidence sequences, highest confidence first.
#[derive(Debug, Serialize)]
struct PredictionRecord {
    image: String,
    predicted: Vec<usize>,
    confidences: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = RecognizeArgs::parse();

    let input_path = normalize_path(&args.input)?;

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);

    let images = collect_images(&input_path)?;
    if images.is_empty() {
        anyhow::bail!(
            "no images found at {} (supported extensions: jpg, jpeg, png, bmp)",
            input_path.display()
        );
    }

    let model_path = resolve_model_path(&settings, &args)?;

    let preprocess = PreprocessConfig {
        polarity: settings.polarity,
    };
    let rank = RankConfig {
        top_k: settings.ranking.top_k,
    };

    info!(
        "digit-core {} loading model from {} (top_k={}, polarity={})",
        digit_core::version(),
        model_path.display(),
        rank.top_k,
        settings.polarity
    );
    let recognizer = DigitRecognizer::from_model_path(&model_path, preprocess, rank)?;

    info!("Processing {} image(s)...", images.len());
    let mut results = Vec::with_capacity(images.len());
    let mut failures = 0usize;
    for image_path in images {
        match recognize_one(&recognizer, &image_path) {
            Ok(record) => {
                if let (Some(label), Some(confidence)) =
                    (record.predicted.first(), record.confidences.first())
                {
                    info!(
                        "{} -> {} ({:.2}%)",
                        image_path.display(),
                        label,
                        confidence
                    );
                }
                results.push(record);
            }
            Err(err) => {
                warn!("Failed to process {}: {err}", image_path.display());
                failures += 1;
                // Soft outcome: report the image with empty sequences.
                results.push(PredictionRecord {
                    image: image_path.display().to_string(),
                    predicted: Vec::new(),
                    confidences: Vec::new(),
                    error: Some(format!("{err}")),
                });
            }
        }
    }

    if failures == results.len() {
        anyhow::bail!("all {} image(s) failed to process", failures);
    }

    if let Some(json_path) = args.json.as_ref() {
        if let Some(dir) = json_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &results).with_context(|| {
            format!("failed to write prediction JSON to {}", json_path.display())
        })?;
        info!("Wrote predictions to {}", json_path.display());
    } else {
        let json =
            serde_json::to_string_pretty(&results).context("failed to serialize predictions")?;
        println!("{json}");
    }

    Ok(())
}

fn recognize_one(
    recognizer: &DigitRecognizer,
    image_path: &Path,
) -> Result<PredictionRecord> {
    let bytes = fs::read(image_path)
        .with_context(|| format!("failed to read image {}", image_path.display()))?;
    let recognition = recognizer.recognize_bytes(&bytes)?;

    let (predicted, confidences) = recognition
        .digits
        .iter()
        .map(|digit| (digit.label, digit.confidence))
        .unzip();

    Ok(PredictionRecord {
        image: image_path.display().to_string(),
        predicted,
        confidences,
        error: None,
    })
}

fn resolve_model_path(settings: &AppSettings, args: &RecognizeArgs) -> Result<PathBuf> {
    let candidate = args
        .model
        .clone()
        .or_else(|| settings.model_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("models/digit_recognition.onnx"));
    normalize_path(candidate)
}

fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        return AppSettings::load_from_path(&resolved);
    }

    let default_path = default_settings_path();
    if default_path.exists() {
        debug!("Loading settings from {}", default_path.display());
        return AppSettings::load_from_path(&default_path);
    }

    Ok(AppSettings::default())
}

fn apply_cli_overrides(settings: &mut AppSettings, args: &RecognizeArgs) {
    if let Some(top_k) = args.top_k {
        settings.ranking.top_k = top_k;
    }
    if let Some(polarity) = args.polarity {
        settings.polarity = polarity;
    }
}

fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!(
            "input path is neither file nor directory: {}",
            path.display()
        );
    }

    let exts = ["jpg", "jpeg", "png", "bmp"];
    let mut images = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            let ext_lower = ext.to_ascii_lowercase();
            if exts.contains(&ext_lower.as_str()) {
                images.push(entry.path().to_path_buf());
            } else {
                debug!("Skipping non-image file {}", entry.path().display());
            }
        }
    }
    images.sort();
    Ok(images)
}
