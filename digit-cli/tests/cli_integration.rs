use std::error::Error;
use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn missing_input_path_fails_with_message() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input").arg("no/such/file.png");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn missing_model_fails_before_processing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image_path = dir.path().join("digit.png");
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240])).save(&image_path)?;

    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input")
        .arg(&image_path)
        .arg("--model")
        .arg(dir.path().join("missing.onnx"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn corrupt_model_file_reports_parse_failure() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image_path = dir.path().join("digit.png");
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240])).save(&image_path)?;
    let model_path = dir.path().join("broken.onnx");
    fs::write(&model_path, b"not a real onnx file")?;

    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input")
        .arg(&image_path)
        .arg("--model")
        .arg(&model_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ONNX").or(predicate::str::contains("optimize")))
        .stderr(predicate::str::contains("digit-core"));
    Ok(())
}

#[test]
fn directory_without_images_fails_before_model_loading() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("notes.txt"), "nothing to see")?;

    // No model anywhere; an image-free directory must be reported before the
    // model path is even resolved.
    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no images found"));
    Ok(())
}

#[test]
fn invalid_polarity_value_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image_path = dir.path().join("digit.png");
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240])).save(&image_path)?;

    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input")
        .arg(&image_path)
        .arg("--polarity")
        .arg("sideways");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid polarity"));
    Ok(())
}

#[test]
fn default_settings_file_is_picked_up_when_present() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image_path = dir.path().join("digit.png");
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240])).save(&image_path)?;
    fs::create_dir_all(dir.path().join("config"))?;
    fs::write(dir.path().join("config/settings.json"), "{ broken json")?;

    // With no --config flag, `config/settings.json` under the working
    // directory must be loaded, so its parse failure surfaces.
    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.current_dir(dir.path()).arg("--input").arg(&image_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse settings JSON"));
    Ok(())
}

#[test]
fn unparsable_settings_file_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image_path = dir.path().join("digit.png");
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240])).save(&image_path)?;
    let config_path = dir.path().join("settings.json");
    fs::write(&config_path, "{ this is not json")?;

    let mut cmd = cargo_bin_cmd!("digit-cli");
    cmd.arg("--input")
        .arg(&image_path)
        .arg("--config")
        .arg(&config_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse settings JSON"));
    Ok(())
}
