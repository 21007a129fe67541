//! Batch cropping of every image in a folder to one fixed rectangle.
//!
//! Output files keep their input file name and format. A file that fails to
//! decode, crop or save is recorded in the report and the batch continues.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{CropBox, CropConfig};
use crate::error::PipelineError;
use crate::preprocess::list_files;
use crate::progress::progress_bar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropReport {
    /// Paths of the written output files.
    pub cropped: Vec<PathBuf>,
    pub failed: Vec<CropFailure>,
    /// Files ignored because their extension is not an image type.
    pub ignored: usize,
}

/// Crops `img` to `crop_box`. The result is always the size of the box; any
/// part of the box outside the image is filled with black.
pub fn crop_image(img: &DynamicImage, crop_box: &CropBox) -> Result<DynamicImage, PipelineError> {
    crop_box.validate()?;
    let (box_w, box_h) = (crop_box.width(), crop_box.height());
    let visible = crop_box.clamp_to(img.width(), img.height());
    if let Some((x, y, w, h)) = visible {
        if (w, h) == (box_w, box_h) {
            return Ok(img.crop_imm(x, y, w, h));
        }
    }

    warn!(width = img.width(), height = img.height(), "crop box exceeds image, padding with black");
    let mut canvas = DynamicImage::new(box_w, box_h, img.color());
    // the box origin is never negative, so the visible part starts at (0, 0)
    if let Some((x, y, w, h)) = visible {
        imageops::replace(&mut canvas, &img.crop_imm(x, y, w, h), 0, 0);
    }
    Ok(canvas)
}

fn crop_file(path: &Path, output_dir: &Path, crop_box: &CropBox) -> Result<PathBuf, PipelineError> {
    let img = image::open(path).map_err(|e| PipelineError::image(path, e))?;
    let cropped = crop_image(&img, crop_box)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| PipelineError::Config(format!("{} has no file name", path.display())))?;
    let output = output_dir.join(file_name);
    cropped.save(&output).map_err(|e| PipelineError::image(&output, e))?;
    Ok(output)
}

/// Crops every image in `cfg.input_dir` into `cfg.output_dir`, creating the
/// output directory if needed.
pub fn crop_images_in_folder(cfg: &CropConfig) -> Result<CropReport, PipelineError> {
    cfg.validate()?;
    fs::create_dir_all(&cfg.output_dir).map_err(|e| PipelineError::io(&cfg.output_dir, e))?;

    let files = list_files(&cfg.input_dir)?;
    let mut report = CropReport::default();

    let pb = progress_bar(files.len() as u64, cfg.progress);
    for path in files {
        pb.inc(1);
        pb.set_message(format!("File: {}", path.display()));
        if !cfg.accepts(&path) {
            report.ignored += 1;
            continue;
        }
        match crop_file(&path, &cfg.output_dir, &cfg.crop_box) {
            Ok(output) => {
                info!(file = %path.display(), "cropped and saved");
                report.cropped.push(output);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "error processing image");
                report.failed.push(CropFailure { path, reason: e.to_string() });
            }
        }
    }
    pb.finish_with_message("Cropping complete");

    Ok(report)
}
