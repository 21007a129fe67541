use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::PipelineError;

/// ITU-R BT.709 luma weights applied to linear `[0, 1]` RGB.
const LUMA_WEIGHTS: [f64; 3] = [0.2125, 0.7154, 0.0721];

/// A grayscale image as row-major `f64` intensities in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f64>,
}

impl GrayFrame {
    /// Builds a frame from row-major pixels. Returns `None` if the buffer
    /// length does not match `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<f64>) -> Option<Self> {
        (pixels.len() == width * height).then_some(GrayFrame { width, height, pixels })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.pixels[row * self.width + col]
    }

    /// Converts any decoded image. Alpha is dropped; gray sources pass
    /// through unchanged since the luma weights sum to one.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb32f();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let pixels = rgb
            .pixels()
            .map(|p| {
                LUMA_WEIGHTS[0] * p[0] as f64
                    + LUMA_WEIGHTS[1] * p[1] as f64
                    + LUMA_WEIGHTS[2] * p[2] as f64
            })
            .collect();
        GrayFrame { width, height, pixels }
    }
}

/// Decodes an image file and converts it to grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayFrame, PipelineError> {
    let img = image::open(path).map_err(|e| PipelineError::image(path, e))?;
    Ok(GrayFrame::from_image(&img))
}

/// Regular files directly under `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
