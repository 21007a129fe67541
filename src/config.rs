//! Configuration for the directory pipelines.
//!
//! Paths, crop boxes and search parameters are passed to each entry point
//! explicitly; nothing here reads the environment. Both configs can be
//! loaded from JSON, with missing fields taking their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::hog::HogConfig;
use crate::vector::DistanceMetric;

/// Settings for the most-similar-images search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Directory whose regular files are compared.
    pub image_dir: PathBuf,
    pub hog: HogConfig,
    pub metric: DistanceMetric,
    /// Evaluate pairs on the rayon thread pool.
    pub parallel: bool,
    /// Number of closest pairs ranked in the report; larger values than the
    /// number of pairs rank every pair.
    pub top_k: usize,
    /// Draw terminal progress bars while extracting features.
    pub progress: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        SimilarityConfig {
            image_dir: PathBuf::from("cropped_images"),
            hog: HogConfig::default(),
            metric: DistanceMetric::Euclidean,
            parallel: false,
            top_k: 5,
            progress: false,
        }
    }
}

impl SimilarityConfig {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        SimilarityConfig { image_dir: image_dir.into(), ..Default::default() }
    }

    pub fn with_hog(mut self, hog: HogConfig) -> Self {
        self.hog = hog;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.hog.validate()?;
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        load_json(path)
    }
}

/// Crop rectangle as `(left, upper, right, lower)`; right and lower are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl Default for CropBox {
    fn default() -> Self {
        CropBox { left: 246, upper: 90, right: 820, lower: 400 }
    }
}

impl CropBox {
    pub fn new(left: u32, upper: u32, right: u32, lower: u32) -> Self {
        CropBox { left, upper, right, lower }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.lower.saturating_sub(self.upper)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.left >= self.right || self.upper >= self.lower {
            return Err(PipelineError::Config(format!(
                "crop box ({}, {}, {}, {}) is empty",
                self.left, self.upper, self.right, self.lower
            )));
        }
        Ok(())
    }

    /// The part of the box that lies inside a `width` x `height` image, as
    /// `(x, y, w, h)`, or `None` when the box misses the image entirely.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let right = self.right.min(width);
        let lower = self.lower.min(height);
        if self.left >= right || self.upper >= lower {
            return None;
        }
        Some((self.left, self.upper, right - self.left, lower - self.upper))
    }
}

/// Settings for the batch cropper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub crop_box: CropBox,
    /// Lowercase file extensions, without the dot, that are treated as images.
    pub extensions: Vec<String>,
    pub progress: bool,
}

impl Default for CropConfig {
    fn default() -> Self {
        CropConfig {
            input_dir: PathBuf::from("image"),
            output_dir: PathBuf::from("cropped_images"),
            crop_box: CropBox::default(),
            extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            progress: false,
        }
    }
}

impl CropConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        CropConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_crop_box(mut self, crop_box: CropBox) -> Self {
        self.crop_box = crop_box;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.crop_box.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        load_json(path)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_defaults() {
        let cfg = SimilarityConfig::default();
        assert_eq!(cfg.image_dir, PathBuf::from("cropped_images"));
        assert_eq!(cfg.metric, DistanceMetric::Euclidean);
        assert!(!cfg.parallel);
        assert_eq!(cfg.top_k, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_similarity_partial_json() {
        let json = r#"{"image_dir": "shots", "metric": "manhattan", "parallel": true}"#;
        let cfg: SimilarityConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.image_dir, PathBuf::from("shots"));
        assert_eq!(cfg.metric, DistanceMetric::Manhattan);
        assert!(cfg.parallel);
        assert_eq!(cfg.hog, HogConfig::default());
    }

    #[test]
    fn test_crop_box_default_and_validate() {
        let b = CropBox::default();
        assert_eq!((b.left, b.upper, b.right, b.lower), (246, 90, 820, 400));
        assert_eq!((b.width(), b.height()), (574, 310));
        assert!(b.validate().is_ok());
        assert!(CropBox::new(10, 10, 10, 20).validate().is_err());
        assert!(CropBox::new(10, 30, 20, 20).validate().is_err());
    }

    #[test]
    fn test_crop_box_clamp() {
        let b = CropBox::new(10, 10, 100, 50);
        assert_eq!(b.clamp_to(200, 200), Some((10, 10, 90, 40)));
        assert_eq!(b.clamp_to(40, 30), Some((10, 10, 30, 20)));
        assert_eq!(b.clamp_to(5, 5), None);
    }

    #[test]
    fn test_crop_extensions() {
        let cfg = CropConfig::default();
        assert!(cfg.accepts(Path::new("a/b.PNG")));
        assert!(cfg.accepts(Path::new("x.jpeg")));
        assert!(!cfg.accepts(Path::new("notes.txt")));
        assert!(!cfg.accepts(Path::new("no_extension")));
    }

    #[test]
    fn test_load_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(CropConfig::from_json_file(&missing), Err(PipelineError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            SimilarityConfig::from_json_file(&bad),
            Err(PipelineError::ConfigParse(_))
        ));
    }
}
