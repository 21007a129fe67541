use std::path::PathBuf;

use thiserror::Error;

/// Errors from the nearest-pair search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairError {
    #[error("insufficient items: need at least 2, got {found}")]
    InsufficientItems { found: usize },

    #[error("dimensionality mismatch at item {index}: expected {expected}, got {found}")]
    DimensionalityMismatch { expected: usize, found: usize, index: usize },
}

/// Errors from HOG descriptor extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HogError {
    #[error("image {width}x{height} is smaller than one {block_height}x{block_width} block")]
    ImageTooSmall { width: usize, height: usize, block_width: usize, block_height: usize },

    #[error("invalid HOG config: {0}")]
    InvalidConfig(String),
}

/// Errors from the directory pipelines (similarity search, cropping).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("image error on {path}: {source}")]
    Image { path: PathBuf, source: image::ImageError },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Hog(#[from] HogError),

    #[error(transparent)]
    Pair(#[from] PairError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io { path: path.into(), source }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        PipelineError::Image { path: path.into(), source }
    }
}

pub type PairResult<T> = Result<T, PairError>;
