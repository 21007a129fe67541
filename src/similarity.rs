//! Most-similar-images search over a directory.
//!
//! Each regular file in the directory is decoded, converted to grayscale and
//! reduced to a HOG descriptor. Files that fail to decode or are too small
//! for one HOG block are skipped and logged. The surviving descriptors go
//! through the nearest-pair search.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimilarityConfig;
use crate::error::{PairError, PipelineError};
use crate::hog::hog_features;
use crate::pair::{NearestPair, PairFinder};
use crate::preprocess::{list_files, load_grayscale};
use crate::progress::progress_bar;
use crate::vector::{FeatureSet, VectorItem};

/// A file left out of the comparison, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub pair: NearestPair<PathBuf>,
    /// Up to `top_k` closest pairs in ascending distance; starts with `pair`.
    pub ranked: Vec<NearestPair<PathBuf>>,
    pub images_considered: usize,
    pub images_skipped: Vec<SkippedImage>,
    /// Length of every HOG descriptor compared.
    pub descriptor_len: usize,
}

/// Loads every file and computes its descriptor.
///
/// Unreadable or undersized images are returned in the skip list. A
/// descriptor whose length differs from the first one is a hard error.
pub fn extract_features(
    paths: &[PathBuf],
    cfg: &SimilarityConfig,
) -> Result<(FeatureSet<PathBuf>, Vec<SkippedImage>), PipelineError> {
    let mut set = FeatureSet::default();
    let mut skipped = Vec::new();

    let pb = progress_bar(paths.len() as u64, cfg.progress);
    for path in paths {
        pb.set_message(format!("File: {}", path.display()));
        let features = load_grayscale(path)
            .and_then(|frame| hog_features(&frame, &cfg.hog).map_err(PipelineError::from));
        match features {
            Ok(vector) => set.push(VectorItem::new(path.clone(), vector))?,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping image");
                skipped.push(SkippedImage { path: path.clone(), reason: e.to_string() });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Feature extraction complete");

    Ok((set, skipped))
}

/// Finds the pair of images in `cfg.image_dir` with the closest HOG
/// descriptors.
pub fn find_most_similar_images(cfg: &SimilarityConfig) -> Result<SimilarityReport, PipelineError> {
    cfg.validate()?;

    let paths = list_files(&cfg.image_dir)?;
    info!(dir = %cfg.image_dir.display(), files = paths.len(), "scanning image directory");
    if paths.is_empty() {
        warn!(dir = %cfg.image_dir.display(), "no images found");
        return Err(PairError::InsufficientItems { found: 0 }.into());
    }

    let (set, images_skipped) = extract_features(&paths, cfg)?;
    let finder = PairFinder::new(cfg.metric.calculator()).with_parallel(cfg.parallel);

    // the ranking already starts with the nearest pair; only search again
    // when no ranking was asked for
    let ranked = finder.closest_pairs(&set, cfg.top_k)?;
    let pair = match ranked.first() {
        Some(first) => first.clone(),
        None => finder.nearest_pair(&set)?,
    };
    info!(
        first = %pair.first.display(),
        second = %pair.second.display(),
        distance = pair.distance,
        "most similar images"
    );

    Ok(SimilarityReport {
        pair,
        ranked,
        images_considered: set.len(),
        images_skipped,
        descriptor_len: set.dimension().unwrap_or(0),
    })
}
