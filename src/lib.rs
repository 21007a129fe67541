pub mod config;
pub mod crop;
pub mod error;
pub mod hog;
mod pair;
pub mod preprocess;
mod progress;
pub mod similarity;
pub mod vector;

pub use config::{CropBox, CropConfig, SimilarityConfig};
pub use crop::{crop_image, crop_images_in_folder, CropFailure, CropReport};
pub use error::{HogError, PairError, PairResult, PipelineError};
pub use hog::{hog_features, BlockNorm, HogConfig};
pub use pair::{
    closest_pairs, closest_pairs_parallel, find_nearest_pair, find_nearest_pair_parallel,
    NearestPair, PairFinder,
};
pub use preprocess::{load_grayscale, GrayFrame};
pub use progress::progress_bar;
pub use similarity::{find_most_similar_images, SimilarityReport, SkippedImage};
pub use vector::{
    CosineDistance, DistanceCalculator, DistanceMetric, EuclideanDistance, FeatureSet,
    ManhattanDistance, VectorItem,
};
