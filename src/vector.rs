use serde::{Deserialize, Serialize};

use crate::error::PairError;

/// An identifier paired with its feature vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorItem<K = usize> {
    pub id: K,
    pub vector: Vec<f64>,
}

impl<K> VectorItem<K> {
    pub fn new(id: K, vector: Vec<f64>) -> Self {
        VectorItem { id, vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Distance between two vectors of equal length.
///
/// Callers check lengths before calling; implementations may assume
/// `a.len() == b.len()`.
pub trait DistanceCalculator: Send + Sync {
    fn calculate(&self, a: &[f64], b: &[f64]) -> f64;
}

pub struct EuclideanDistance;

impl DistanceCalculator for EuclideanDistance {
    fn calculate(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

pub struct ManhattanDistance;

impl DistanceCalculator for ManhattanDistance {
    fn calculate(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
    }
}

/// `1 - cos(a, b)`. A zero vector is at distance 1 from everything.
pub struct CosineDistance;

impl DistanceCalculator for CosineDistance {
    fn calculate(&self, a: &[f64], b: &[f64]) -> f64 {
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for (x, y) in a.iter().zip(b.iter()) {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        if norm_a <= 0.0 || norm_b <= 0.0 {
            return 1.0;
        }
        1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Serializable choice of distance, used by configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    Cosine,
}

impl DistanceMetric {
    pub fn calculator(self) -> Box<dyn DistanceCalculator> {
        match self {
            DistanceMetric::Euclidean => Box::new(EuclideanDistance),
            DistanceMetric::Manhattan => Box::new(ManhattanDistance),
            DistanceMetric::Cosine => Box::new(CosineDistance),
        }
    }
}

/// A collection of items whose vectors all share one dimensionality.
///
/// The length check happens once in [`FeatureSet::new`] / [`FeatureSet::push`],
/// so searches over a `FeatureSet` never hit a dimensionality mismatch.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSet<K = usize> {
    dimension: Option<usize>,
    items: Vec<VectorItem<K>>,
}

impl<K> Default for FeatureSet<K> {
    fn default() -> Self {
        FeatureSet { dimension: None, items: Vec::new() }
    }
}

impl<K> FeatureSet<K> {
    pub fn new(items: Vec<VectorItem<K>>) -> Result<Self, PairError> {
        let mut set = FeatureSet { dimension: None, items: Vec::with_capacity(items.len()) };
        for item in items {
            set.push(item)?;
        }
        Ok(set)
    }

    /// Appends an item. The first item fixes the dimensionality of the set.
    pub fn push(&mut self, item: VectorItem<K>) -> Result<(), PairError> {
        let found = item.vector.len();
        match self.dimension {
            Some(expected) if expected != found => {
                return Err(PairError::DimensionalityMismatch {
                    expected,
                    found,
                    index: self.items.len(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(found),
        }
        self.items.push(item);
        Ok(())
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[VectorItem<K>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<VectorItem<K>> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_matches_hand_computed() {
        let d = EuclideanDistance.calculate(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_metrics() {
        let v1 = [1.0, 0.0];
        let v2 = [0.0, 1.0];

        assert!((ManhattanDistance.calculate(&v1, &v2) - 2.0).abs() < 1e-12);
        // Orthogonal
        assert!((CosineDistance.calculate(&v1, &v2) - 1.0).abs() < 1e-12);
        // Same
        assert!(CosineDistance.calculate(&v1, &v1).abs() < 1e-12);
        assert_eq!(CosineDistance.calculate(&[0.0, 0.0], &v1), 1.0);
    }

    #[test]
    fn test_distances_are_symmetric() {
        let a = [1.5, -2.0, 0.25];
        let b = [-0.5, 4.0, 3.0];
        let metrics = [
            DistanceMetric::Euclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Cosine,
        ];
        for metric in metrics {
            let calc = metric.calculator();
            assert_eq!(calc.calculate(&a, &b), calc.calculate(&b, &a), "{:?}", metric);
        }
    }

    #[test]
    fn test_metric_deserializes_lowercase() {
        let metric: DistanceMetric = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(metric, DistanceMetric::Cosine);
        assert_eq!(DistanceMetric::default(), DistanceMetric::Euclidean);
    }

    #[test]
    fn test_feature_set_rejects_mismatched_dimension() {
        let err = FeatureSet::new(vec![
            VectorItem::new("a", vec![1.0, 2.0]),
            VectorItem::new("b", vec![1.0, 2.0, 3.0]),
        ])
        .unwrap_err();
        assert_eq!(err, PairError::DimensionalityMismatch { expected: 2, found: 3, index: 1 });
    }

    #[test]
    fn test_feature_set_tracks_dimension() {
        let mut set = FeatureSet::default();
        assert!(set.is_empty());
        assert_eq!(set.dimension(), None);
        set.push(VectorItem::new(0, vec![0.0; 4])).unwrap();
        set.push(VectorItem::new(1, vec![1.0; 4])).unwrap();
        assert_eq!(set.dimension(), Some(4));
        assert_eq!(set.len(), 2);
    }
}
