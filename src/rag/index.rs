//! Exact nearest-neighbour index over chunk embeddings.
//!
//! A corpus is one document (tens to a few hundred chunks); lookups scan
//! every vector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AppError, Result};

/// Distance metric for vector comparisons.
///
/// - **Euclidean**: straight-line distance; the default, matching a plain
///   k-NN fit over raw embeddings.
/// - **Cosine**: `1 - cosine_similarity`, ignores magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors; lower means more similar.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Cosine similarity; zero-length vectors compare as orthogonal.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// One result of a neighbour lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the vector in fitted order
    pub index: usize,
    pub distance: f32,
}

/// Brute-force k-nearest-neighbour index.
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    metric: DistanceMetric,
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl NearestNeighbors {
    /// Fit the index. Every vector must share one non-zero dimension.
    pub fn fit(vectors: Vec<Vec<f32>>, metric: DistanceMetric) -> Result<Self> {
        let dimensions = match vectors.first() {
            Some(first) => first.len(),
            None => {
                return Err(AppError::InvalidInput(
                    "cannot fit an index over zero vectors".to_string(),
                ))
            }
        };

        if dimensions == 0 {
            return Err(AppError::Embedding(
                "embedding model returned empty vectors".to_string(),
            ));
        }

        if let Some(pos) = vectors.iter().position(|v| v.len() != dimensions) {
            return Err(AppError::Embedding(format!(
                "vector {} has {} dimensions, expected {}",
                pos,
                vectors[pos].len(),
                dimensions
            )));
        }

        Ok(Self {
            metric,
            vectors,
            dimensions,
        })
    }

    /// The `k` nearest vectors, nearest first.
    ///
    /// `k` is clamped to the number of fitted vectors. Equal distances keep
    /// fitted order.
    pub fn kneighbors(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                index,
                distance: self.metric.distance(query, v),
            })
            .collect();

        // Stable sort keeps fitted order for ties
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k.min(self.vectors.len()));

        Ok(neighbors)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}
