//! Distance functions shared by search and clustering.
//!
//! Search ranks by cosine distance because embedding magnitude carries no
//! meaning for log messages. K-means works on raw embeddings with squared
//! Euclidean distance, the metric it minimizes.

/// Computes cosine similarity between two vectors.
///
/// Accumulates in f64 and divides by `sqrt(|a|² |b|²)`, so a vector
/// compared with itself scores exactly 1.
///
/// # Returns
/// * Cosine similarity in range [-1, 1], where 1 is most similar.
///   Zero vectors have similarity 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let mut dot = 0.0f64;
    let mut norm_a_sq = 0.0f64;
    let mut norm_b_sq = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a_sq += x * x;
        norm_b_sq += y * y;
    }

    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        0.0
    } else {
        (dot / (norm_a_sq * norm_b_sq).sqrt()) as f32
    }
}

/// Cosine distance (1 - cosine similarity), clamped to [0, 2].
///
/// Rounding can push the similarity of nearly parallel vectors a hair
/// above 1, so the clamp keeps the distance non-negative.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

/// Squared Euclidean distance. Avoids the sqrt; ordering is unchanged.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
