//! Deterministic K-means clustering over raw embedding vectors.
//!
//! This module provides a pure Rust implementation of K-means used to group
//! log embeddings into failure patterns. It uses squared Euclidean distance
//! and K-means++ initialization driven by a seeded RNG, so the same input
//! and the same configuration always produce the same partition.
//!
//! Each call runs `n_init` independent starts with seeds `seed`,
//! `seed + 1`, ... and keeps the one with the lowest inertia (sum of squared
//! distances to the assigned centroid). Ties go to the lower seed.
//!
//! # Algorithm Details
//! - Distance metric: squared Euclidean on raw vectors (no normalization)
//! - Initialization: K-means++ from `StdRng::seed_from_u64(seed)`, best of `n_init`
//! - Max iterations: configurable, default 100
//! - Convergence: no assignment changes, or max centroid shift below tolerance
//!
//! # Performance Characteristics
//! - O(n_init * n * k * d * iterations) time complexity
//! - O(k * d) space for centroids
//! - Parallel assignment step (rayon); each point is assigned independently
//!   with lowest-index tie breaking, so results match a sequential run

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::vector::distance::squared_euclidean;

/// Default seed for centroid initialization.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of seeded restarts.
pub const DEFAULT_N_INIT: usize = 10;

/// Default maximum number of refinement iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default convergence tolerance on centroid movement.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Epsilon for floating-point comparisons.
const EPSILON: f64 = 1e-12;

/// Tunables for a K-means run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    /// Seed for the K-means++ sampler of the first start.
    pub seed: u64,
    /// Number of starts; the lowest-inertia one wins. Zero behaves as one.
    pub n_init: usize,
    /// Upper bound on refinement iterations.
    pub max_iterations: usize,
    /// Stop once no centroid moves farther than this (Euclidean).
    pub tolerance: f32,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            n_init: DEFAULT_N_INIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Result of K-means clustering operation.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster centroids, each a vector of the same dimension as input vectors.
    pub centroids: Vec<Vec<f32>>,

    /// Cluster label in `0..k` for each input vector, in input order.
    pub assignments: Vec<usize>,

    /// Number of refinement iterations performed.
    pub iterations: usize,

    /// Whether the run converged before hitting `max_iterations`.
    pub converged: bool,

    /// Sum of squared distances from each vector to its centroid.
    pub inertia: f64,

    /// Seed of the start that produced this result.
    pub seed: u64,
}

/// Errors that can occur during clustering operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    #[error(
        "Empty vector set provided for clustering\nSuggestion: Filter must match at least one record"
    )]
    EmptyVectorSet,

    #[error("Invalid cluster count: {0}\nSuggestion: Use k between 1 and the number of vectors")]
    InvalidClusterCount(usize),

    #[error(
        "Dimension mismatch in vectors: expected {expected}, got {actual}\nSuggestion: Ensure all vectors come from the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Performs K-means clustering on a set of vectors using Euclidean distance.
///
/// # Arguments
/// * `vectors` - Input vectors to cluster (must be non-empty and same dimension)
/// * `k` - Number of clusters (must be >= 1 and <= number of vectors)
/// * `config` - Seed, iteration bound and tolerance
///
/// The result depends only on the order of `vectors`, `k` and `config`.
/// Callers wanting order independence must canonicalize the input first.
///
/// # Algorithm
/// For each of `n_init` seeds:
/// 1. Initialize centroids using seeded K-means++
/// 2. Assign each vector to its nearest centroid
/// 3. Iterate until convergence or max iterations:
///    - Update centroids as mean of assigned vectors (empty clusters keep theirs)
///    - Reassign vectors
///    - Stop when assignments are stable or centroid movement is below tolerance
///
/// The start with the lowest inertia is returned; ties keep the earlier seed.
#[must_use = "clustering results should be used or the computation is wasted"]
pub fn kmeans_clustering(
    vectors: &[&[f32]],
    k: usize,
    config: &KMeansConfig,
) -> Result<KMeansResult, ClusteringError> {
    if vectors.is_empty() {
        return Err(ClusteringError::EmptyVectorSet);
    }

    if k == 0 || k > vectors.len() {
        return Err(ClusteringError::InvalidClusterCount(k));
    }

    let dimension = vectors[0].len();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(ClusteringError::DimensionMismatch {
            expected: dimension,
            actual: bad.len(),
        });
    }

    let starts = config.n_init.max(1) as u64;
    let mut best = run_from_seed(vectors, k, config, config.seed);
    for offset in 1..starts {
        let candidate = run_from_seed(vectors, k, config, config.seed.wrapping_add(offset));
        if candidate.inertia < best.inertia {
            best = candidate;
        }
    }

    if best.converged {
        debug!(
            k,
            starts,
            seed = best.seed,
            iterations = best.iterations,
            inertia = best.inertia,
            points = vectors.len(),
            "k-means converged"
        );
    } else {
        // Still return the partition; it is deterministic either way
        warn!(
            "K-means did not fully converge after {} iterations",
            config.max_iterations.max(1)
        );
    }

    Ok(best)
}

/// One K-means++ start followed by Lloyd iterations.
fn run_from_seed(vectors: &[&[f32]], k: usize, config: &KMeansConfig, seed: u64) -> KMeansResult {
    let mut centroids = initialize_centroids_kmeans_plus_plus(vectors, k, seed);
    let mut assignments = assign_all(vectors, &centroids);
    let mut iterations = 0;
    let mut converged = false;
    let max_iterations = config.max_iterations.max(1);

    while iterations < max_iterations {
        iterations += 1;

        let new_centroids = update_centroids(vectors, &assignments, &centroids);
        let movement = max_centroid_shift(&centroids, &new_centroids);
        centroids = new_centroids;

        let new_assignments = assign_all(vectors, &centroids);
        let stable = new_assignments == assignments;
        assignments = new_assignments;

        if stable || movement < config.tolerance {
            converged = true;
            break;
        }
    }

    let inertia = total_inertia(vectors, &assignments, &centroids);
    KMeansResult {
        centroids,
        assignments,
        iterations,
        converged,
        inertia,
        seed,
    }
}

/// Sum of squared distances, accumulated sequentially in f64.
fn total_inertia(vectors: &[&[f32]], assignments: &[usize], centroids: &[Vec<f32>]) -> f64 {
    vectors
        .iter()
        .zip(assignments.iter())
        .map(|(vector, &cluster)| f64::from(squared_euclidean(vector, &centroids[cluster])))
        .sum()
}

/// Returns the index of the nearest centroid by squared Euclidean distance.
///
/// Ties resolve to the lowest index.
pub fn assign_to_nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best_distance = f32::INFINITY;
    let mut best_cluster = 0;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_euclidean(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_cluster = i;
        }
    }

    best_cluster
}

fn assign_all(vectors: &[&[f32]], centroids: &[Vec<f32>]) -> Vec<usize> {
    vectors
        .par_iter()
        .map(|vector| assign_to_nearest_centroid(vector, centroids))
        .collect()
}

/// Recomputes centroids as the mean of their members.
///
/// Sums run sequentially in input order so floating-point results do not
/// depend on thread scheduling. A cluster that lost all members keeps its
/// previous centroid.
fn update_centroids(
    vectors: &[&[f32]],
    assignments: &[usize],
    previous: &[Vec<f32>],
) -> Vec<Vec<f32>> {
    let dimension = vectors[0].len();
    let k = previous.len();
    let mut sums = vec![vec![0.0f64; dimension]; k];
    let mut cluster_sizes = vec![0usize; k];

    for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
        for (sum, &value) in sums[cluster].iter_mut().zip(vector.iter()) {
            *sum += f64::from(value);
        }
        cluster_sizes[cluster] += 1;
    }

    sums.into_iter()
        .zip(cluster_sizes)
        .zip(previous)
        .map(|((sum, size), old)| {
            if size == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| (s / size as f64) as f32).collect()
            }
        })
        .collect()
}

/// Initializes centroids using the K-means++ algorithm with a fixed seed.
///
/// K-means++ selects initial centroids that are far apart. When every
/// remaining point coincides with a chosen centroid, the first unchosen
/// point (by input position) is taken instead so exactly `k` centroids
/// are always produced.
fn initialize_centroids_kmeans_plus_plus(vectors: &[&[f32]], k: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut chosen = vec![false; vectors.len()];
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);

    let first_idx = rng.random_range(0..vectors.len());
    chosen[first_idx] = true;
    centroids.push(vectors[first_idx].to_vec());

    // Squared distance of each point to its nearest chosen centroid
    let mut nearest: Vec<f64> = vectors
        .iter()
        .map(|v| f64::from(squared_euclidean(v, &centroids[0])))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();

        let next_idx = if total < EPSILON {
            // All points are coincident with existing centroids
            chosen.iter().position(|&c| !c).unwrap_or(0)
        } else {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut picked = None;
            for (i, &distance) in nearest.iter().enumerate() {
                cumulative += distance;
                if distance > 0.0 && cumulative >= target {
                    picked = Some(i);
                    break;
                }
            }
            // Fallback: rounding left the target past the last positive weight
            picked.unwrap_or_else(|| nearest.iter().rposition(|&d| d > 0.0).unwrap_or(0))
        };

        chosen[next_idx] = true;
        let centroid = vectors[next_idx].to_vec();
        for (slot, vector) in nearest.iter_mut().zip(vectors.iter()) {
            let d = f64::from(squared_euclidean(vector, &centroid));
            if d < *slot {
                *slot = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Largest Euclidean distance any centroid moved between iterations.
fn max_centroid_shift(old: &[Vec<f32>], new: &[Vec<f32>]) -> f32 {
    old.iter()
        .zip(new.iter())
        .map(|(old_c, new_c)| squared_euclidean(old_c, new_c).sqrt())
        .fold(0.0, f32::max)
}
