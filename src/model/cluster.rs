use super::projection::FittedModel;
use crate::analysis::vector_builder::ChampionVector;
use crate::data::frequency::PopulationMatrix;
use crate::data::penalty::{PenaltyWeights, CLUSTER_PENALTY_SCALE};
use crate::error::AppError;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

pub const CLUSTER_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct ClusterFitParams {
    /// Minimum number of master players with a non-zero entry for a champion
    /// to enter the selected vocabulary.
    pub min_play_count: usize,
    pub variance_threshold: f64,
    pub n_runs: usize,
    pub max_iterations: u64,
    pub seed: u64,
    /// Upper bound on the startup fit. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClusterFitParams {
    fn default() -> Self {
        ClusterFitParams {
            min_play_count: 50,
            variance_threshold: 0.9,
            n_runs: 20,
            max_iterations: 300,
            seed: 42,
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// k-means partition of the master population's reduced selected-vocabulary
/// space, together with everything needed to place a new player in it.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    vocabulary: Vec<String>,
    penalty: PenaltyWeights,
    projection: FittedModel,
    centroids: Array2<f64>,
}

impl ClusterModel {
    /// Runs [`ClusterModel::fit`] on a worker thread and gives up after
    /// `params.timeout`. The abandoned worker is detached.
    pub fn fit_bounded(
        master: &PopulationMatrix,
        params: &ClusterFitParams,
    ) -> Result<Self, AppError> {
        let Some(timeout) = params.timeout else {
            return Self::fit(master, params);
        };

        let (tx, rx) = mpsc::channel();
        let master = master.clone();
        let worker_params = params.clone();
        thread::Builder::new()
            .name("cluster-fit".to_string())
            .spawn(move || {
                let _ = tx.send(Self::fit(&master, &worker_params));
            })
            .map_err(|e| AppError::Model(format!("could not start cluster fit: {}", e)))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_secs = timeout.as_secs_f64(), "cluster fit timed out");
                Err(AppError::Model(format!(
                    "cluster fit did not finish within {:?}",
                    timeout
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(AppError::Model("cluster fit worker stopped without a result".to_string()))
            }
        }
    }

    pub fn fit(master: &PopulationMatrix, params: &ClusterFitParams) -> Result<Self, AppError> {
        let counts = master.nonzero_counts();
        let vocabulary: Vec<String> = counts
            .iter()
            .filter(|(_, n)| **n >= params.min_play_count as f64)
            .map(|(c, _)| c.clone())
            .collect();
        if vocabulary.is_empty() {
            return Err(AppError::Model(format!(
                "no champion is played by at least {} master players",
                params.min_play_count
            )));
        }
        if master.n_rows() < CLUSTER_COUNT {
            return Err(AppError::Model(format!(
                "cannot form {} clusters from {} master players",
                CLUSTER_COUNT,
                master.n_rows()
            )));
        }

        let penalty = PenaltyWeights::from_counts(&counts, CLUSTER_PENALTY_SCALE);

        let x = l2_normalize_rows(master.select_columns(&vocabulary));
        let projection = FittedModel::fit(
            "cluster",
            format!("fit-{}x{}", x.nrows(), x.ncols()),
            vocabulary.clone(),
            &x,
            params.variance_threshold,
        )?;
        let reduced = projection.project_rows(&projection.standardize_rows(&x));

        let dataset = DatasetBase::from(reduced);
        let kmeans = KMeans::params_with_rng(CLUSTER_COUNT, StdRng::seed_from_u64(params.seed))
            .n_runs(params.n_runs)
            .max_n_iterations(params.max_iterations)
            .tolerance(1e-4)
            .fit(&dataset)
            .map_err(|e| AppError::Model(format!("k-means fit failed: {}", e)))?;

        info!(
            selected_champions = vocabulary.len(),
            components = projection.n_components(),
            clusters = CLUSTER_COUNT,
            "cluster model fitted"
        );

        Ok(ClusterModel {
            vocabulary,
            penalty,
            projection,
            centroids: kmeans.centroids().to_owned(),
        })
    }

    /// Champions used for clustering, sorted.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn penalty(&self) -> &PenaltyWeights {
        &self.penalty
    }

    /// Position of an already penalized `vector` in the reduced space.
    pub fn reduce(&self, vector: &ChampionVector) -> Array1<f64> {
        let x = l2_normalize(self.projection.reindex(vector));
        self.projection
            .project(self.projection.standardize(x.view()).view())
    }

    /// Index of the nearest centroid (Euclidean) to a reduced point.
    pub fn nearest(&self, reduced: ArrayView1<f64>) -> usize {
        nearest_centroid(reduced, &self.centroids)
    }
}

fn l2_normalize(mut v: Array1<f64>) -> Array1<f64> {
    let norm = v.dot(&v).sqrt();
    if norm > 0.0 {
        v /= norm;
    }
    v
}

/// Scales each row to unit length; all-zero rows are left as they are.
fn l2_normalize_rows(mut x: Array2<f64>) -> Array2<f64> {
    for mut row in x.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    x
}

fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.axis_iter(Axis(0)).enumerate() {
        let dist: f64 = centroid
            .iter()
            .zip(point.iter())
            .map(|(c, p)| (c - p).powi(2))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rows_are_unit_length_except_zero_rows() {
        let x = l2_normalize_rows(array![[3.0, 4.0], [0.0, 0.0]]);
        assert_eq!(x, array![[0.6, 0.8], [0.0, 0.0]]);
    }

    #[test]
    fn nearest_centroid_picks_closest() {
        let centroids = array![[0.0, 0.0], [10.0, 10.0], [-5.0, 0.0]];
        assert_eq!(nearest_centroid(array![9.0, 8.0].view(), &centroids), 1);
        assert_eq!(nearest_centroid(array![-4.0, 1.0].view(), &centroids), 2);
    }
}
