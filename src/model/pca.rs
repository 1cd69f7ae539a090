use crate::error::AppError;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

/// Linear projection onto principal axes: `components · (x - mean)`.
///
/// `components` is `n_components × n_features`, rows orthonormal.
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    mean: Array1<f64>,
    components: Array2<f64>,
}

impl Pca {
    pub fn new(mean: Array1<f64>, components: Array2<f64>) -> Result<Self, AppError> {
        if components.ncols() != mean.len() {
            return Err(AppError::Model(format!(
                "PCA components have {} features but mean has {}",
                components.ncols(),
                mean.len()
            )));
        }
        if components.nrows() == 0 {
            return Err(AppError::Model("PCA has no components".to_string()));
        }
        Ok(Pca { mean, components })
    }

    /// Fits on the rows of `x`, keeping the smallest number of leading
    /// components whose cumulative explained-variance ratio exceeds
    /// `variance_threshold`.
    pub fn fit(x: &Array2<f64>, variance_threshold: f64) -> Result<Self, AppError> {
        let (n, d) = x.dim();
        if n < 2 || d == 0 {
            return Err(AppError::Model(format!(
                "PCA needs at least 2 rows and 1 column, got {}x{}",
                n, d
            )));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AppError::Model("cannot fit PCA on an empty matrix".to_string()))?;
        let centered = x - &mean;
        let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

        let eigen = SymmetricEigen::new(DMatrix::from_fn(d, d, |i, j| cov[[i, j]]));
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let variances: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i].max(0.0)).collect();
        let total: f64 = variances.iter().sum();
        if total <= 0.0 {
            return Err(AppError::Model("PCA input has zero variance".to_string()));
        }

        let max_components = d.min(n);
        let mut cumulative = 0.0;
        let mut keep = max_components;
        for (i, v) in variances.iter().take(max_components).enumerate() {
            cumulative += v / total;
            if cumulative > variance_threshold {
                keep = i + 1;
                break;
            }
        }

        let mut components = Array2::zeros((keep, d));
        for (row, &col) in order.iter().take(keep).enumerate() {
            let axis = eigen.eigenvectors.column(col);
            // Largest-magnitude loading is made positive so refits agree on sign.
            let pivot = axis
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(1.0);
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for (j, value) in axis.iter().enumerate() {
                components[[row, j]] = sign * value;
            }
        }

        debug!(
            features = d,
            components = keep,
            explained = cumulative.min(1.0),
            "PCA fitted"
        );
        Self::new(mean, components)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.components.dot(&(&x - &self.mean))
    }

    pub fn transform_rows(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean).dot(&self.components.t())
    }
}
