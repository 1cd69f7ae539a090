use crate::error::AppError;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self, AppError> {
        if mean.len() != scale.len() {
            return Err(AppError::Model(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(AppError::Model("scaler scale must be positive".to_string()));
        }
        Ok(StandardScaler { mean, scale })
    }

    /// Fits column means and population standard deviations. Constant columns
    /// get a scale of 1.
    pub fn fit(x: &Array2<f64>) -> Result<Self, AppError> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| AppError::Model("cannot fit scaler on an empty matrix".to_string()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Self::new(mean, scale)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &self.mean) / &self.scale
    }

    pub fn transform_rows(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_with_population_std() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.mean(), &array![2.0, 5.0]);
        assert_eq!(scaler.scale(), &array![1.0, 1.0]);

        let rows = scaler.transform_rows(&x);
        assert_eq!(rows, array![[-1.0, 0.0], [1.0, 0.0]]);
        assert_eq!(scaler.transform(array![4.0, 6.0].view()), array![2.0, 1.0]);
    }

    #[test]
    fn rejects_mismatched_parameters() {
        assert!(StandardScaler::new(array![0.0, 0.0], array![1.0]).is_err());
        assert!(StandardScaler::new(array![0.0], array![0.0]).is_err());
    }
}
