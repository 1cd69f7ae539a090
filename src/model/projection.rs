use super::pca::Pca;
use super::scaler::StandardScaler;
use crate::analysis::vector_builder::ChampionVector;
use crate::error::AppError;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// On-disk form of a fitted standardization + PCA pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub scaler: ScalerArtifact,
    pub pca: PcaArtifact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaArtifact {
    pub mean: Vec<f64>,
    /// One row per component.
    pub components: Vec<Vec<f64>>,
}

/// A standardization + PCA pipeline bound to one feature vocabulary.
///
/// The recommendation path and the clustering path each own a separate
/// instance; `name` says which one this is.
#[derive(Debug, Clone)]
pub struct FittedModel {
    name: &'static str,
    version: String,
    feature_names: Vec<String>,
    scaler: StandardScaler,
    pca: Pca,
}

impl FittedModel {
    pub fn new(
        name: &'static str,
        version: impl Into<String>,
        feature_names: Vec<String>,
        scaler: StandardScaler,
        pca: Pca,
    ) -> Result<Self, AppError> {
        if scaler.dim() != feature_names.len() || pca.n_features() != feature_names.len() {
            return Err(AppError::Model(format!(
                "{} model: {} feature names, scaler expects {}, PCA expects {}",
                name,
                feature_names.len(),
                scaler.dim(),
                pca.n_features()
            )));
        }
        Ok(FittedModel {
            name,
            version: version.into(),
            feature_names,
            scaler,
            pca,
        })
    }

    pub fn from_artifact(name: &'static str, artifact: ModelArtifact) -> Result<Self, AppError> {
        let scaler = StandardScaler::new(
            Array1::from(artifact.scaler.mean),
            Array1::from(artifact.scaler.scale),
        )?;

        let n_components = artifact.pca.components.len();
        let width = artifact.pca.mean.len();
        if artifact.pca.components.iter().any(|row| row.len() != width) {
            return Err(AppError::Model(format!(
                "{} model: ragged PCA component rows",
                name
            )));
        }
        let flat: Vec<f64> = artifact.pca.components.into_iter().flatten().collect();
        let components = Array2::from_shape_vec((n_components, width), flat)
            .map_err(|e| AppError::Model(format!("{} model: {}", name, e)))?;
        let pca = Pca::new(Array1::from(artifact.pca.mean), components)?;

        Self::new(name, artifact.version, artifact.feature_names, scaler, pca)
    }

    pub fn load(name: &'static str, path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::data_file(path, e))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|e| AppError::data_file(path, e))?;
        let model = Self::from_artifact(name, artifact).map_err(|e| AppError::data_file(path, e))?;
        info!(
            model = name,
            version = %model.version,
            features = model.feature_names.len(),
            components = model.pca.n_components(),
            "fitted model loaded"
        );
        Ok(model)
    }

    /// Fits a scaler and a PCA over `x`, whose columns follow `feature_names`.
    pub fn fit(
        name: &'static str,
        version: impl Into<String>,
        feature_names: Vec<String>,
        x: &Array2<f64>,
        variance_threshold: f64,
    ) -> Result<Self, AppError> {
        let scaler = StandardScaler::fit(x)?;
        let pca = Pca::fit(&scaler.transform_rows(x), variance_threshold)?;
        Self::new(name, version, feature_names, scaler, pca)
    }

    /// Parameters in the on-disk artifact layout.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            version: self.version.clone(),
            feature_names: self.feature_names.clone(),
            scaler: ScalerArtifact {
                mean: self.scaler.mean().to_vec(),
                scale: self.scaler.scale().to_vec(),
            },
            pca: PcaArtifact {
                mean: self.pca.mean().to_vec(),
                components: self
                    .pca
                    .components()
                    .rows()
                    .into_iter()
                    .map(|r| r.to_vec())
                    .collect(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_components(&self) -> usize {
        self.pca.n_components()
    }

    /// Lays `vector` out in this model's feature order; absent features are 0.
    pub fn reindex(&self, vector: &ChampionVector) -> Array1<f64> {
        self.feature_names
            .iter()
            .map(|name| vector.get(name))
            .collect()
    }

    pub fn standardize(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.scaler.transform(x)
    }

    /// PCA projection of an already standardized vector.
    pub fn project(&self, standardized: ArrayView1<f64>) -> Array1<f64> {
        self.pca.transform(standardized)
    }

    pub fn standardize_rows(&self, x: &Array2<f64>) -> Array2<f64> {
        self.scaler.transform_rows(x)
    }

    pub fn project_rows(&self, standardized: &Array2<f64>) -> Array2<f64> {
        self.pca.transform_rows(standardized)
    }
}
