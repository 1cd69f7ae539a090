//! Fitted transforms: standardization, PCA and the k-means cluster model.

pub mod cluster;
pub mod pca;
pub mod projection;
pub mod scaler;
