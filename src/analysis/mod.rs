pub mod cluster_predictor;
pub mod recommender;
pub mod similarity;
pub mod vector_builder;
