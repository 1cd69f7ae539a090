//! The immutable recommendation context shared by every request.

use crate::analysis::cluster_predictor::{ClusterAssignment, ClusterPredictor};
use crate::analysis::recommender::{ChampionRecommender, RecommendationSet, SimilarityIndex};
use crate::analysis::vector_builder::VectorBuilder;
use crate::api::models::{ChampionMasteryDto, RiotId};
use crate::api::PlayerDataSource;
use crate::data::champions::ChampionNames;
use crate::data::ReferenceData;
use crate::error::AppError;
use crate::model::cluster::{ClusterFitParams, ClusterModel};
use crate::model::projection::FittedModel;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Mastery entries requested per player.
pub const MASTERY_SAMPLE_SIZE: usize = 5;

/// Cluster label and recommendations for one player, from a single mastery
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerProfile {
    pub riot_id: String,
    pub cluster: ClusterAssignment,
    pub recommendations: RecommendationSet,
}

/// Reference data, champion names and both fitted models.
///
/// Built once; every method takes `&self`, so one engine can serve any number
/// of concurrent callers behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    reference: ReferenceData,
    names: ChampionNames,
    recommend_index: SimilarityIndex,
    cluster_model: ClusterModel,
}

impl Engine {
    /// Fits the cluster model and indexes both populations in the
    /// recommendation model's space.
    pub fn new(
        reference: ReferenceData,
        names: ChampionNames,
        recommend_model: FittedModel,
        cluster_params: &ClusterFitParams,
    ) -> Result<Self, AppError> {
        if names.is_empty() {
            return Err(AppError::ConfigError("champion name table is empty".to_string()));
        }
        let recommend_index = SimilarityIndex::build(recommend_model, &reference)?;
        let cluster_model = ClusterModel::fit_bounded(&reference.master, cluster_params)?;

        info!(
            champions = names.len(),
            recommend_version = recommend_index.model().version(),
            "engine ready"
        );
        Ok(Engine {
            reference,
            names,
            recommend_index,
            cluster_model,
        })
    }

    /// Loads reference tables and the recommendation model from `data_dir`.
    pub fn load(data_dir: &Path, names: ChampionNames) -> Result<Self, AppError> {
        let reference = ReferenceData::load(data_dir)?;
        let model = FittedModel::load(
            "recommend",
            &data_dir.join("models").join("recommend_model.json"),
        )?;
        Self::new(reference, names, model, &ClusterFitParams::default())
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn cluster_model(&self) -> &ClusterModel {
        &self.cluster_model
    }

    pub fn recommend_from_mastery(&self, sample: &[ChampionMasteryDto]) -> RecommendationSet {
        let builder = VectorBuilder::new(&self.names);
        let input_champions = builder.input_champions(sample);

        match builder.build(sample, self.reference.common_vocabulary()) {
            Ok(vector) => ChampionRecommender::new(&self.reference, &self.recommend_index)
                .recommend(&vector, input_champions),
            Err(_) => {
                debug!("no usable mastery for recommendation");
                RecommendationSet::insufficient(input_champions)
            }
        }
    }

    pub fn cluster_from_mastery(&self, sample: &[ChampionMasteryDto]) -> ClusterAssignment {
        let vector =
            VectorBuilder::new(&self.names).build(sample, self.cluster_model.vocabulary());
        ClusterPredictor::new(&self.cluster_model).predict(vector)
    }

    pub fn recommend<S>(&self, source: &S, riot_id: &RiotId) -> Result<RecommendationSet, AppError>
    where
        S: PlayerDataSource + ?Sized,
    {
        let sample = fetch_sample(source, riot_id)?;
        Ok(self.recommend_from_mastery(&sample))
    }

    pub fn predict_cluster<S>(
        &self,
        source: &S,
        riot_id: &RiotId,
    ) -> Result<ClusterAssignment, AppError>
    where
        S: PlayerDataSource + ?Sized,
    {
        let sample = fetch_sample(source, riot_id)?;
        Ok(self.cluster_from_mastery(&sample))
    }

    pub fn profile<S>(&self, source: &S, riot_id: &RiotId) -> Result<PlayerProfile, AppError>
    where
        S: PlayerDataSource + ?Sized,
    {
        let sample = fetch_sample(source, riot_id)?;
        Ok(PlayerProfile {
            riot_id: riot_id.to_string(),
            cluster: self.cluster_from_mastery(&sample),
            recommendations: self.recommend_from_mastery(&sample),
        })
    }
}

fn fetch_sample<S>(source: &S, riot_id: &RiotId) -> Result<Vec<ChampionMasteryDto>, AppError>
where
    S: PlayerDataSource + ?Sized,
{
    let puuid = source.resolve_player(riot_id)?;
    let mut sample = source.top_mastery(&puuid, MASTERY_SAMPLE_SIZE)?;
    sample.truncate(MASTERY_SAMPLE_SIZE);
    debug!(riot_id = %riot_id, entries = sample.len(), "mastery sample fetched");
    Ok(sample)
}
