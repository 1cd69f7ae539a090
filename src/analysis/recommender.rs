use super::similarity::{cosine_against_rows, top_k_indices};
use super::vector_builder::ChampionVector;
use crate::data::frequency::PopulationMatrix;
use crate::data::roles::Role;
use crate::data::ReferenceData;
use crate::error::AppError;
use crate::model::projection::FittedModel;
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Nearest reference players averaged per population.
pub const NEIGHBOURS: usize = 50;
pub const MASTER_WEIGHT: f64 = 0.6;
pub const USER_WEIGHT: f64 = 0.4;
pub const MAIN_ROLE_BONUS: f64 = 0.2;
pub const SUB_ROLE_BONUS: f64 = 0.1;
/// Added to every raw score before percentage scaling.
pub const SCORE_FLOOR: f64 = 7.0;
pub const CANDIDATE_LIMIT: usize = 100;
pub const PER_ROLE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedChampion {
    pub champion: String,
    /// Percentage of the best candidate's score, 1..=100.
    pub affinity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationSet {
    pub input_champions: Vec<String>,
    pub by_role: BTreeMap<Role, Vec<RecommendedChampion>>,
    pub insufficient_data: bool,
}

impl RecommendationSet {
    /// Five empty buckets, used when the mastery sample carries no signal.
    pub fn insufficient(input_champions: Vec<String>) -> Self {
        RecommendationSet {
            input_champions,
            by_role: Role::ALL.iter().map(|r| (*r, Vec::new())).collect(),
            insufficient_data: true,
        }
    }

    pub fn role(&self, role: Role) -> &[RecommendedChampion] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn champions(&self) -> impl Iterator<Item = &RecommendedChampion> {
        self.by_role.values().flatten()
    }
}

/// The recommendation model plus both reference populations expressed in its
/// space: master rows after standardization and PCA, user rows after
/// standardization only.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    model: FittedModel,
    master_pca: Array2<f64>,
    user_scaled: Array2<f64>,
}

impl SimilarityIndex {
    pub fn build(model: FittedModel, reference: &ReferenceData) -> Result<Self, AppError> {
        let features = model.feature_names();
        let missing = features
            .iter()
            .filter(|f| !reference.master.contains(f) || !reference.user.contains(f))
            .count();
        if missing == features.len() {
            return Err(AppError::Model(format!(
                "{} model shares no features with the reference populations",
                model.name()
            )));
        }
        if missing > 0 {
            warn!(missing, "model features absent from a reference population");
        }

        let master_scaled = model.standardize_rows(&reference.master.select_columns(features));
        let master_pca = model.project_rows(&master_scaled);
        let user_scaled = model.standardize_rows(&reference.user.select_columns(features));

        Ok(SimilarityIndex {
            model,
            master_pca,
            user_scaled,
        })
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }
}

pub struct ChampionRecommender<'a> {
    reference: &'a ReferenceData,
    index: &'a SimilarityIndex,
}

impl<'a> ChampionRecommender<'a> {
    pub fn new(reference: &'a ReferenceData, index: &'a SimilarityIndex) -> Self {
        ChampionRecommender { reference, index }
    }

    /// Raw candidate score:
    /// `(0.6 × master × master_penalty + 0.4 × user × user_penalty) × (1 + bonus) + 7`
    /// where the bonus is 0.2 for a main role and 0.1 for a sub role the
    /// player already plays.
    pub fn calculate_score(
        &self,
        champion: &str,
        top_master: &BTreeMap<String, f64>,
        top_user: &BTreeMap<String, f64>,
        input_roles: &BTreeSet<Role>,
    ) -> f64 {
        let master = top_master.get(champion).copied().unwrap_or(0.0)
            * self.reference.master_penalty.get(champion);
        let user = top_user.get(champion).copied().unwrap_or(0.0)
            * self.reference.user_penalty.get(champion);
        let base = MASTER_WEIGHT * master + USER_WEIGHT * user;

        let mut bonus = 0.0;
        if let Some(roles) = self.reference.roles.get(champion) {
            if roles.main_role.is_some_and(|r| input_roles.contains(&r)) {
                bonus += MAIN_ROLE_BONUS;
            }
            if roles.sub_role.is_some_and(|r| input_roles.contains(&r)) {
                bonus += SUB_ROLE_BONUS;
            }
        }

        base * (1.0 + bonus) + SCORE_FLOOR
    }

    /// Per-role recommendations for a vector over the common vocabulary.
    pub fn recommend(
        &self,
        vector: &ChampionVector,
        input_champions: Vec<String>,
    ) -> RecommendationSet {
        let model = self.index.model();
        let scaled = model.standardize(model.reindex(vector).view());
        let projected = model.project(scaled.view());

        let sim_master = cosine_against_rows(projected.view(), &self.index.master_pca);
        let sim_user = cosine_against_rows(scaled.view(), &self.index.user_scaled);

        let top_master = neighbour_mean(&self.reference.master, &sim_master);
        let top_user = neighbour_mean(&self.reference.user, &sim_user);

        let input_roles = self.reference.roles.roles_played(&input_champions);
        let candidates: BTreeSet<&String> = top_master.keys().chain(top_user.keys()).collect();

        let mut scored: Vec<(String, f64)> = candidates
            .into_iter()
            .filter(|c| !input_champions.contains(c))
            .map(|c| {
                let score = self.calculate_score(c, &top_master, &top_user, &input_roles);
                (c.clone(), score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(CANDIDATE_LIMIT);
        debug!(candidates = scored.len(), "candidates ranked");

        let max_score = scored.first().map(|(_, s)| *s).unwrap_or(0.0);
        let mut by_role: BTreeMap<Role, Vec<RecommendedChampion>> =
            Role::ALL.iter().map(|r| (*r, Vec::new())).collect();

        for (champion, score) in scored {
            let affinity = to_affinity(score, max_score);
            for role in self.reference.positions.positions_of(&champion) {
                let bucket = by_role.entry(*role).or_default();
                if bucket.len() < PER_ROLE_LIMIT {
                    bucket.push(RecommendedChampion {
                        champion: champion.clone(),
                        affinity,
                    });
                }
            }
        }

        RecommendationSet {
            input_champions,
            by_role,
            insufficient_data: false,
        }
    }
}

/// Per-champion mean of the `NEIGHBOURS` raw rows most similar to the query.
fn neighbour_mean(
    population: &PopulationMatrix,
    similarity: &Array1<f64>,
) -> BTreeMap<String, f64> {
    population.mean_of_rows(&top_k_indices(similarity, NEIGHBOURS))
}

/// Integer percentage of `max_score`, never below 1.
pub fn to_affinity(score: f64, max_score: f64) -> u8 {
    if max_score <= 0.0 || !score.is_finite() {
        return 1;
    }
    let pct = (score / max_score * 100.0).floor();
    pct.clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::penalty::PenaltyWeights;
    use crate::data::roles::{ChampionRoles, PositionLists, RoleMap};

    const EPS: f64 = 1e-12;

    fn counts(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    fn population(offset: f64) -> PopulationMatrix {
        let rows: BTreeMap<String, BTreeMap<&str, Option<f64>>> = (0..6)
            .map(|i| {
                let i = i as f64;
                let cells = BTreeMap::from([
                    ("Ahri", Some(1.0 + i + offset)),
                    ("Garen", Some(6.0 - i)),
                    ("Lulu", Some(1.0 + (i % 3.0))),
                    ("Malphite", Some(1.0 + (i % 2.0) + offset)),
                ]);
                (format!("p{}", i), cells)
            })
            .collect();
        PopulationMatrix::from_rows(rows).unwrap()
    }

    /// Malphite is over-represented among masters and Lulu among users;
    /// both weigh 0.4 on that side and 1.0 on the other.
    fn fixture() -> (ReferenceData, SimilarityIndex) {
        let roles = RoleMap::from_entries([
            ("Ahri", ChampionRoles { main_role: Some(Role::Mid), sub_role: None }),
            ("Garen", ChampionRoles { main_role: Some(Role::Top), sub_role: None }),
            (
                "Lulu",
                ChampionRoles { main_role: Some(Role::Support), sub_role: Some(Role::Mid) },
            ),
            (
                "Malphite",
                ChampionRoles { main_role: Some(Role::Top), sub_role: Some(Role::Support) },
            ),
        ]);
        let positions = PositionLists::from_lists([(Role::Top, vec!["Garen", "Malphite"])]);
        let master_penalty = PenaltyWeights::from_counts(
            &counts(&[("Ahri", 0.0), ("Garen", 0.0), ("Lulu", 0.0), ("Malphite", 10.0)]),
            1.0,
        );
        let user_penalty = PenaltyWeights::from_counts(
            &counts(&[("Ahri", 0.0), ("Garen", 0.0), ("Lulu", 10.0), ("Malphite", 0.0)]),
            1.0,
        );
        let reference = ReferenceData::new(
            population(0.0),
            population(0.5),
            roles,
            positions,
            master_penalty,
            user_penalty,
        );

        let features = reference.common_vocabulary().to_vec();
        let x = reference.master.select_columns(&features);
        let model = FittedModel::fit("recommend", "test", features, &x, 0.9).unwrap();
        let index = SimilarityIndex::build(model, &reference).unwrap();
        (reference, index)
    }

    fn neighbour_maps() -> (BTreeMap<String, f64>, BTreeMap<String, f64>) {
        let master = counts(&[("Ahri", 2.0), ("Garen", 2.0), ("Lulu", 2.0), ("Malphite", 2.0)]);
        let user = counts(&[("Ahri", 1.0), ("Garen", 1.0), ("Lulu", 1.0), ("Malphite", 1.0)]);
        (master, user)
    }

    fn played(roles: &[Role]) -> BTreeSet<Role> {
        roles.iter().copied().collect()
    }

    #[test]
    fn penalty_weights_in_fixture() {
        let (reference, _) = fixture();
        assert!((reference.master_penalty.get("Malphite") - 0.4).abs() < EPS);
        assert_eq!(reference.master_penalty.get("Lulu"), 1.0);
        assert!((reference.user_penalty.get("Lulu") - 0.4).abs() < EPS);
        assert_eq!(reference.user_penalty.get("Malphite"), 1.0);
    }

    #[test]
    fn score_without_role_bonus() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);
        let (master, user) = neighbour_maps();

        // 0.6 * 2 + 0.4 * 1, Ahri is Mid only
        let score = recommender.calculate_score("Ahri", &master, &user, &played(&[Role::Top]));
        assert!((score - 8.6).abs() < EPS, "got {}", score);
    }

    #[test]
    fn score_with_main_role_bonus() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);
        let (master, user) = neighbour_maps();

        let score = recommender.calculate_score("Garen", &master, &user, &played(&[Role::Top]));
        assert!((score - (1.6 * 1.2 + 7.0)).abs() < EPS, "got {}", score);
    }

    #[test]
    fn score_with_sub_role_bonus() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);
        let (master, user) = neighbour_maps();

        // user side carries Lulu's 0.4 weight
        let score = recommender.calculate_score("Lulu", &master, &user, &played(&[Role::Mid]));
        let expected = (0.6 * 2.0 + 0.4 * 1.0 * 0.4) * 1.1 + 7.0;
        assert!((score - expected).abs() < EPS, "got {}", score);
    }

    #[test]
    fn score_with_both_role_bonuses() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);
        let (master, user) = neighbour_maps();

        let score = recommender.calculate_score(
            "Malphite",
            &master,
            &user,
            &played(&[Role::Top, Role::Support]),
        );
        let expected = (0.6 * 2.0 * 0.4 + 0.4 * 1.0) * 1.3 + 7.0;
        assert!((score - expected).abs() < EPS, "got {}", score);
    }

    #[test]
    fn champion_absent_from_neighbours_scores_the_floor() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);

        let score = recommender.calculate_score(
            "Zed",
            &BTreeMap::new(),
            &BTreeMap::new(),
            &played(&[Role::Mid]),
        );
        assert_eq!(score, 7.0);
    }

    #[test]
    fn penalised_champion_ranks_below_equal_neighbour_mean() {
        let (reference, index) = fixture();
        let recommender = ChampionRecommender::new(&reference, &index);
        let (master, user) = neighbour_maps();
        let none = BTreeSet::new();

        let garen = recommender.calculate_score("Garen", &master, &user, &none);
        let malphite = recommender.calculate_score("Malphite", &master, &user, &none);
        let ahri = recommender.calculate_score("Ahri", &master, &user, &none);
        let lulu = recommender.calculate_score("Lulu", &master, &user, &none);
        assert!(malphite < garen, "{} !< {}", malphite, garen);
        assert!(lulu < ahri, "{} !< {}", lulu, ahri);
    }

    #[test]
    fn neighbour_mean_averages_the_fifty_most_similar_rows() {
        let rows: BTreeMap<String, BTreeMap<&str, Option<f64>>> = (0..60)
            .map(|i| {
                let cells = BTreeMap::from([("Rank", Some(i as f64)), ("Flat", Some(1.0))]);
                (format!("p{:02}", i), cells)
            })
            .collect();
        let population = PopulationMatrix::from_rows(rows).unwrap();

        let closest_first = Array1::from_iter((0..60).map(|i| 1.0 - i as f64 / 100.0));
        let mean = neighbour_mean(&population, &closest_first);
        assert!((mean["Rank"] - 24.5).abs() < EPS, "got {}", mean["Rank"]);
        assert!((mean["Flat"] - 1.0).abs() < EPS);

        let closest_last = Array1::from_iter((0..60).map(|i| i as f64 / 100.0));
        let mean = neighbour_mean(&population, &closest_last);
        assert!((mean["Rank"] - 34.5).abs() < EPS, "got {}", mean["Rank"]);
    }

    #[test]
    fn affinity_is_floored_and_clamped() {
        assert_eq!(to_affinity(10.0, 10.0), 100);
        assert_eq!(to_affinity(9.999, 10.0), 99);
        assert_eq!(to_affinity(0.01, 10.0), 1);
        assert_eq!(to_affinity(0.0, 0.0), 1);
    }

    #[test]
    fn insufficient_set_has_five_empty_buckets() {
        let set = RecommendationSet::insufficient(vec!["Annie".to_string()]);
        assert_eq!(set.by_role.len(), 5);
        assert!(set.champions().next().is_none());
        assert!(set.insufficient_data);
        assert!(set.role(Role::Mid).is_empty());
    }
}
