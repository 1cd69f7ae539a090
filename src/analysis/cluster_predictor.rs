use super::vector_builder::{ChampionVector, InsufficientData};
use crate::model::cluster::{ClusterModel, CLUSTER_COUNT};
use ndarray::Array1;
use serde::Serialize;

/// Archetype title and blurb for each cluster id. The strings are the
/// service's published Korean labels and are served unchanged.
pub const CLUSTER_LABELS: [(&str, &str); CLUSTER_COUNT] = [
    ("예측불가 플레이형", "정형화된 틀보다, 나만의 방식으로 흐름을 바꾸는 걸 좋아하는 타입입니다."),
    ("손에 익은 몰입형", "익숙한 챔프만 잡으면 몰입 끝. 감각에 몸을 맡기는 스타일입니다."),
    ("직진 전투형", "복잡한 거 싫고, 정면에서 붙어서 이기는 맛으로 플레이합니다."),
    ("감각 조율형", "상황에 따라 자연스럽게 조율하며, 흐름을 부드럽게 이어갑니다."),
    ("기본기 중심형", "무리하지 않고 안정적으로, 팀의 중심을 잡아주는 플레이를 선호합니다."),
    ("순간 포착형", "‘지금이야!’ 싶은 타이밍을 놓치지 않고 빠르게 전투를 열어버립니다."),
    ("그림 설계형", "머릿속에 시나리오를 그리고, 흐름을 계획하며 이끄는 걸 좋아합니다."),
    ("지속 퍼포먼스형", "조용히, 묵묵히, 꾸준히. 언뜻 안 보여도 결과로 말하는 타입입니다."),
    ("틈새 연결형", "눈에 띄진 않아도 빈틈을 메우고 팀을 자연스럽게 이어주는 연결고리입니다."),
    ("전장 전체형", "눈앞의 싸움보다 전체 맵을 보며, 흐름을 설계하고 움직입니다."),
];

pub const UNIDENTIFIED_TITLE: &str = "unidentified";
pub const UNIDENTIFIED_DESCRIPTION: &str = "insufficient data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    pub id: usize,
    pub title: String,
    pub description: String,
}

impl ClusterAssignment {
    pub fn from_id(id: usize) -> Self {
        let (title, description) = CLUSTER_LABELS[id % CLUSTER_COUNT];
        ClusterAssignment {
            id,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    /// Placeholder returned when the player has no usable mastery data.
    pub fn unidentified() -> Self {
        ClusterAssignment {
            id: 0,
            title: UNIDENTIFIED_TITLE.to_string(),
            description: UNIDENTIFIED_DESCRIPTION.to_string(),
        }
    }

    pub fn is_unidentified(&self) -> bool {
        self.title == UNIDENTIFIED_TITLE
    }
}

pub struct ClusterPredictor<'a> {
    model: &'a ClusterModel,
}

impl<'a> ClusterPredictor<'a> {
    pub fn new(model: &'a ClusterModel) -> Self {
        ClusterPredictor { model }
    }

    /// Reduced-space point for a vector built over the model's selected
    /// vocabulary, after popularity penalties.
    pub fn reduced_point(&self, vector: &ChampionVector) -> Array1<f64> {
        self.model.reduce(&vector.penalized(self.model.penalty()))
    }

    pub fn predict(&self, vector: Result<ChampionVector, InsufficientData>) -> ClusterAssignment {
        match vector {
            Ok(vector) => {
                let point = self.reduced_point(&vector);
                ClusterAssignment::from_id(self.model.nearest(point.view()))
            }
            Err(InsufficientData) => ClusterAssignment::unidentified(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_every_cluster() {
        for id in 0..CLUSTER_COUNT {
            let a = ClusterAssignment::from_id(id);
            assert_eq!(a.id, id);
            assert!(!a.title.is_empty());
            assert!(!a.is_unidentified());
        }
    }

    #[test]
    fn labels_are_the_published_strings() {
        let first = ClusterAssignment::from_id(0);
        assert_eq!(first.title, "예측불가 플레이형");
        assert_eq!(ClusterAssignment::from_id(9).title, "전장 전체형");
        assert!(CLUSTER_LABELS[5].1.starts_with("‘지금이야!’"));
    }

    #[test]
    fn sentinel_is_cluster_zero() {
        let a = ClusterAssignment::unidentified();
        assert_eq!(a.id, 0);
        assert_eq!(a.title, "unidentified");
        assert_eq!(a.description, "insufficient data");
        assert!(a.is_unidentified());
    }
}
