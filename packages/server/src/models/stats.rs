use serde::Serialize;

use crate::stats::{ConsistencyReport, CounterDrift, OwnerLikes, OwnerMismatch};

/// Total likes attributed to one video owner.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OwnerLikesResponse {
    #[schema(example = 3)]
    pub owner_id: i32,
    #[schema(example = "user_3")]
    pub username: String,
    #[schema(example = 17)]
    pub likes_sum: i64,
}

impl From<OwnerLikes> for OwnerLikesResponse {
    fn from(r: OwnerLikes) -> Self {
        Self {
            owner_id: r.owner_id,
            username: r.username,
            likes_sum: r.likes_sum,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct OwnerMismatchResponse {
    pub owner_id: i32,
    pub username: String,
    /// Sum reported by the correlated-subquery path (null if the owner is absent there).
    pub via_subquery: Option<i64>,
    /// Sum reported by the group-by path (null if the owner is absent there).
    pub via_group_by: Option<i64>,
}

impl From<OwnerMismatch> for OwnerMismatchResponse {
    fn from(m: OwnerMismatch) -> Self {
        Self {
            owner_id: m.owner_id,
            username: m.username,
            via_subquery: m.via_subquery,
            via_group_by: m.via_group_by,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CounterDriftResponse {
    pub video_id: i32,
    /// Cached counter on the video row.
    pub total_likes: i32,
    /// Actual number of like rows.
    pub like_rows: i64,
}

impl From<CounterDrift> for CounterDriftResponse {
    fn from(d: CounterDrift) -> Self {
        Self {
            video_id: d.video_id,
            total_likes: d.total_likes,
            like_rows: d.like_rows,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ConsistencyResponse {
    #[schema(example = true)]
    pub consistent: bool,
    #[schema(example = 10000)]
    pub owners_checked: usize,
    pub mismatched_owners: Vec<OwnerMismatchResponse>,
    pub drifted_videos: Vec<CounterDriftResponse>,
}

impl From<ConsistencyReport> for ConsistencyResponse {
    fn from(r: ConsistencyReport) -> Self {
        Self {
            consistent: r.is_consistent(),
            owners_checked: r.owners_checked,
            mismatched_owners: r.mismatched_owners.into_iter().map(Into::into).collect(),
            drifted_videos: r.drifted_videos.into_iter().map(Into::into).collect(),
        }
    }
}
