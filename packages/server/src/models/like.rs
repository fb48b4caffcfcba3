use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::like;

/// Like created by a toggle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    #[schema(example = 12)]
    pub video_id: i32,
    #[schema(example = 3)]
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<like::Model> for LikeResponse {
    fn from(m: like::Model) -> Self {
        Self {
            video_id: m.video_id,
            user_id: m.user_id,
            created_at: m.created_at,
        }
    }
}
