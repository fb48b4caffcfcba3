use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub video_id: i32,
    #[sea_orm(belongs_to, from = "video_id", to = "id")]
    pub video: HasOne<super::video::Entity>,

    /// Storage path of the rendition, e.g. `videos/video_HD.mp4`.
    pub file: String,
    /// One of: HD, FHD, UHD. Unique per video (see `seed::ensure_indexes`).
    pub quality: String,
}

impl ActiveModelBehavior for ActiveModel {}
