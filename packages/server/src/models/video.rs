use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{video, video_file};
use crate::error::AppError;

pub use super::shared::{PageQuery, Pagination, page_offset};
use super::shared::validate_name;

/// Rendition quality of a video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoQuality {
    Hd,
    Fhd,
    Uhd,
}

impl VideoQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoQuality::Hd => "HD",
            VideoQuality::Fhd => "FHD",
            VideoQuality::Uhd => "UHD",
        }
    }

    /// Human-readable label shown next to the file.
    pub fn display(self) -> &'static str {
        match self {
            VideoQuality::Hd => "HD (720p)",
            VideoQuality::Fhd => "FHD (1080p)",
            VideoQuality::Uhd => "UHD (4k)",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HD" => Some(VideoQuality::Hd),
            "FHD" => Some(VideoQuality::Fhd),
            "UHD" => Some(VideoQuality::Uhd),
            _ => None,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateVideoRequest {
    #[schema(example = "Видео 1")]
    pub name: String,
    /// Defaults to `false`.
    #[schema(example = true)]
    pub is_published: Option<bool>,
}

pub fn validate_create_video(payload: &CreateVideoRequest) -> Result<(), AppError> {
    validate_name(&payload.name)
}

/// PATCH body. Ownership cannot be changed.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateVideoRequest {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

pub fn validate_update_video(payload: &UpdateVideoRequest) -> Result<(), AppError> {
    if let Some(ref name) = payload.name {
        validate_name(name)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateVideoFileRequest {
    /// Storage path of the rendition.
    #[schema(example = "videos/video_HD.mp4")]
    pub file: String,
    pub quality: VideoQuality,
}

pub fn validate_create_video_file(payload: &CreateVideoFileRequest) -> Result<(), AppError> {
    let file = payload.file.trim();
    if file.is_empty() || file.len() > 1024 {
        return Err(AppError::Validation(
            "File path must be 1-1024 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoFileResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "videos/video_HD.mp4")]
    pub file: String,
    pub quality: String,
    #[schema(example = "HD (720p)")]
    pub quality_display: String,
}

impl From<video_file::Model> for VideoFileResponse {
    fn from(m: video_file::Model) -> Self {
        let quality_display = VideoQuality::parse(&m.quality)
            .map(|q| q.display().to_string())
            .unwrap_or_else(|| m.quality.clone());
        Self {
            id: m.id,
            file: m.file,
            quality: m.quality,
            quality_display,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = true)]
    pub is_published: bool,
    #[schema(example = 3)]
    pub owner_id: i32,
    /// Owner's username.
    #[schema(example = "user_3")]
    pub owner: String,
    #[schema(example = "Видео 1")]
    pub name: String,
    #[schema(example = 12)]
    pub total_likes: i32,
    pub created_at: DateTime<Utc>,
    pub video_files: Vec<VideoFileResponse>,
}

impl VideoResponse {
    pub fn new(m: video::Model, owner: String, files: Vec<video_file::Model>) -> Self {
        Self {
            id: m.id,
            is_published: m.is_published,
            owner_id: m.owner_id,
            owner,
            name: m.name,
            total_likes: m.total_likes,
            created_at: m.created_at,
            video_files: files.into_iter().map(VideoFileResponse::from).collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoListResponse {
    pub data: Vec<VideoResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoIdResponse {
    #[schema(example = 1)]
    pub id: i32,
}
