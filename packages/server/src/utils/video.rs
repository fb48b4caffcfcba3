use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entity::{user, video, video_file};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::video::VideoResponse;
use crate::viewer::Viewer;

/// Row filter for what `viewer` may see. `None` means unrestricted.
///
/// Anonymous callers see published videos, staff see everything, and other
/// users see published videos plus their own.
pub fn visibility_filter(viewer: Viewer) -> Option<Condition> {
    match viewer {
        Viewer::Anonymous => Some(Condition::all().add(video::Column::IsPublished.eq(true))),
        Viewer::User { is_staff: true, .. } => None,
        Viewer::User { user_id, .. } => Some(
            Condition::any()
                .add(video::Column::IsPublished.eq(true))
                .add(video::Column::OwnerId.eq(user_id)),
        ),
    }
}

/// Same rule as [`visibility_filter`], applied to a loaded row.
pub fn is_visible(model: &video::Model, viewer: Viewer) -> bool {
    match viewer {
        Viewer::Anonymous => model.is_published,
        Viewer::User { is_staff: true, .. } => true,
        Viewer::User { user_id, .. } => model.is_published || model.owner_id == user_id,
    }
}

/// Look up a video the viewer may see. Invisible videos are reported as
/// missing so ids of unpublished videos are not disclosed.
pub async fn find_visible_video<C: ConnectionTrait>(
    db: &C,
    id: i32,
    viewer: Viewer,
) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|m| is_visible(m, viewer))
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

/// Lock a video row for modification by its owner.
pub async fn find_owned_video_for_update(
    txn: &DatabaseTransaction,
    id: i32,
    auth_user: &AuthUser,
) -> Result<video::Model, AppError> {
    let model = video::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))?;

    if model.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }
    Ok(model)
}

/// Attach owner usernames and file renditions to a page of videos.
pub async fn hydrate_videos<C: ConnectionTrait>(
    db: &C,
    videos: Vec<video::Model>,
) -> Result<Vec<VideoResponse>, AppError> {
    if videos.is_empty() {
        return Ok(Vec::new());
    }

    let video_ids: Vec<i32> = videos.iter().map(|v| v.id).collect();
    let mut owner_ids: Vec<i32> = videos.iter().map(|v| v.owner_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners: HashMap<i32, String> = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .filter(user::Column::Id.is_in(owner_ids))
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut files: HashMap<i32, Vec<video_file::Model>> = HashMap::new();
    for file in video_file::Entity::find()
        .filter(video_file::Column::VideoId.is_in(video_ids))
        .order_by_asc(video_file::Column::Id)
        .all(db)
        .await?
    {
        files.entry(file.video_id).or_default().push(file);
    }

    Ok(videos
        .into_iter()
        .map(|v| {
            let owner = owners.get(&v.owner_id).cloned().unwrap_or_default();
            let video_files = files.remove(&v.id).unwrap_or_default();
            VideoResponse::new(v, owner, video_files)
        })
        .collect())
}
