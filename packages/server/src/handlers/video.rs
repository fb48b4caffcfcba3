use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{like, video, video_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath, AppQuery};
use crate::models::video::*;
use crate::state::AppState;
use crate::utils::video::{
    find_owned_video_for_update, find_visible_video, hydrate_videos, visibility_filter,
};
use crate::viewer::Viewer;

#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List visible videos",
    description = "Paginated, newest first. Anonymous callers see published videos; signed-in users also see their own unpublished videos; staff see all videos.",
    params(PageQuery),
    responses(
        (status = 200, description = "List of videos", body = VideoListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_videos(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<VideoListResponse>, AppError> {
    let viewer = Viewer::from(auth_user);
    let (page, per_page) = query.resolve(state.config.pagination.default_per_page)?;

    let mut select = video::Entity::find();
    if let Some(cond) = visibility_filter(viewer) {
        select = select.filter(cond);
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let videos = select
        .order_by_desc(video::Column::CreatedAt)
        .order_by_desc(video::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(VideoListResponse {
        data: hydrate_videos(&state.db, videos).await?,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "createVideo",
    summary = "Create a video",
    description = "The caller becomes the owner. New videos start with zero likes and are unpublished unless `is_published` is set.",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video created", body = VideoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_video(&payload)?;

    let model = video::ActiveModel {
        owner_id: Set(auth_user.user_id),
        name: Set(payload.name.trim().to_string()),
        is_published: Set(payload.is_published.unwrap_or(false)),
        total_likes: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(video_id = model.id, "Video created");

    Ok((
        StatusCode::CREATED,
        Json(VideoResponse::new(model, auth_user.username, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/ids",
    tag = "Videos",
    operation_id = "listPublishedVideoIds",
    summary = "List ids of all published videos",
    description = "Ascending by id. Requires staff privilege.",
    responses(
        (status = 200, description = "Published video ids", body = Vec<VideoIdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_published_ids(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoIdResponse>>, AppError> {
    auth_user.require_staff()?;

    let ids: Vec<i32> = video::Entity::find()
        .select_only()
        .column(video::Column::Id)
        .filter(video::Column::IsPublished.eq(true))
        .order_by_asc(video::Column::Id)
        .into_tuple()
        .all(&state.db)
        .await?;

    Ok(Json(ids.into_iter().map(|id| VideoIdResponse { id }).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get a video by ID",
    description = "Videos the caller may not see are reported as not found.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 401, description = "Bad token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_video(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<VideoResponse>, AppError> {
    let model = find_visible_video(&state.db, id, Viewer::from(auth_user)).await?;
    let mut hydrated = hydrate_videos(&state.db, vec![model]).await?;
    hydrated
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Partially updates name and publication state. Owner only. `total_likes` and ownership are not writable.",
    params(("id" = i32, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateVideoRequest>,
) -> Result<Json<VideoResponse>, AppError> {
    validate_update_video(&payload)?;

    // Row lock serialises with concurrent like toggles touching total_likes.
    let txn = state.db.begin().await?;
    let existing = find_owned_video_for_update(&txn, id, &auth_user).await?;

    let model = if payload == UpdateVideoRequest::default() {
        existing
    } else {
        let mut active: video::ActiveModel = existing.into();
        if let Some(ref name) = payload.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(is_published) = payload.is_published {
            active.is_published = Set(is_published);
        }
        active.update(&txn).await?
    };
    txn.commit().await?;

    let mut hydrated = hydrate_videos(&state.db, vec![model]).await?;
    hydrated
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Owner only. Removes the video together with its likes and file renditions.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_owned_video_for_update(&txn, id, &auth_user).await?;

    let likes = like::Entity::delete_many()
        .filter(like::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    video_file::Entity::delete_many()
        .filter(video_file::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    video::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(likes_removed = likes.rows_affected, "Video deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/files",
    tag = "Videos",
    operation_id = "listVideoFiles",
    summary = "List a video's file renditions",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "File renditions", body = Vec<VideoFileResponse>),
        (status = 401, description = "Bad token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_video_files(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Vec<VideoFileResponse>>, AppError> {
    find_visible_video(&state.db, id, Viewer::from(auth_user)).await?;

    let files = video_file::Entity::find()
        .filter(video_file::Column::VideoId.eq(id))
        .order_by_asc(video_file::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(files.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/files",
    tag = "Videos",
    operation_id = "createVideoFile",
    summary = "Attach a file rendition to a video",
    description = "Owner only. Each quality (HD, FHD, UHD) may appear at most once per video.",
    params(("id" = i32, Path, description = "Video ID")),
    request_body = CreateVideoFileRequest,
    responses(
        (status = 201, description = "File attached", body = VideoFileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Quality already present (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, quality = payload.quality.as_str()))]
pub async fn create_video_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<CreateVideoFileRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_video_file(&payload)?;

    let txn = state.db.begin().await?;
    find_owned_video_for_update(&txn, id, &auth_user).await?;

    let exists = video_file::Entity::find()
        .filter(video_file::Column::VideoId.eq(id))
        .filter(video_file::Column::Quality.eq(payload.quality.as_str()))
        .count(&txn)
        .await?;
    if exists > 0 {
        return Err(duplicate_quality(payload.quality));
    }

    let model = video_file::ActiveModel {
        video_id: Set(id),
        file: Set(payload.file.trim().to_string()),
        quality: Set(payload.quality.as_str().to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_quality(payload.quality),
        _ => AppError::from(e),
    })?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(VideoFileResponse::from(model))))
}

fn duplicate_quality(quality: VideoQuality) -> AppError {
    AppError::Conflict(format!(
        "Video already has a {} rendition",
        quality.as_str()
    ))
}

