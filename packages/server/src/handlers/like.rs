use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppPath;
use crate::likes::{LikeService, ToggleOutcome};
use crate::models::like::LikeResponse;
use crate::state::AppState;
use crate::viewer::Viewer;

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Likes",
    operation_id = "toggleLike",
    summary = "Like or unlike a video",
    description = "Toggles the caller's like on a published video. Creates the like (201) when absent and removes it (204) when present; the video's `total_likes` moves by exactly one in the same transaction.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 201, description = "Like created", body = LikeResponse),
        (status = 204, description = "Like removed"),
        (status = 400, description = "Video is not published (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Concurrent toggle collided (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn toggle_like(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Response, AppError> {
    let lock_timeout = state.config.likes.lock_timeout_ms.map(Duration::from_millis);

    let outcome = LikeService::new(&state.db)
        .with_lock_timeout(lock_timeout)
        .toggle(id, Viewer::from(auth_user))
        .await?;

    Ok(match outcome {
        ToggleOutcome::Created(like) => {
            (StatusCode::CREATED, Json(LikeResponse::from(like))).into_response()
        }
        ToggleOutcome::Removed => StatusCode::NO_CONTENT.into_response(),
    })
}
