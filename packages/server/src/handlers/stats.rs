use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::stats::{ConsistencyResponse, OwnerLikesResponse};
use crate::state::AppState;
use crate::stats::StatsService;

#[utoipa::path(
    get,
    path = "/statistics-subquery",
    tag = "Statistics",
    operation_id = "likesByOwnerSubquery",
    summary = "Likes per owner, correlated subquery",
    description = "Every user with the sum of `total_likes` over their published videos, computed with a correlated scalar subquery. Ordered by `likes_sum` descending, then username. Requires staff privilege.",
    responses(
        (status = 200, description = "Likes per owner", body = Vec<OwnerLikesResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn likes_by_owner_subquery(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OwnerLikesResponse>>, AppError> {
    let rows = StatsService::new(&state.db)
        .likes_by_owner_via_correlated_aggregate(auth_user.viewer())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/statistics-group-by",
    tag = "Statistics",
    operation_id = "likesByOwnerGroupBy",
    summary = "Likes per owner, join and group by",
    description = "Same result as the subquery endpoint, computed by counting like rows with joins and one GROUP BY. Requires staff privilege.",
    responses(
        (status = 200, description = "Likes per owner", body = Vec<OwnerLikesResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn likes_by_owner_group_by(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OwnerLikesResponse>>, AppError> {
    let rows = StatsService::new(&state.db)
        .likes_by_owner_via_group_by(auth_user.viewer())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/statistics-consistency",
    tag = "Statistics",
    operation_id = "likesConsistency",
    summary = "Cross-check like counters",
    description = "Compares both per-owner aggregations and lists videos whose `total_likes` differs from their like rows. Requires staff privilege.",
    responses(
        (status = 200, description = "Consistency report", body = ConsistencyResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn likes_consistency(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ConsistencyResponse>, AppError> {
    let report = StatsService::new(&state.db)
        .consistency_report(auth_user.viewer())
        .await?;
    Ok(Json(report.into()))
}
