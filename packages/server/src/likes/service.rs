use std::time::Duration;

use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entity::{like, video};
use crate::viewer::Viewer;

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("authentication required")]
    Unauthorized,
    #[error("video {0} not found")]
    NotFound(i32),
    #[error("no published video matches this request")]
    InvalidState,
    #[error("like already exists")]
    Conflict,
    /// The guarded counter update did not touch exactly one row.
    #[error("like counter for video {0} could not be adjusted")]
    CounterMismatch(i32),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Created(like::Model),
    Removed,
}

/// Owns every write to the `likes` table and to `videos.total_likes`.
pub struct LikeService<'a, C: TransactionTrait> {
    conn: &'a C,
    lock_timeout: Option<Duration>,
}

impl<'a, C: TransactionTrait<Transaction = DatabaseTransaction>> LikeService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            lock_timeout: None,
        }
    }

    /// Bound how long a toggle waits for the video's row lock.
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Like the video if the viewer has not liked it yet, otherwise remove the like.
    ///
    /// The video row is locked `FOR UPDATE` for the whole read-check-write
    /// sequence, so toggles on the same video are strictly ordered while
    /// toggles on different videos proceed independently. The like row and the
    /// counter change commit together or not at all.
    pub async fn toggle(&self, video_id: i32, viewer: Viewer) -> Result<ToggleOutcome, LikeError> {
        let user_id = viewer.user_id().ok_or(LikeError::Unauthorized)?;

        let txn = self.conn.begin().await?;

        if let Some(timeout) = self.lock_timeout {
            txn.execute_unprepared(&format!(
                "SET LOCAL lock_timeout = '{}ms'",
                timeout.as_millis()
            ))
            .await?;
        }

        let Some(target) = video::Entity::find_by_id(video_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(LikeError::NotFound(video_id));
        };

        if !target.is_published {
            txn.rollback().await?;
            return Err(LikeError::InvalidState);
        }

        let existing = like::Entity::find_by_id((video_id, user_id))
            .one(&txn)
            .await?;

        let outcome = match existing {
            Some(_) => {
                let deleted = like::Entity::delete_by_id((video_id, user_id))
                    .exec(&txn)
                    .await?;
                if deleted.rows_affected != 1 {
                    return Err(LikeError::CounterMismatch(video_id));
                }
                adjust_total_likes(&txn, video_id, -1).await?;
                ToggleOutcome::Removed
            }
            None => {
                let model = like::ActiveModel {
                    video_id: Set(video_id),
                    user_id: Set(user_id),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await
                .map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => LikeError::Conflict,
                    _ => LikeError::Db(e),
                })?;
                adjust_total_likes(&txn, video_id, 1).await?;
                ToggleOutcome::Created(model)
            }
        };

        txn.commit().await?;

        debug!(
            video_id,
            user_id,
            created = matches!(outcome, ToggleOutcome::Created(_)),
            "Toggled like"
        );

        Ok(outcome)
    }
}

/// Apply `delta` to the cached counter inside the caller's transaction.
///
/// Decrements carry a `total_likes >= -delta` guard, so the counter cannot go
/// negative; a guard miss is reported instead of silently ignored.
async fn adjust_total_likes(
    txn: &DatabaseTransaction,
    video_id: i32,
    delta: i32,
) -> Result<(), LikeError> {
    let mut update = video::Entity::update_many()
        .col_expr(
            video::Column::TotalLikes,
            Expr::col(video::Column::TotalLikes).add(delta),
        )
        .filter(video::Column::Id.eq(video_id));

    if delta < 0 {
        update = update.filter(video::Column::TotalLikes.gte(-delta));
    }

    let result = update.exec(txn).await?;
    if result.rows_affected != 1 {
        warn!(video_id, delta, "Like counter guard rejected the update");
        return Err(LikeError::CounterMismatch(video_id));
    }
    Ok(())
}
