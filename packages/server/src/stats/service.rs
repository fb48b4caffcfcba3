use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, Statement};
use tracing::warn;

use crate::viewer::Viewer;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("staff privilege required")]
    Forbidden,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Total likes attributed to one video owner.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct OwnerLikes {
    pub owner_id: i32,
    pub username: String,
    pub likes_sum: i64,
}

/// A video whose cached counter disagrees with its like rows.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CounterDrift {
    pub video_id: i32,
    pub total_likes: i32,
    pub like_rows: i64,
}

/// An owner for which the two aggregation paths disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerMismatch {
    pub owner_id: i32,
    pub username: String,
    pub via_subquery: Option<i64>,
    pub via_group_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub owners_checked: usize,
    pub mismatched_owners: Vec<OwnerMismatch>,
    pub drifted_videos: Vec<CounterDrift>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatched_owners.is_empty() && self.drifted_videos.is_empty()
    }
}

/// Sums each user's cached `total_likes` over their published videos with a
/// correlated scalar subquery. Users without published videos report 0.
const LIKES_BY_OWNER_SUBQUERY: &str = r#"
SELECT u.id AS owner_id,
       u.username AS username,
       COALESCE((
           SELECT SUM(v.total_likes)
           FROM videos v
           WHERE v.owner_id = u.id AND v.is_published
       ), 0)::BIGINT AS likes_sum
FROM users u
ORDER BY likes_sum DESC, u.username ASC
"#;

/// Counts like rows on each user's published videos with joins and a single
/// GROUP BY. Reads the `likes` table, never the cached counter.
const LIKES_BY_OWNER_GROUP_BY: &str = r#"
SELECT u.id AS owner_id,
       u.username AS username,
       COUNT(l.user_id)::BIGINT AS likes_sum
FROM users u
LEFT JOIN videos v ON v.owner_id = u.id AND v.is_published
LEFT JOIN likes l ON l.video_id = v.id
GROUP BY u.id, u.username
ORDER BY likes_sum DESC, u.username ASC
"#;

const COUNTER_DRIFT: &str = r#"
SELECT v.id AS video_id,
       v.total_likes AS total_likes,
       COUNT(l.user_id)::BIGINT AS like_rows
FROM videos v
LEFT JOIN likes l ON l.video_id = v.id
GROUP BY v.id, v.total_likes
HAVING v.total_likes <> COUNT(l.user_id)
ORDER BY v.id
"#;

/// Read-only reporting over likes. Every query requires a staff viewer.
pub struct StatsService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StatsService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn likes_by_owner_via_correlated_aggregate(
        &self,
        viewer: Viewer,
    ) -> Result<Vec<OwnerLikes>, StatsError> {
        require_staff(viewer)?;
        self.fetch_owner_likes(LIKES_BY_OWNER_SUBQUERY).await
    }

    pub async fn likes_by_owner_via_group_by(
        &self,
        viewer: Viewer,
    ) -> Result<Vec<OwnerLikes>, StatsError> {
        require_staff(viewer)?;
        self.fetch_owner_likes(LIKES_BY_OWNER_GROUP_BY).await
    }

    /// Diff the two aggregation paths and audit every video's counter.
    pub async fn consistency_report(&self, viewer: Viewer) -> Result<ConsistencyReport, StatsError> {
        let via_subquery = self.likes_by_owner_via_correlated_aggregate(viewer).await?;
        let via_group_by = self.likes_by_owner_via_group_by(viewer).await?;

        let drifted_videos = CounterDrift::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            COUNTER_DRIFT,
        ))
        .all(self.conn)
        .await?;

        let report = ConsistencyReport {
            owners_checked: via_subquery.len().max(via_group_by.len()),
            mismatched_owners: diff_owner_likes(&via_subquery, &via_group_by),
            drifted_videos,
        };

        if !report.is_consistent() {
            warn!(
                mismatched_owners = report.mismatched_owners.len(),
                drifted_videos = report.drifted_videos.len(),
                "Like counters diverged from like rows"
            );
        }

        Ok(report)
    }

    async fn fetch_owner_likes(&self, sql: &str) -> Result<Vec<OwnerLikes>, StatsError> {
        let rows = OwnerLikes::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
            .all(self.conn)
            .await?;
        Ok(rows)
    }
}

fn require_staff(viewer: Viewer) -> Result<(), StatsError> {
    if viewer.is_staff() {
        Ok(())
    } else {
        Err(StatsError::Forbidden)
    }
}

/// Owners whose sums differ between the two result sets, ignoring order.
pub fn diff_owner_likes(left: &[OwnerLikes], right: &[OwnerLikes]) -> Vec<OwnerMismatch> {
    let mut merged: BTreeMap<i32, OwnerMismatch> = BTreeMap::new();

    for row in left {
        merged.entry(row.owner_id).or_insert_with(|| OwnerMismatch {
            owner_id: row.owner_id,
            username: row.username.clone(),
            via_subquery: None,
            via_group_by: None,
        })
        .via_subquery = Some(row.likes_sum);
    }
    for row in right {
        merged.entry(row.owner_id).or_insert_with(|| OwnerMismatch {
            owner_id: row.owner_id,
            username: row.username.clone(),
            via_subquery: None,
            via_group_by: None,
        })
        .via_group_by = Some(row.likes_sum);
    }

    merged
        .into_values()
        .filter(|m| m.via_subquery != m.via_group_by)
        .collect()
}
