use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapStaffConfig;
use crate::entity::{like, user, video, video_file};
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create
/// them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Per-owner aggregation over published videos.
    let owner_published = Index::create()
        .if_not_exists()
        .name("idx_videos_owner_published")
        .table(video::Entity)
        .col(video::Column::OwnerId)
        .col(video::Column::IsPublished)
        .to_owned();
    create_index_best_effort(db, "idx_videos_owner_published", &owner_published).await;

    // "Videos liked by user" lookups. The primary key leads with video_id.
    let likes_by_user = Index::create()
        .if_not_exists()
        .name("idx_likes_user")
        .table(like::Entity)
        .col(like::Column::UserId)
        .to_owned();
    create_index_best_effort(db, "idx_likes_user", &likes_by_user).await;

    // One rendition per quality. Duplicate detection depends on this one,
    // so failure is fatal.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_video_files_video_quality")
        .table(video_file::Entity)
        .col(video_file::Column::VideoId)
        .col(video_file::Column::Quality)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index uq_video_files_video_quality exists");

    Ok(())
}

async fn create_index_best_effort(db: &DatabaseConnection, name: &str, index: &IndexCreateStatement) {
    match db.execute_unprepared(&index.to_string(PostgresQueryBuilder)).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}

/// Create the configured staff account if no user holds that username yet.
///
/// An existing account is left untouched, including its password and staff
/// flag. A non-staff holder of the username is reported at `warn`.
pub async fn ensure_staff_account(
    db: &DatabaseConnection,
    staff: &BootstrapStaffConfig,
) -> Result<(), DbErr> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&staff.username))
        .one(db)
        .await?;
    if let Some(existing) = existing {
        if !existing.is_staff {
            tracing::warn!(
                user_id = existing.id,
                "Bootstrap staff username {} is held by a non-staff account; no staff account was seeded",
                staff.username
            );
        }
        return Ok(());
    }

    let password = hash::hash_password(&staff.password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {}", e)))?;

    let model = user::ActiveModel {
        username: Set(staff.username.clone()),
        email: Set(staff.email.clone()),
        password: Set(password),
        is_staff: Set(true),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!("Seeded staff account {}", staff.username),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    Ok(())
}
