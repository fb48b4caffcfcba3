use std::sync::Arc;

use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};
use tokio::task::JoinSet;

use crate::common::{TestApp, routes};

mod toggle {
    use super::*;

    #[tokio::test]
    async fn first_toggle_likes_and_second_unlikes() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let fan = app.create_authenticated_user("bob").await;
        let id = app.create_video(&owner, "v", true).await;

        let liked = app.toggle_like(id, &fan).await;
        assert_eq!(liked.status, 201, "{}", liked.text);
        assert_eq!(liked.body["video_id"], id);
        assert!(liked.body["created_at"].is_string());
        assert_eq!(app.total_likes(id).await, 1);

        let unliked = app.toggle_like(id, &fan).await;
        assert_eq!(unliked.status, 204);
        assert!(unliked.text.is_empty());
        assert_eq!(app.total_likes(id).await, 0);
        assert_eq!(app.like_rows(id).await, 0);
    }

    #[tokio::test]
    async fn counter_is_visible_on_the_video() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let id = app.create_video(&owner, "v", true).await;

        for name in ["bob", "carol", "dave"] {
            let token = app.create_authenticated_user(name).await;
            assert_eq!(app.toggle_like(id, &token).await.status, 201);
        }

        let res = app.get_without_token(&routes::video(id)).await;
        assert_eq!(res.body["total_likes"], 3);
    }

    #[tokio::test]
    async fn owners_may_like_their_own_video() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let id = app.create_video(&owner, "v", true).await;

        assert_eq!(app.toggle_like(id, &owner).await.status, 201);
        assert_eq!(app.total_likes(id).await, 1);
    }
}

mod rejections {
    use super::*;

    #[tokio::test]
    async fn anonymous_callers_are_rejected() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let id = app.create_video(&owner, "v", true).await;

        let res = app
            .post_without_token(&routes::video_like(id), &serde_json::json!({}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert_eq!(app.total_likes(id).await, 0);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found() {
        let app = TestApp::spawn().await;
        let fan = app.create_authenticated_user("bob").await;

        let res = app.toggle_like(999_999, &fan).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unpublished_video_is_invalid_state_and_untouched() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let fan = app.create_authenticated_user("bob").await;
        let id = app.create_video(&owner, "draft", false).await;

        let res = app.toggle_like(id, &fan).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
        assert_eq!(app.total_likes(id).await, 0);
        assert_eq!(app.like_rows(id).await, 0);
    }

    #[tokio::test]
    async fn unpublishing_blocks_further_toggles() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let fan = app.create_authenticated_user("bob").await;
        let id = app.create_video(&owner, "v", true).await;
        assert_eq!(app.toggle_like(id, &fan).await.status, 201);

        let patch = app
            .patch_with_token(
                &routes::video(id),
                &serde_json::json!({"is_published": false}),
                &owner,
            )
            .await;
        assert_eq!(patch.status, 200);

        let res = app.toggle_like(id, &fan).await;
        assert_eq!(res.status, 400);
        // The existing like and its count survive.
        assert_eq!(app.total_likes(id).await, 1);
        assert_eq!(app.like_rows(id).await, 1);
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn concurrent_likes_from_distinct_users_all_count() {
        let app = Arc::new(TestApp::spawn().await);
        let owner = app.create_authenticated_user("owner").await;
        let id = app.create_video(&owner, "v", true).await;

        let mut tokens = Vec::new();
        for i in 0..10 {
            tokens.push(app.create_authenticated_user(&format!("fan_{i}")).await);
        }

        let mut set = JoinSet::new();
        for token in tokens {
            let app = Arc::clone(&app);
            set.spawn(async move { app.toggle_like(id, &token).await.status });
        }
        while let Some(status) = set.join_next().await {
            assert_eq!(status.expect("task panicked"), 201);
        }

        assert_eq!(app.total_likes(id).await, 10);
        assert_eq!(app.like_rows(id).await, 10);
    }

    #[tokio::test]
    async fn concurrent_toggles_by_one_user_keep_counter_and_rows_aligned() {
        let app = Arc::new(TestApp::spawn().await);
        let owner = app.create_authenticated_user("owner").await;
        let fan = Arc::new(app.create_authenticated_user("fan").await);
        let id = app.create_video(&owner, "v", true).await;

        let mut set = JoinSet::new();
        for _ in 0..7 {
            let app = Arc::clone(&app);
            let fan = Arc::clone(&fan);
            set.spawn(async move { app.toggle_like(id, &fan).await.status });
        }

        let mut created = 0;
        let mut removed = 0;
        while let Some(status) = set.join_next().await {
            match status.expect("task panicked") {
                201 => created += 1,
                204 => removed += 1,
                other => panic!("unexpected status {other}"),
            }
        }

        // Serialised on the row lock, so the toggles strictly alternate.
        assert_eq!(created - removed, 1);
        assert_eq!(app.total_likes(id).await, 1);
        assert_eq!(app.like_rows(id).await, 1);
    }

    #[tokio::test]
    async fn toggle_gives_up_when_the_video_row_stays_locked() {
        let app = TestApp::spawn_with(|config| config.likes.lock_timeout_ms = Some(200)).await;
        let owner = app.create_authenticated_user("owner").await;
        let fan = app.create_authenticated_user("fan").await;
        let id = app.create_video(&owner, "v", true).await;

        let holder = app.db.begin().await.expect("begin failed");
        holder
            .execute_raw(Statement::from_string(
                DbBackend::Postgres,
                format!("SELECT id FROM videos WHERE id = {id} FOR UPDATE"),
            ))
            .await
            .expect("row lock failed");

        let res = app.toggle_like(id, &fan).await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");

        holder.rollback().await.expect("rollback failed");
        assert_eq!(app.total_likes(id).await, 0);
        assert_eq!(app.like_rows(id).await, 0);

        let retry = app.toggle_like(id, &fan).await;
        assert_eq!(retry.status, 201, "{}", retry.text);
        assert_eq!(app.total_likes(id).await, 1);
    }
}
