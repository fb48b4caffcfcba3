use serde_json::json;

use crate::common::{TestApp, routes};

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn new_video_starts_unpublished_with_zero_likes() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(routes::VIDEOS, &json!({"name": "Видео 1"}), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Видео 1");
        assert_eq!(res.body["owner"], "alice");
        assert_eq!(res.body["is_published"], false);
        assert_eq!(res.body["total_likes"], 0);
        assert_eq!(res.body["video_files"], json!([]));
    }

    #[tokio::test]
    async fn creating_a_video_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::VIDEOS, &json!({"name": "x"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn owner_can_publish_and_rename() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;
        let id = app.create_video(&token, "draft", false).await;

        let res = app
            .patch_with_token(
                &routes::video(id),
                &json!({"name": "final", "is_published": true}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "final");
        assert_eq!(res.body["is_published"], true);
    }

    #[tokio::test]
    async fn only_the_owner_may_modify_a_video() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let other = app.create_authenticated_user("bob").await;
        let id = app.create_video(&owner, "v", true).await;

        let patch = app
            .patch_with_token(&routes::video(id), &json!({"name": "mine"}), &other)
            .await;
        assert_eq!(patch.status, 403);
        assert_eq!(patch.body["code"], "PERMISSION_DENIED");

        let delete = app.delete_with_token(&routes::video(id), &other).await;
        assert_eq!(delete.status, 403);
    }

    #[tokio::test]
    async fn deleting_a_video_removes_its_likes() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let fan = app.create_authenticated_user("bob").await;
        let id = app.create_video(&owner, "v", true).await;
        assert_eq!(app.toggle_like(id, &fan).await.status, 201);

        let res = app.delete_with_token(&routes::video(id), &owner).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.like_rows(id).await, 0);
        assert_eq!(app.get_with_token(&routes::video(id), &owner).await.status, 404);
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token("/api/v1/videos/abc").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn unpublished_videos_are_hidden_from_others() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let other = app.create_authenticated_user("bob").await;
        let staff = app.create_staff_user("admin").await;
        let id = app.create_video(&owner, "draft", false).await;

        assert_eq!(app.get_without_token(&routes::video(id)).await.status, 404);
        assert_eq!(app.get_with_token(&routes::video(id), &other).await.status, 404);
        assert_eq!(app.get_with_token(&routes::video(id), &owner).await.status, 200);
        assert_eq!(app.get_with_token(&routes::video(id), &staff).await.status, 200);
    }

    #[tokio::test]
    async fn list_filters_by_viewer_and_paginates() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let other = app.create_authenticated_user("bob").await;
        for i in 0..3 {
            app.create_video(&owner, &format!("pub {i}"), true).await;
        }
        app.create_video(&owner, "draft", false).await;

        let anon = app.get_without_token(routes::VIDEOS).await;
        assert_eq!(anon.status, 200);
        assert_eq!(anon.body["pagination"]["total"], 3);

        let mine = app.get_with_token(routes::VIDEOS, &owner).await;
        assert_eq!(mine.body["pagination"]["total"], 4);

        let theirs = app.get_with_token(routes::VIDEOS, &other).await;
        assert_eq!(theirs.body["pagination"]["total"], 3);

        let page = app
            .get_without_token(&format!("{}?page=2&per_page=2", routes::VIDEOS))
            .await;
        assert_eq!(page.body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(page.body["pagination"]["total_pages"], 2);
        // Newest first, so the last page holds the oldest video.
        assert_eq!(page.body["data"][0]["name"], "pub 0");
    }

    #[tokio::test]
    async fn huge_page_numbers_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&format!("{}?page={}", routes::VIDEOS, u64::MAX))
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let last_allowed = app
            .get_without_token(&format!("{}?page=1000000&per_page=100", routes::VIDEOS))
            .await;
        assert_eq!(last_allowed.status, 200, "{}", last_allowed.text);
        assert_eq!(last_allowed.body["data"], json!([]));
    }

    #[tokio::test]
    async fn published_ids_are_staff_only() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice").await;
        let staff = app.create_staff_user("admin").await;
        let a = app.create_video(&owner, "a", true).await;
        app.create_video(&owner, "b", false).await;
        let c = app.create_video(&owner, "c", true).await;

        let denied = app.get_with_token(routes::VIDEO_IDS, &owner).await;
        assert_eq!(denied.status, 403);

        let res = app.get_with_token(routes::VIDEO_IDS, &staff).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([{"id": a}, {"id": c}]));
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn owner_attaches_one_file_per_quality() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;
        let id = app.create_video(&token, "v", true).await;

        let res = app
            .post_with_token(
                &routes::video_files(id),
                &json!({"file": "videos/v_HD.mp4", "quality": "HD"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["quality"], "HD");
        assert_eq!(res.body["quality_display"], "HD (720p)");

        let dup = app
            .post_with_token(
                &routes::video_files(id),
                &json!({"file": "videos/other.mp4", "quality": "HD"}),
                &token,
            )
            .await;
        assert_eq!(dup.status, 409);
        assert_eq!(dup.body["code"], "CONFLICT");

        let video = app.get_without_token(&routes::video(id)).await;
        assert_eq!(video.body["video_files"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn unknown_quality_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;
        let id = app.create_video(&token, "v", true).await;

        let res = app
            .post_with_token(
                &routes::video_files(id),
                &json!({"file": "videos/v.mp4", "quality": "8K"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
