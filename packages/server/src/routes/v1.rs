use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/videos", video_routes())
        .merge(statistics_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::refresh))
        .routes(routes!(handlers::auth::me))
}

fn video_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::video::list_videos,
            handlers::video::create_video
        ))
        .routes(routes!(handlers::video::list_published_ids))
        .routes(routes!(
            handlers::video::get_video,
            handlers::video::update_video,
            handlers::video::delete_video
        ))
        .routes(routes!(
            handlers::video::list_video_files,
            handlers::video::create_video_file
        ))
        .routes(routes!(handlers::like::toggle_like))
}

fn statistics_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::stats::likes_by_owner_subquery))
        .routes(routes!(handlers::stats::likes_by_owner_group_by))
        .routes(routes!(handlers::stats::likes_consistency))
}
