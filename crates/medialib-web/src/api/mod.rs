mod auth_handlers;
pub mod media;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/logout", post(auth_handlers::logout))
}

/// Media admin routes. Every handler authenticates the caller and leaves
/// authorization to [`medialib_core::MediaLibrary`].
pub fn media_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/media", get(media::index))
        .route("/media/folders", get(media::list_folders))
        .route("/media/folders/create", post(media::create_folder))
        .route("/media/folders/delete", post(media::delete_folder))
        .route("/media/items", get(media::list_files))
        .route("/media/item", get(media::get_file))
        .route("/media/items/delete", post(media::delete_file))
        .route("/media/items/move", post(media::move_file))
        .route("/media/items/delete-many", post(media::delete_many))
        .route("/media/items/move-many", post(media::move_many))
        .route(
            "/media/upload",
            post(media::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
