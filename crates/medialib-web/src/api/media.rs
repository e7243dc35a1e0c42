use axum::extract::{Multipart, Query, State};
use axum::Json;
use medialib_core::fs::path;
use medialib_core::{MediaFileResult, UploadedFile};

use crate::auth::middleware::AuthUser;
use crate::dto::{
    CreateFolderRequest, DeleteManyRequest, MediaIndexResponse, MoveManyRequest,
    MoveMediaRequest, PathQuery, PathRequest, StoreEntryDto, SuccessResponse, UploadResponse,
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn index(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MediaIndexResponse>, AppError> {
    state.media.index(&user.principal()).await?;
    Ok(Json(MediaIndexResponse {
        public_url: state.config.storage.public_url.clone(),
        max_upload_size_mb: state.config.storage.max_upload_size_mb,
    }))
}

pub async fn list_folders(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<StoreEntryDto>>, AppError> {
    let folders = state
        .media
        .list_folders(&user.principal(), query.path())
        .await?;
    Ok(Json(folders.iter().map(StoreEntryDto::from).collect()))
}

pub async fn list_files(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<MediaFileResult>>, AppError> {
    let files = state
        .media
        .list_files(&user.principal(), query.path())
        .await?;
    Ok(Json(files))
}

pub async fn get_file(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<MediaFileResult>, AppError> {
    let file = state.media.get_file(&user.principal(), query.path()).await?;
    Ok(Json(file))
}

/// Accepts a multipart body; every part carrying a file name is one upload.
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let principal = user.principal();

    // Reject before buffering the body
    let folder = path::normalize(query.path());
    state.media.authorize(&principal, &[&folder]).await?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
        files.push(UploadedFile::new(name, content.to_vec()));
    }

    tracing::info!(
        user = principal.name(),
        folder = %folder,
        count = files.len(),
        "upload received"
    );

    let outcomes = state.media.upload(&principal, &folder, files).await?;
    Ok(Json(UploadResponse { files: outcomes }))
}

pub async fn create_folder(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateFolderRequest>,
) -> Result<Json<StoreEntryDto>, AppError> {
    let folder = state
        .media
        .create_folder(&user.principal(), &body.path, &body.name)
        .await?;
    Ok(Json(StoreEntryDto::from(&folder)))
}

pub async fn delete_folder(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.media.delete_folder(&user.principal(), &body.path).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_file(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.media.delete_file(&user.principal(), &body.path).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn move_file(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<MoveMediaRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .media
        .move_file(&user.principal(), &body.old_path, &body.new_path)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_many(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<DeleteManyRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .media
        .delete_many(&user.principal(), body.paths.as_deref())
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn move_many(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<MoveManyRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .media
        .move_many(
            &user.principal(),
            body.media_names.as_deref(),
            &body.source_folder,
            &body.target_folder,
        )
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use medialib_core::UploadedFile;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::jwt;
    use crate::config::{ServerConfig, StorageBackend};
    use crate::state::AppState;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const BOUNDARY: &str = "medialib-test-boundary";

    fn dev_state() -> AppState {
        let mut config = ServerConfig::default();
        config.storage.backend = StorageBackend::Memory;
        AppState::new(config)
    }

    fn secured_state() -> AppState {
        let config = ServerConfig::from_toml(&format!(
            r#"
            [storage]
            backend = "memory"

            [auth]
            jwt_secret = "{SECRET}"

            [[users]]
            username = "admin"
            password_hash = "unused"

            [[users]]
            username = "editor"
            password_hash = "unused"
            folders = ["photos"]

            [[users]]
            username = "guest"
            password_hash = "unused"
            manage_media = false
            "#
        ))
        .unwrap();
        AppState::new(config)
    }

    fn app(state: AppState) -> Router {
        let max = state.config.storage.max_upload_bytes();
        Router::new()
            .nest("/api", crate::api::media_router(max).merge(crate::api::auth_router()))
            .with_state(state)
    }

    fn bearer(user: &str) -> String {
        let (token, _) = jwt::create_token(SECRET, 1, user).unwrap();
        format!("Bearer {token}")
    }

    async fn seed(state: &AppState, folder: &str, name: &str, content: &[u8]) {
        let principal = medialib_core::Principal::new("admin");
        let outcomes = state
            .media
            .upload(
                &principal,
                folder,
                vec![UploadedFile::new(name, content.to_vec())],
            )
            .await
            .unwrap();
        assert!(outcomes[0].is_uploaded());
    }

    async fn seed_folder(state: &AppState, parent: &str, name: &str) {
        let principal = medialib_core::Principal::new("admin");
        state
            .media
            .create_folder(&principal, parent, name)
            .await
            .unwrap();
    }

    fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn multipart(uri: &str, auth: Option<&str>, files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n\
                 {content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn index_in_dev_mode() {
        let response = app(dev_state()).oneshot(get("/api/media", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["publicUrl"], "/media");
        assert_eq!(body["maxUploadSizeMb"], 100);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let response = app(secured_state())
            .oneshot(get("/api/media/items", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_without_media_permission_is_unauthorized() {
        let auth = bearer("guest");
        let response = app(secured_state())
            .oneshot(get("/api/media", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn list_files_returns_presentation_records() {
        let state = dev_state();
        seed(&state, "", "cat.jpg", b"meow").await;

        let response = app(state).oneshot(get("/api/media/items", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            json!([{
                "name": "cat.jpg",
                "size": 4,
                "folder": "",
                "url": "/media/cat.jpg",
                "mediaPath": "cat.jpg",
                "mime": "image/jpeg"
            }])
        );
    }

    #[tokio::test]
    async fn list_folders_filters_by_grant() {
        let state = secured_state();
        seed_folder(&state, "", "photos").await;
        seed_folder(&state, "", "private").await;

        let auth = bearer("editor");
        let response = app(state)
            .oneshot(get("/api/media/folders", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["photos"]);
    }

    #[tokio::test]
    async fn list_files_outside_grant_is_unauthorized() {
        let state = secured_state();
        seed_folder(&state, "", "private").await;

        let auth = bearer("editor");
        let response = app(state)
            .oneshot(get("/api/media/items?path=private", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_missing_file_is_not_found() {
        let response = app(dev_state())
            .oneshot(get("/api/media/item?path=nope.png", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_reports_each_file() {
        let state = dev_state();
        seed_folder(&state, "", "photos").await;

        let response = app(state.clone())
            .oneshot(multipart(
                "/api/media/upload?path=photos",
                None,
                &[("a.txt", "hello"), ("b.png", "png")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["mediaPath"], "photos/a.txt");
        assert_eq!(files[0]["size"], 5);
        assert_eq!(files[1]["mime"], "image/png");

        let principal = medialib_core::Principal::new("admin");
        assert!(state.media.get_file(&principal, "photos/a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn upload_without_file_parts_is_empty() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             no files here\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/media/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app(dev_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "files": [] }));
    }

    #[tokio::test]
    async fn upload_outside_grant_is_unauthorized() {
        let state = secured_state();
        seed_folder(&state, "", "private").await;

        let auth = bearer("editor");
        let response = app(state.clone())
            .oneshot(multipart(
                "/api/media/upload?path=private",
                Some(&auth),
                &[("a.txt", "hello")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let principal = medialib_core::Principal::new("admin");
        let files = state.media.list_files(&principal, "private").await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn create_existing_folder_is_forbidden() {
        let state = dev_state();
        seed_folder(&state, "", "photos").await;

        let response = app(state)
            .oneshot(post_json(
                "/api/media/folders/create",
                None,
                json!({ "path": "", "name": "photos" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Cannot create folder because a folder already exists with the same name"
        );
    }

    #[tokio::test]
    async fn create_folder_returns_entry() {
        let response = app(dev_state())
            .oneshot(post_json(
                "/api/media/folders/create",
                None,
                json!({ "path": "", "name": "albums" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["path"], "albums");
        assert_eq!(body["isDirectory"], true);
    }

    #[tokio::test]
    async fn delete_root_folder_is_forbidden() {
        let response = app(dev_state())
            .oneshot(post_json(
                "/api/media/folders/delete",
                None,
                json!({ "path": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Cannot delete root media folder");
    }

    #[tokio::test]
    async fn move_file_then_delete_it() {
        let state = dev_state();
        seed_folder(&state, "", "photos").await;
        seed(&state, "", "cat.jpg", b"meow").await;

        let response = app(state.clone())
            .oneshot(post_json(
                "/api/media/items/move",
                None,
                json!({ "oldPath": "cat.jpg", "newPath": "photos/cat.jpg" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["success"], true);

        let response = app(state.clone())
            .oneshot(post_json(
                "/api/media/items/delete",
                None,
                json!({ "path": "photos/cat.jpg" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let principal = medialib_core::Principal::new("admin");
        assert!(state.media.get_file(&principal, "photos/cat.jpg").await.is_err());
    }

    #[tokio::test]
    async fn delete_many_reports_failed_paths() {
        let state = dev_state();
        seed(&state, "", "a.txt", b"a").await;

        let response = app(state)
            .oneshot(post_json(
                "/api/media/items/delete-many",
                None,
                json!({ "paths": ["a.txt", "ghost.txt"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["failed"], json!(["ghost.txt"]));
    }

    #[tokio::test]
    async fn delete_many_without_paths_is_not_found() {
        let response = app(dev_state())
            .oneshot(post_json("/api/media/items/delete-many", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn move_many_from_root_sentinel() {
        let state = dev_state();
        seed_folder(&state, "", "photos").await;
        seed(&state, "", "x.jpg", b"x").await;

        let response = app(state.clone())
            .oneshot(post_json(
                "/api/media/items/move-many",
                None,
                json!({
                    "mediaNames": ["x.jpg"],
                    "sourceFolder": "root",
                    "targetFolder": "photos"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let principal = medialib_core::Principal::new("admin");
        assert!(state.media.get_file(&principal, "photos/x.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn move_many_rejects_names_leaving_the_folder() {
        let state = secured_state();
        seed_folder(&state, "", "photos").await;
        seed_folder(&state, "photos", "sub").await;
        seed(&state, "private", "x.jpg", b"secret").await;

        let auth = bearer("editor");
        let response = app(state.clone())
            .oneshot(post_json(
                "/api/media/items/move-many",
                Some(&auth),
                json!({
                    "mediaNames": ["../private/x.jpg"],
                    "sourceFolder": "photos",
                    "targetFolder": "photos/sub"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["failed"], json!(["photos/../private/x.jpg"]));

        let principal = medialib_core::Principal::new("admin");
        assert!(state.media.get_file(&principal, "private/x.jpg").await.is_ok());
        assert!(state
            .media
            .get_file(&principal, "photos/private/x.jpg")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let state = secured_state();
        let auth = bearer("admin");

        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state)
            .oneshot(get("/api/media", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_with_unknown_user_fails() {
        let response = app(secured_state())
            .oneshot(post_json(
                "/api/auth/login",
                None,
                json!({ "username": "mallory", "password": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_in_dev_mode_issues_token() {
        let response = app(dev_state())
            .oneshot(post_json("/api/auth/login", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }
}
