//! Album and song listing endpoints.

use actix_web::{get, web, HttpResponse};

use crate::error::{AppError, AppResult};
use crate::models::AppState;

/// List the `.mp3` files of an album.
///
/// GET /api/songs/{folder}
#[get("/api/songs/{folder}")]
pub async fn list_songs(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let folder = path.into_inner();
    let files = data
        .library
        .list_audio_files(&folder)
        .await
        .map_err(AppError::folder_listing)?;

    Ok(HttpResponse::Ok().json(files))
}

/// List album folders, without the fallback album.
///
/// GET /api/albums
#[get("/api/albums")]
pub async fn list_albums(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let albums = data
        .library
        .list_albums()
        .await
        .map_err(AppError::AlbumsUnavailable)?;

    Ok(HttpResponse::Ok().json(albums))
}

/// Configure listing routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_songs).service(list_albums);
}
