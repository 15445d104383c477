//! Upload endpoint.

use actix_multipart::{Field, Multipart};
use actix_web::{post, web, HttpResponse};
use futures::TryStreamExt;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, UploadResponse};
use crate::storage::naming::original_file_name;
use crate::storage::{SongLibrary, StagedUpload, UploadFields};

/// Multipart field carrying the audio payload.
const FILE_FIELD: &str = "mp3File";

/// Upper bound for a single text field.
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// Everything read from an upload form.
#[derive(Default)]
struct UploadForm {
    fields: UploadFields,
    staged: Option<StagedUpload>,
}

/// Read a text field into a string.
async fn read_text(field: &mut Field) -> AppResult<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest(format!(
                "Field exceeds {} bytes",
                MAX_TEXT_FIELD_BYTES
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest("Field is not valid UTF-8".to_string()))
}

/// Consume a field without keeping its content.
async fn drain(field: &mut Field) -> AppResult<()> {
    while field.try_next().await?.is_some() {}
    Ok(())
}

/// Walk the multipart stream, staging the first file part as it arrives.
async fn read_parts(
    library: &SongLibrary,
    payload: &mut Multipart,
    form: &mut UploadForm,
) -> AppResult<()> {
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|f| original_file_name(f).to_string());

        match (name.as_str(), filename) {
            (FILE_FIELD, Some(filename)) if form.staged.is_none() => {
                let staged = form
                    .staged
                    .insert(library.stage(form.fields.album(), &filename).await?);
                while let Some(chunk) = field.try_next().await? {
                    staged.write_chunk(&chunk).await?;
                }
            }
            (FILE_FIELD, Some(filename)) => {
                tracing::warn!(filename = %filename, "Ignoring additional file part");
                drain(&mut field).await?;
            }
            ("album", _) => form.fields.album = Some(read_text(&mut field).await?),
            ("songName", _) => form.fields.song_name = Some(read_text(&mut field).await?),
            ("singerName", _) => form.fields.singer_name = Some(read_text(&mut field).await?),
            _ => drain(&mut field).await?,
        }
    }
    Ok(())
}

/// Read the whole form. A staged file is removed if the form turns out broken.
async fn read_form(library: &SongLibrary, mut payload: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();
    if let Err(e) = read_parts(library, &mut payload, &mut form).await {
        if let Some(staged) = form.staged.take() {
            tracing::debug!(path = %staged.path().display(), "Removing partial upload");
            staged.discard().await;
        }
        return Err(e);
    }
    Ok(form)
}

/// Upload a song and store it under a name derived from the form fields.
///
/// POST /api/upload
///
/// Multipart fields:
/// - `mp3File`: the audio file (required)
/// - `album`: target album (default: `default`)
/// - `songName`: song title (default: `UnknownSong`)
/// - `singerName`: performer (default: `UnknownSinger`)
///
/// Existing files are never overwritten; a `-1`, `-2`, ... suffix is added
/// instead, and the name actually used is returned.
#[post("/api/upload")]
pub async fn upload_song(
    data: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(&data.library, payload).await?;
    let staged = form.staged.ok_or(AppError::MissingPayload)?;

    let stored = data.library.finalize(staged, &form.fields).await?;

    Ok(HttpResponse::Ok().json(UploadResponse::from(stored)))
}

/// Configure upload routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_song);
}
