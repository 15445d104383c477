//! Two-phase upload ingestion.
//!
//! A multipart upload may deliver the audio payload before the form fields
//! that name it. The payload is therefore written to a provisional file
//! first ([`SongLibrary::stage`]) and moved to its final, collision-free
//! name once every field is known ([`SongLibrary::finalize`]).

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::naming::{
    base_name, candidate_name, extension_of, original_file_name, validate_component,
    DEFAULT_ALBUM, DEFAULT_SINGER_NAME, DEFAULT_SONG_NAME,
};
use super::{SongLibrary, StorageError};

/// Text fields submitted alongside an upload.
///
/// Values are kept as received; trimming and defaults are applied by the
/// accessors.
#[derive(Debug, Clone, Default)]
pub struct UploadFields {
    pub album: Option<String>,
    pub song_name: Option<String>,
    pub singer_name: Option<String>,
}

impl UploadFields {
    /// Target album, `"default"` when missing or blank.
    pub fn album(&self) -> &str {
        resolve(&self.album, DEFAULT_ALBUM)
    }

    /// Song title, `"UnknownSong"` when missing or blank.
    pub fn song_name(&self) -> &str {
        resolve(&self.song_name, DEFAULT_SONG_NAME)
    }

    /// Performer, `"UnknownSinger"` when missing or blank.
    pub fn singer_name(&self) -> &str {
        resolve(&self.singer_name, DEFAULT_SINGER_NAME)
    }
}

fn resolve<'a>(value: &'a Option<String>, default: &'static str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Where a finalized upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSong {
    /// Album the song was stored in.
    pub album: String,
    /// Final filename, including any disambiguation suffix.
    pub file: String,
}

/// A payload written under a provisional name, waiting to be finalized.
#[derive(Debug)]
pub struct StagedUpload {
    album: String,
    path: PathBuf,
    original_name: String,
    file: Option<File>,
    bytes_written: u64,
}

impl StagedUpload {
    /// Path of the provisional file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a chunk of the payload.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        let Some(file) = self.file.as_mut() else {
            return Err(StorageError::StagingFailed {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "staged file is already closed",
                ),
            });
        };

        file.write_all(chunk)
            .await
            .map_err(|source| StorageError::StagingFailed {
                path: self.path.clone(),
                source,
            })?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the provisional file.
    async fn close(&mut self) -> Result<(), StorageError> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|source| StorageError::StagingFailed {
                    path: self.path.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Remove the provisional file. Failures are logged, not returned.
    pub async fn discard(mut self) {
        drop(self.file.take());
        match fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Discarded staged upload"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged upload"
            ),
        }
    }
}

/// Hidden, never `.mp3`-suffixed name for a payload still being received.
fn provisional_name(original_name: &str) -> String {
    format!(
        ".{}-{}-{}.part",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        original_name
    )
}

fn validated_names(fields: &UploadFields) -> Result<(&str, &str, &str), StorageError> {
    Ok((
        validate_component(fields.album())?,
        validate_component(fields.song_name())?,
        validate_component(fields.singer_name())?,
    ))
}

/// First candidate filename not present in `dir`.
async fn next_free_name(dir: &Path, base: &str, extension: &str) -> std::io::Result<String> {
    let mut attempt = 0;
    loop {
        let candidate = candidate_name(base, extension, attempt);
        if !fs::try_exists(dir.join(&candidate)).await? {
            return Ok(candidate);
        }
        attempt += 1;
    }
}

impl SongLibrary {
    /// Create the album directory if needed and open a provisional file in it.
    pub async fn stage(
        &self,
        album: &str,
        original_name: &str,
    ) -> Result<StagedUpload, StorageError> {
        let album = validate_component(album)?;
        let dir = self.album_dir(album);

        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::StagingFailed {
                path: dir.clone(),
                source,
            })?;

        let original_name = original_file_name(original_name).to_string();
        let path = dir.join(provisional_name(&original_name));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| StorageError::StagingFailed {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(
            album = %album,
            original = %original_name,
            path = %path.display(),
            "Staging upload"
        );

        Ok(StagedUpload {
            album: album.to_string(),
            path,
            original_name,
            file: Some(file),
            bytes_written: 0,
        })
    }

    /// Move a staged upload to `"<song> - <singer>[-n]<ext>"` in its album.
    ///
    /// Invalid names remove the staged file. A failed move leaves it in place.
    pub async fn finalize(
        &self,
        mut staged: StagedUpload,
        fields: &UploadFields,
    ) -> Result<StoredSong, StorageError> {
        let (album, song, singer) = match validated_names(fields) {
            Ok(names) => names,
            Err(e) => {
                staged.discard().await;
                return Err(e);
            }
        };

        if let Err(e) = staged.close().await {
            staged.discard().await;
            return Err(e);
        }

        let dir = self.album_dir(album);
        if staged.album != album {
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| StorageError::RenameFailed {
                    from: staged.path.clone(),
                    to: dir.clone(),
                    source,
                })?;
        }

        let base = base_name(song, singer);
        let extension = extension_of(&staged.original_name);

        let _guard = self.lock_album(album).await;

        let file = next_free_name(&dir, &base, extension)
            .await
            .map_err(|source| StorageError::RenameFailed {
                from: staged.path.clone(),
                to: dir.join(candidate_name(&base, extension, 0)),
                source,
            })?;
        let target = dir.join(&file);

        fs::rename(&staged.path, &target)
            .await
            .map_err(|source| StorageError::RenameFailed {
                from: staged.path.clone(),
                to: target.clone(),
                source,
            })?;

        tracing::info!(
            album = %album,
            file = %file,
            bytes = staged.bytes_written,
            "Stored upload"
        );

        Ok(StoredSong {
            album: album.to_string(),
            file,
        })
    }
}
