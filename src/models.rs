use serde::Serialize;

use crate::storage::{SongLibrary, StoredSong};

#[derive(Clone)]
pub struct AppState {
    pub library: SongLibrary,
}

impl AppState {
    pub fn new(library: SongLibrary) -> Self {
        Self { library }
    }
}

/// Body of a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub file: String,
    pub album: String,
}

impl From<StoredSong> for UploadResponse {
    fn from(song: StoredSong) -> Self {
        Self {
            message: "File uploaded and renamed successfully",
            file: song.file,
            album: song.album,
        }
    }
}
