//! Filesystem-backed song storage.
//!
//! Albums are directories directly under the songs root; songs are files
//! inside them. There is no index: every operation reads or mutates the
//! directory tree directly.

pub mod listing;
pub mod naming;
pub mod upload;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use upload::{StagedUpload, StoredSong, UploadFields};

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A directory could not be listed.
    #[error("Directory unavailable: {}", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The album directory or the provisional file could not be written.
    #[error("Failed to stage upload at {}", .path.display())]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staged file could not be moved to its final name.
    #[error("Failed to move {} to {}", .from.display(), .to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user supplied name is not usable as a path component.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),
}

/// Handle to the songs storage root.
///
/// Cheap to clone; clones share the per-album finalize locks.
#[derive(Debug, Clone)]
pub struct SongLibrary {
    root: PathBuf,
    album_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SongLibrary {
    /// Create a library rooted at `root`. The directory is not touched.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            album_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The songs storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of an album. The name must already be validated.
    fn album_dir(&self, album: &str) -> PathBuf {
        self.root.join(album)
    }

    /// Lock serializing the name check and rename for one album.
    ///
    /// The registry entry is removed once no task holds or waits for it.
    async fn lock_album(&self, album: &str) -> AlbumGuard<'_> {
        let lock = self
            .album_locks
            .lock()
            .entry(album.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;

        AlbumGuard {
            library: self,
            album: album.to_string(),
            guard: Some(guard),
        }
    }
}

/// Held while a finalize step owns an album.
struct AlbumGuard<'a> {
    library: &'a SongLibrary,
    album: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for AlbumGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.library.album_locks.lock();
        drop(self.guard.take());
        if locks
            .get(&self.album)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.album);
        }
    }
}
