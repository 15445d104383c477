//! Read-only album and song listings.

use std::path::Path;
use tokio::fs;

use super::naming::{is_audio_file_name, validate_component, DEFAULT_ALBUM};
use super::{SongLibrary, StorageError};

fn unavailable(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::DirectoryUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

impl SongLibrary {
    /// List the audio files of an album, in directory order.
    ///
    /// An album that does not exist yet is an error, not an empty list.
    pub async fn list_audio_files(&self, album: &str) -> Result<Vec<String>, StorageError> {
        let album = validate_component(album)?;
        let dir = self.album_dir(album);

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| unavailable(&dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| unavailable(&dir, e))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_audio_file_name(&name) {
                files.push(name);
            }
        }

        tracing::debug!(album = %album, count = files.len(), "Listed album");
        Ok(files)
    }

    /// List album directories under the songs root, excluding the fallback album.
    pub async fn list_albums(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| unavailable(&self.root, e))?;

        let mut albums = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(&self.root, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| unavailable(&entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name != DEFAULT_ALBUM {
                albums.push(name);
            }
        }

        Ok(albums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn touch(path: &Path) {
        std::fs::write(path, b"data").unwrap();
    }

    fn as_set(names: Vec<String>) -> HashSet<String> {
        names.into_iter().collect()
    }

    #[actix_rt::test]
    async fn test_list_audio_files_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("Live");
        std::fs::create_dir(&album).unwrap();
        touch(&album.join("Encore - Band.mp3"));
        touch(&album.join("Opener - Band.mp3"));
        touch(&album.join("cover.jpg"));
        touch(&album.join("loud.MP3"));
        touch(&album.join(".1700000000000-abc-x.mp3.part"));

        let library = SongLibrary::new(dir.path());
        let files = library.list_audio_files("Live").await.unwrap();

        assert_eq!(
            as_set(files),
            HashSet::from([
                "Encore - Band.mp3".to_string(),
                "Opener - Band.mp3".to_string()
            ])
        );
    }

    #[actix_rt::test]
    async fn test_list_audio_files_empty_album() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Empty")).unwrap();

        let library = SongLibrary::new(dir.path());
        assert!(library.list_audio_files("Empty").await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_list_audio_files_missing_album() {
        let dir = tempfile::tempdir().unwrap();
        let library = SongLibrary::new(dir.path());

        let result = library.list_audio_files("Nowhere").await;
        assert!(matches!(
            result,
            Err(StorageError::DirectoryUnavailable { .. })
        ));
    }

    #[actix_rt::test]
    async fn test_list_audio_files_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("single.mp3"));
        let library = SongLibrary::new(dir.path());

        let result = library.list_audio_files("single.mp3").await;
        assert!(matches!(
            result,
            Err(StorageError::DirectoryUnavailable { .. })
        ));
    }

    #[actix_rt::test]
    async fn test_list_audio_files_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let library = SongLibrary::new(dir.path().join("songs"));

        let result = library.list_audio_files("..").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[actix_rt::test]
    async fn test_list_albums_excludes_default_and_files() {
        let dir = tempfile::tempdir().unwrap();
        for album in ["default", "Live", "Studio"] {
            std::fs::create_dir(dir.path().join(album)).unwrap();
        }
        touch(&dir.path().join("stray.mp3"));

        let library = SongLibrary::new(dir.path());
        let albums = library.list_albums().await.unwrap();

        assert_eq!(
            as_set(albums),
            HashSet::from(["Live".to_string(), "Studio".to_string()])
        );
    }

    #[actix_rt::test]
    async fn test_list_albums_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let library = SongLibrary::new(dir.path().join("missing"));

        assert!(matches!(
            library.list_albums().await,
            Err(StorageError::DirectoryUnavailable { .. })
        ));
    }
}
