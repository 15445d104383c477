//! Filename rules for stored songs.

use super::StorageError;

/// Extension recognized as an audio file in album listings.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Reserved fallback album, hidden from album listings.
pub const DEFAULT_ALBUM: &str = "default";

/// Song title used when the upload carries none.
pub const DEFAULT_SONG_NAME: &str = "UnknownSong";

/// Performer used when the upload carries none.
pub const DEFAULT_SINGER_NAME: &str = "UnknownSinger";

/// Validate a user supplied name before it becomes part of a path.
///
/// Rejects empty names, path separators, NUL bytes and the `.`/`..`
/// components. Anything else (spaces, dots inside a name, unicode) is
/// allowed through unchanged.
pub fn validate_component(name: &str) -> Result<&str, StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        tracing::warn!(name = %name, "Path traversal attempt blocked");
        return Err(StorageError::InvalidName(name.to_string()));
    }

    Ok(name)
}

/// Reduce a client supplied upload filename to its last path segment.
pub fn original_file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Extension of a filename including the leading dot.
///
/// Everything from the last dot, so `archive.tar.gz` yields `.gz` and
/// `..mp3` yields `.mp3`. A dot at index 0 marks a hidden file rather than
/// an extension (`.profile` has none), and `..` has none either. Case is
/// preserved.
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        None | Some(0) => "",
        Some(_) if file_name == ".." => "",
        Some(idx) => &file_name[idx..],
    }
}

/// Base of a stored song's filename.
pub fn base_name(song_name: &str, singer_name: &str) -> String {
    format!("{} - {}", song_name, singer_name)
}

/// Filename for the given attempt; attempt 0 has no disambiguation suffix.
pub fn candidate_name(base: &str, extension: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}{}", base, extension)
    } else {
        format!("{}-{}{}", base, attempt, extension)
    }
}

/// Whether a directory entry should be reported as an audio file.
pub fn is_audio_file_name(name: &str) -> bool {
    name.ends_with(AUDIO_EXTENSION)
}
