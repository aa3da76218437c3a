//! Audio file recognition
//!
//! Two separate tables: the narrow set of extensions that show up in scene
//! listings, and the wider content-type map used when streaming files.

use std::path::Path;

/// Extensions that make a file appear as a track in scene listings
///
/// Matched as exact, case-sensitive suffixes.
pub const LISTED_EXTENSIONS: [&str; 3] = [".mp3", ".wav", ".m4a"];

/// Fallback for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Whether `file_name` is listed as a track
pub fn is_listed_track(file_name: &str) -> bool {
    LISTED_EXTENSIONS
        .iter()
        .any(|ext| file_name.ends_with(ext))
}

/// Content type served for a music file, by extension (case-insensitive)
///
/// # Examples
///
/// ```
/// use cuedeck_common::media::content_type_for;
/// use std::path::Path;
///
/// assert_eq!(content_type_for(Path::new("cue.MP3")), "audio/mpeg");
/// assert_eq!(content_type_for(Path::new("notes.txt")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "m4b" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        "wma" => "audio/x-ms-wma",
        "aiff" | "aif" => "audio/x-aiff",
        "mid" | "midi" => "audio/midi",
        _ => OCTET_STREAM,
    }
}
