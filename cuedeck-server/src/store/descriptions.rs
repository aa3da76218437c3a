//! Optional track description sheet
//!
//! A CSV with `Scene`, `Music` and `Description` columns kept next to the
//! music root. The raw file is served to the browser and also parsed into
//! a `"scene/file" -> description` map.

use cuedeck_common::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Description per `"<scene>/<file name>"`
pub type TrackDescriptions = BTreeMap<String, String>;

/// First candidate that exists as a file
pub fn find_descriptions_csv(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}

/// Parse the sheet
///
/// A header lacking any of the three columns yields an empty map. Rows
/// with empty scene or music cells are skipped.
pub fn parse_descriptions(content: &str) -> Result<TrackDescriptions> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Internal(format!("Unreadable description header: {}", e)))?
        .clone();
    let column = |label: &str| headers.iter().position(|h| h.contains(label));

    let (Some(scene_col), Some(music_col), Some(description_col)) =
        (column("Scene"), column("Music"), column("Description"))
    else {
        warn!("Description sheet lacks Scene/Music/Description columns");
        return Ok(TrackDescriptions::new());
    };

    let mut descriptions = TrackDescriptions::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::Internal(format!("Malformed description row: {}", e)))?;

        let scene = record.get(scene_col).unwrap_or_default();
        let music = record.get(music_col).unwrap_or_default();
        let description = record.get(description_col).unwrap_or_default();
        if scene.is_empty() || music.is_empty() {
            continue;
        }

        let file_name = music.rsplit('/').next().unwrap_or(music);
        descriptions.insert(format!("{}/{}", scene, file_name), description.to_string());
    }
    Ok(descriptions)
}
