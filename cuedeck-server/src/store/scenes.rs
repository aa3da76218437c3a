//! Read-only view of a version: scenes and their tracks

use super::MusicStore;
use cuedeck_common::markers::{find_markers, TrimMarkers};
use cuedeck_common::media::is_listed_track;
use cuedeck_common::natural::{compare_scene_names, locale_cmp};
use cuedeck_common::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One playable file in a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    /// Filename
    pub name: String,
    /// Path relative to the music root, usable with `/api/music/`
    pub path: String,
    /// Path relative to the scene: `file` or `tag/file`
    pub relative_path: String,
    pub is_tag: bool,
    pub tag_name: Option<String>,
    /// Trim window parsed from the filename
    pub markers: Option<TrimMarkers>,
}

/// A scene and its sorted tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub name: String,
    pub tracks: Vec<TrackEntry>,
}

impl MusicStore {
    /// Scenes of `version` in natural order, each with its tracks
    pub fn list_scenes(&self, version: &str) -> Result<Vec<SceneEntry>> {
        let version_dir = self.version_dir(version)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&version_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!("Skipping non UTF-8 scene {:?}", name),
            }
        }
        names.sort_by(|a, b| compare_scene_names(a, b));

        names
            .into_iter()
            .map(|name| {
                let prefix = format!("{}/{}", version, name);
                let tracks = list_tracks(&version_dir.join(&name), &prefix)?;
                Ok(SceneEntry { name, tracks })
            })
            .collect()
    }
}

/// Tracks directly in `scene_dir` and one level down in tag folders
///
/// `path_prefix` is the scene's location relative to the music root.
pub fn list_tracks(scene_dir: &Path, path_prefix: &str) -> Result<Vec<TrackEntry>> {
    let mut tracks = Vec::new();

    for entry in fs::read_dir(scene_dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!("Skipping non UTF-8 entry in {}", scene_dir.display());
            continue;
        };
        let entry_path = entry.path();

        if entry_path.is_dir() {
            for file in fs::read_dir(&entry_path)? {
                let file = file?;
                let Ok(file_name) = file.file_name().into_string() else {
                    continue;
                };
                if !is_listed_track(&file_name) || !file.path().is_file() {
                    continue;
                }
                let relative_path = format!("{}/{}", name, file_name);
                tracks.push(TrackEntry {
                    path: format!("{}/{}", path_prefix, relative_path),
                    relative_path,
                    is_tag: true,
                    tag_name: Some(name.clone()),
                    markers: find_markers(&file_name),
                    name: file_name,
                });
            }
        } else if is_listed_track(&name) {
            tracks.push(TrackEntry {
                path: format!("{}/{}", path_prefix, name),
                relative_path: name.clone(),
                is_tag: false,
                tag_name: None,
                markers: find_markers(&name),
                name,
            });
        }
    }

    tracks.sort_by(compare_tracks);
    Ok(tracks)
}

/// Untagged first, then tag groups by tag name, filenames within a group
pub fn compare_tracks(a: &TrackEntry, b: &TrackEntry) -> Ordering {
    match (&a.tag_name, &b.tag_name) {
        (None, None) => locale_cmp(&a.name, &b.name),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(tag_a), Some(tag_b)) => tag_a
            .cmp(tag_b)
            .then_with(|| locale_cmp(&a.name, &b.name)),
    }
}
