//! Track mutations inside one version: move, copy, rename, tag, select

use super::{validate_component, MusicStore, SELECTED_FOLDER, SELECT_FOLDER};
use cuedeck_common::markers::{resolve_rename, split_extension, with_markers, TrimMarkers};
use cuedeck_common::media::is_listed_track;
use cuedeck_common::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

impl MusicStore {
    /// Folder holding a scene's tracks, or its tag folder when `tag` is set
    fn track_folder(&self, version: &str, scene: &str, tag: Option<&str>) -> Result<PathBuf> {
        let scene_dir = self.scene_dir(version, scene)?;
        match tag {
            Some(tag) => Ok(scene_dir.join(validate_component("tag", tag)?)),
            None => Ok(scene_dir),
        }
    }

    /// Existing source file plus the target folder (created if it is a tag)
    fn resolve_transfer(
        &self,
        version: &str,
        source_scene: &str,
        target_scene: &str,
        track_name: &str,
        tag_name: Option<&str>,
    ) -> Result<(PathBuf, PathBuf)> {
        let track_name = validate_component("track", track_name)?;
        let source = self
            .track_folder(version, source_scene, tag_name)?
            .join(track_name);
        let target_folder = self.track_folder(version, target_scene, tag_name)?;

        if !source.is_file() {
            return Err(Error::NotFound(format!("Track not found: {}", track_name)));
        }
        if tag_name.is_some() && !target_folder.is_dir() {
            fs::create_dir(&target_folder)?;
        }
        Ok((source, target_folder))
    }

    /// Move a track to another scene, keeping its tag
    ///
    /// A same-named track at the destination is replaced. A tag folder left
    /// empty by the move is removed.
    pub fn move_track(
        &self,
        version: &str,
        source_scene: &str,
        target_scene: &str,
        track_name: &str,
        tag_name: Option<&str>,
    ) -> Result<()> {
        let (source, target_folder) =
            self.resolve_transfer(version, source_scene, target_scene, track_name, tag_name)?;

        fs::rename(&source, target_folder.join(track_name))?;
        info!(
            "Moved {} from {}/{} to {}/{}",
            track_name, version, source_scene, version, target_scene
        );

        if tag_name.is_some() {
            if let Some(folder) = source.parent() {
                remove_if_empty(folder)?;
            }
        }
        Ok(())
    }

    /// Copy a track to another scene, keeping its tag
    ///
    /// Never overwrites: an occupied destination gets `<base>_copy<ext>`,
    /// then `<base>_copy_1<ext>`, and so on. Returns the name written.
    pub fn copy_track(
        &self,
        version: &str,
        source_scene: &str,
        target_scene: &str,
        track_name: &str,
        tag_name: Option<&str>,
    ) -> Result<String> {
        let (source, target_folder) =
            self.resolve_transfer(version, source_scene, target_scene, track_name, tag_name)?;

        let written = free_copy_name(&target_folder, track_name);
        fs::copy(&source, target_folder.join(&written))?;
        info!(
            "Copied {}/{}/{} to {}/{}/{}",
            version, source_scene, track_name, version, target_scene, written
        );
        Ok(written)
    }

    /// Create an empty tag folder in a scene
    pub fn create_tag(&self, version: &str, scene: &str, tag_name: &str) -> Result<()> {
        let folder = self.track_folder(version, scene, Some(tag_name))?;
        if folder.exists() {
            return Err(Error::Conflict(format!("Tag already exists: {}", tag_name)));
        }
        fs::create_dir(&folder)?;
        info!("Created tag {} in {}/{}", tag_name, version, scene);
        Ok(())
    }

    /// Rename a track in place, carrying its trim markers over
    ///
    /// Returns the name actually stored.
    pub fn rename_track(
        &self,
        version: &str,
        scene: &str,
        old_name: &str,
        new_name: &str,
        tag_name: Option<&str>,
    ) -> Result<String> {
        let folder = self.track_folder(version, scene, tag_name)?;
        let old_name = validate_component("track", old_name)?;
        validate_component("track", new_name)?;

        let source = folder.join(old_name);
        if !source.is_file() {
            return Err(Error::NotFound(format!("Track not found: {}", old_name)));
        }

        let resolved = resolve_rename(old_name, new_name);
        validate_component("track", &resolved)?;
        let target = folder.join(&resolved);
        if target.exists() {
            return Err(Error::Conflict(format!(
                "A track named {} already exists",
                resolved
            )));
        }

        fs::rename(&source, &target)?;
        info!("Renamed {}/{}: {} -> {}", version, scene, old_name, resolved);
        Ok(resolved)
    }

    /// Write trim markers into a track's filename
    ///
    /// Returns the new name; unchanged names are left alone.
    pub fn save_markers(
        &self,
        version: &str,
        scene: &str,
        track_name: &str,
        tag_name: Option<&str>,
        markers: TrimMarkers,
    ) -> Result<String> {
        if let Some(end) = markers.end {
            if end <= markers.start {
                return Err(Error::InvalidInput(format!(
                    "End marker {}s must be after start marker {}s",
                    end, markers.start
                )));
            }
        }

        let new_name = with_markers(track_name, markers);
        if new_name == track_name {
            let folder = self.track_folder(version, scene, tag_name)?;
            if !folder.join(validate_component("track", track_name)?).is_file() {
                return Err(Error::NotFound(format!("Track not found: {}", track_name)));
            }
            return Ok(new_name);
        }
        self.rename_track(version, scene, track_name, &new_name, tag_name)
    }

    /// Swap the audio files of a scene's `select` and `selected` folders
    pub fn reorder_tracks(&self, version: &str, scene: &str) -> Result<()> {
        let (select, selected) = self.selection_folders(version, scene)?;

        let in_select = audio_files(&select)?;
        let in_selected = audio_files(&selected)?;
        let shared: HashSet<&String> = in_select.intersection(&in_selected).collect();

        for name in &shared {
            // Same name on both sides: trade contents through a hidden name
            let parked = parking_spot(&select, name);
            fs::rename(select.join(name), &parked)?;
            fs::rename(selected.join(name), select.join(name))?;
            fs::rename(&parked, selected.join(name))?;
        }
        for name in in_select.iter().filter(|n| !shared.contains(n)) {
            fs::rename(select.join(name), selected.join(name))?;
        }
        for name in in_selected.iter().filter(|n| !shared.contains(n)) {
            fs::rename(selected.join(name), select.join(name))?;
        }

        info!("Swapped select and selected in {}/{}", version, scene);
        Ok(())
    }

    /// Make `track_name` the only track in `selected`
    ///
    /// Whatever was selected goes back to `select`.
    pub fn select_track(&self, version: &str, scene: &str, track_name: &str) -> Result<()> {
        let track_name = validate_component("track", track_name)?;
        let (select, selected) = self.selection_folders(version, scene)?;

        let chosen = select.join(track_name);
        if !chosen.is_file() {
            return Err(Error::NotFound(format!(
                "Track not found in {}: {}",
                SELECT_FOLDER, track_name
            )));
        }

        let incumbents = audio_files(&selected)?;
        if let Some(clash) = incumbents.iter().find(|name| select.join(name).exists()) {
            return Err(Error::Conflict(format!(
                "{} exists in both {} and {}",
                clash, SELECT_FOLDER, SELECTED_FOLDER
            )));
        }

        for name in &incumbents {
            fs::rename(selected.join(name), select.join(name))?;
        }
        fs::rename(&chosen, selected.join(track_name))?;

        info!("Selected {} in {}/{}", track_name, version, scene);
        Ok(())
    }

    fn selection_folders(&self, version: &str, scene: &str) -> Result<(PathBuf, PathBuf)> {
        let scene_dir = self.scene_dir(version, scene)?;
        let select = scene_dir.join(SELECT_FOLDER);
        let selected = scene_dir.join(SELECTED_FOLDER);

        for (name, folder) in [(SELECT_FOLDER, &select), (SELECTED_FOLDER, &selected)] {
            if !folder.is_dir() {
                return Err(Error::NotFound(format!(
                    "Missing folder {} in scene {}",
                    name, scene
                )));
            }
        }
        Ok((select, selected))
    }
}

/// Listed audio files directly inside `folder`
fn audio_files(folder: &Path) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if let Ok(name) = entry.file_name().into_string() {
            if is_listed_track(&name) && entry.path().is_file() {
                names.insert(name);
            }
        }
    }
    Ok(names)
}

/// First name not present in `folder`: `name`, `<base>_copy<ext>`, `<base>_copy_1<ext>`, ...
fn free_copy_name(folder: &Path, name: &str) -> String {
    if !folder.join(name).exists() {
        return name.to_string();
    }

    let (base, extension) = split_extension(name);
    let mut candidate = format!("{}_copy{}", base, extension);
    let mut counter = 1;
    while folder.join(&candidate).exists() {
        candidate = format!("{}_copy_{}{}", base, counter, extension);
        counter += 1;
    }
    candidate
}

/// Unused hidden path in `folder` for holding `name` during a swap
fn parking_spot(folder: &Path, name: &str) -> PathBuf {
    let mut candidate = folder.join(format!(".{}.swap", name));
    let mut counter = 1;
    while fs::symlink_metadata(&candidate).is_ok() {
        candidate = folder.join(format!(".{}.swap{}", name, counter));
        counter += 1;
    }
    candidate
}

fn remove_if_empty(folder: &Path) -> Result<()> {
    if fs::read_dir(folder)?.next().is_none() {
        fs::remove_dir(folder)?;
        info!("Removed empty tag folder {}", folder.display());
    }
    Ok(())
}
