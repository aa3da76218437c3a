//! Filesystem-backed music store
//!
//! The directory tree under the music root is the only persistent state:
//!
//! ```text
//! music/{base|ver<N>}/{Scene}/[{tag}/]{track}
//! ```
//!
//! Every function here is synchronous; handlers call them from the
//! blocking pool.

use cuedeck_common::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

pub mod descriptions;
pub mod scenes;
pub mod tracks;
pub mod versions;

pub use descriptions::{find_descriptions_csv, parse_descriptions, TrackDescriptions};
pub use scenes::{SceneEntry, TrackEntry};

/// Name of the version every show starts from
pub const BASE_VERSION: &str = "base";

/// Tag folder holding the candidate cues of a scene
pub const SELECT_FOLDER: &str = "select";

/// Tag folder holding the chosen cue of a scene
pub const SELECTED_FOLDER: &str = "selected";

/// Reject anything that is not a single, plain path component
///
/// Empty strings, `.`, `..`, separators and NUL are refused so that a
/// request parameter can never address anything outside its parent.
pub fn validate_component<'a>(kind: &str, value: &'a str) -> Result<&'a str> {
    let unsafe_component = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);

    if unsafe_component {
        return Err(Error::InvalidPath(format!("Invalid {}: {:?}", kind, value)));
    }
    Ok(value)
}

/// Handle on the music root
#[derive(Debug, Clone)]
pub struct MusicStore {
    root: PathBuf,
}

impl MusicStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the music root and `base` if they do not exist yet
    pub fn ensure_layout(&self) -> Result<()> {
        let base = self.root.join(BASE_VERSION);
        if !base.is_dir() {
            fs::create_dir_all(&base)?;
            info!("Created {}", base.display());
        }
        Ok(())
    }

    /// Directory of a version; NotFound when it does not exist
    pub fn version_dir(&self, version: &str) -> Result<PathBuf> {
        let path = self.root.join(validate_component("version", version)?);
        if !path.is_dir() {
            return Err(Error::NotFound(format!("Version not found: {}", version)));
        }
        Ok(path)
    }

    /// Directory of a scene; NotFound when the version or scene is missing
    pub fn scene_dir(&self, version: &str, scene: &str) -> Result<PathBuf> {
        let scene = validate_component("scene", scene)?;
        let path = self.version_dir(version)?.join(scene);
        if !path.is_dir() {
            return Err(Error::NotFound(format!("Scene not found: {}", scene)));
        }
        Ok(path)
    }
}

/// Per-version mutation locks
///
/// Every mutating endpoint holds the lock of the version it touches for
/// the whole operation.
#[derive(Debug, Clone, Default)]
pub struct VersionLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl VersionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `version`
    ///
    /// Entries nobody holds or waits on are dropped, so the map only
    /// tracks versions in use.
    pub async fn lock(&self, version: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(version.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of versions currently tracked
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
