//! Version snapshots: `base` plus append-only `ver<N>` copies

use super::{validate_component, MusicStore, BASE_VERSION};
use cuedeck_common::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

const VERSION_PREFIX: &str = "ver";

/// Numeric suffix of a `ver<N>` name
fn version_number(name: &str) -> Option<u64> {
    name.strip_prefix(VERSION_PREFIX)?.parse().ok()
}

impl MusicStore {
    /// Entries directly under the music root whose name starts with `ver`
    ///
    /// Returned in directory order.
    pub fn list_versions(&self) -> Result<Vec<String>> {
        let mut versions = Vec::new();
        for entry in fs::read_dir(self.root())? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with(VERSION_PREFIX) => versions.push(name),
                Ok(_) => {}
                Err(name) => debug!("Skipping non UTF-8 entry {:?}", name),
            }
        }
        Ok(versions)
    }

    /// Name the next snapshot would get: `ver<max + 1>`
    pub fn next_version_name(&self) -> Result<String> {
        let max = self
            .list_versions()?
            .iter()
            .filter_map(|name| version_number(name))
            .max()
            .unwrap_or(0);
        Ok(format!("{}{}", VERSION_PREFIX, max + 1))
    }

    /// Copy `from_version` to a fresh `ver<N>` and return its name
    ///
    /// The target is created with a non-recursive mkdir, so two creations
    /// racing for the same number fail with Conflict instead of merging.
    pub fn create_version(&self, from_version: &str) -> Result<String> {
        let source = self.root().join(validate_component("version", from_version)?);
        if !source.is_dir() {
            return Err(Error::NotFound(format!(
                "Source version not found: {}",
                from_version
            )));
        }

        let next = self.next_version_name()?;
        let target = self.root().join(&next);
        fs::create_dir(&target).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::Conflict(format!("Version already exists: {}", next)),
            _ => Error::Io(e),
        })?;

        copy_tree(&source, &target)?;
        info!("Created version {} from {}", next, from_version);
        Ok(next)
    }

    /// The `ver*` entry with the largest number, or `base` when none exist
    pub fn latest_version(&self) -> Result<String> {
        let latest = self
            .list_versions()?
            .into_iter()
            .filter_map(|name| version_number(&name).map(|n| (n, name)))
            .max_by_key(|(n, _)| *n)
            .map(|(_, name)| name);
        Ok(latest.unwrap_or_else(|| BASE_VERSION.to_string()))
    }
}

/// Recursively copy the contents of `source` into the existing `target`
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry
            .map_err(|e| Error::Internal(format!("Walking {}: {}", source.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::Internal(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(dirs: &[&str]) -> (tempfile::TempDir, MusicStore) {
        let temp = tempfile::tempdir().unwrap();
        for dir in dirs {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        let store = MusicStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn test_version_number() {
        assert_eq!(version_number("ver12"), Some(12));
        assert_eq!(version_number("ver"), None);
        assert_eq!(version_number("version2"), None);
        assert_eq!(version_number("base"), None);
    }

    #[test]
    fn test_list_versions_excludes_base() {
        let (_temp, store) = store_with(&["base", "ver1", "ver2", "other"]);
        let mut versions = store.list_versions().unwrap();
        versions.sort();
        assert_eq!(versions, vec!["ver1", "ver2"]);
    }

    #[test]
    fn test_next_version_skips_gaps() {
        let (_temp, store) = store_with(&["base", "ver1", "ver3", "ver_old"]);
        assert_eq!(store.next_version_name().unwrap(), "ver4");
    }

    #[test]
    fn test_create_version_copies_tree() {
        let (temp, store) = store_with(&["base/Scene 1/select"]);
        fs::write(temp.path().join("base/Scene 1/a.mp3"), b"a").unwrap();
        fs::write(temp.path().join("base/Scene 1/select/b.mp3"), b"b").unwrap();

        let created = store.create_version("base").unwrap();
        assert_eq!(created, "ver1");
        assert_eq!(fs::read(temp.path().join("ver1/Scene 1/a.mp3")).unwrap(), b"a");
        assert_eq!(
            fs::read(temp.path().join("ver1/Scene 1/select/b.mp3")).unwrap(),
            b"b"
        );
        // Source untouched
        assert!(temp.path().join("base/Scene 1/a.mp3").exists());
    }

    #[test]
    fn test_create_version_missing_source() {
        let (_temp, store) = store_with(&["base"]);
        assert!(matches!(
            store.create_version("ver9"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_latest_version() {
        let (_temp, store) = store_with(&["base"]);
        assert_eq!(store.latest_version().unwrap(), "base");

        let (_temp, store) = store_with(&["base", "ver2", "ver10", "ver9"]);
        assert_eq!(store.latest_version().unwrap(), "ver10");
    }
}
