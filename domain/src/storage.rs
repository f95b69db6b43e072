//! Local filesystem storage for uploaded audio blobs.
//!
//! The storage contract the rest of the system relies on: `save` returns a
//! storage path that is stable across processes, `resolve` maps it back to a
//! local file when one exists, and `delete` tolerates already-missing paths
//! (returns false, never an error) so cleanup can stay best-effort.

use crate::error::Error;
use entity::Id;
use log::*;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Saves an uploaded blob under a per-meeting directory with a
    /// collision-proof filename. Returns the relative storage path that gets
    /// persisted on the meeting row.
    pub fn save(&self, bytes: &[u8], original_name: &str, meeting_id: Id) -> Result<String, Error> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        let unique_name = format!(
            "{meeting_id}_{}{extension}",
            &Id::new_v4().simple().to_string()[..8]
        );
        let storage_path = format!("{meeting_id}/{unique_name}");

        let full_path = self.root.join(&storage_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, bytes)?;

        debug!("Saved audio blob to {}", full_path.display());
        Ok(storage_path)
    }

    /// Maps a storage path back to a local file, or None when the blob no
    /// longer exists.
    pub fn resolve(&self, storage_path: &str) -> Option<PathBuf> {
        let full_path = self.root.join(storage_path);
        full_path.exists().then_some(full_path)
    }

    /// Removes a stored blob. Missing paths return false rather than an
    /// error; an empty parent directory is cleaned up opportunistically.
    pub fn delete(&self, storage_path: &str) -> bool {
        let full_path = self.root.join(storage_path);
        if !full_path.exists() {
            return false;
        }

        if let Err(err) = fs::remove_file(&full_path) {
            warn!("Failed to remove {}: {err}", full_path.display());
            return false;
        }

        if let Some(parent) = full_path.parent() {
            let _ = fs::remove_dir(parent);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        let root = std::env::temp_dir().join(format!("meeting-notes-storage-{}", Id::new_v4()));
        LocalStorage::new(root)
    }

    #[test]
    fn save_then_resolve_round_trips() {
        let storage = temp_storage();
        let meeting_id = Id::new_v4();

        let path = storage
            .save(b"fake audio bytes", "Weekly Sync.WAV", meeting_id)
            .unwrap();

        assert!(path.starts_with(&meeting_id.to_string()));
        assert!(path.ends_with(".wav"));

        let resolved = storage.resolve(&path).expect("blob should exist");
        assert_eq!(fs::read(resolved).unwrap(), b"fake audio bytes");
    }

    #[test]
    fn save_generates_distinct_paths_for_the_same_filename() {
        let storage = temp_storage();
        let meeting_id = Id::new_v4();

        let first = storage.save(b"a", "meeting1.wav", meeting_id).unwrap();
        let second = storage.save(b"b", "meeting1.wav", meeting_id).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn delete_tolerates_missing_paths() {
        let storage = temp_storage();
        let meeting_id = Id::new_v4();

        let path = storage.save(b"bytes", "call.mp3", meeting_id).unwrap();
        assert!(storage.delete(&path));
        assert!(!storage.delete(&path));
        assert!(storage.resolve(&path).is_none());
    }

    #[test]
    fn filenames_without_extension_are_accepted() {
        let storage = temp_storage();
        let path = storage.save(b"bytes", "audio", Id::new_v4()).unwrap();
        assert!(storage.resolve(&path).is_some());
    }
}
