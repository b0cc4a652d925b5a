//! Pre-mutation backups of the record store.
//!
//! A backup is a byte-identical copy of the store as it was loaded, written
//! into the backup directory under a timestamped, process-unique name. It is
//! re-read and compared against the loaded bytes before any caller is
//! allowed to touch the store. Backups are never overwritten or pruned.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::info;
use zine_curator_core::image::content_digest;

use crate::error::{Result, StoreError};
use crate::store::LoadedStore;

/// `<store-stem>_backup_<YYYYmmdd_HHMMSS>_<pid>`.
pub fn backup_stem<Tz: TimeZone>(store_path: &Path, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "store".to_string());
    format!(
        "{}_backup_{}_{}",
        stem,
        now.format("%Y%m%d_%H%M%S"),
        std::process::id()
    )
}

/// Write and verify a backup of `store` into `backup_dir`.
pub fn write_backup<Tz: TimeZone>(
    store: &LoadedStore,
    backup_dir: &Path,
    now: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let stem = backup_stem(&store.path, now);
    let path = create_unique(backup_dir, &stem, "json", &store.bytes)
        .map_err(|(path, source)| StoreError::Backup { path, source })?;

    let written = std::fs::read(&path).map_err(|source| StoreError::Backup {
        path: path.clone(),
        source,
    })?;
    if content_digest(&written) != content_digest(&store.bytes) {
        return Err(StoreError::BackupVerify(path));
    }

    info!(backup = %path.display(), bytes = written.len(), "backup written");
    Ok(path)
}

/// Create `<dir>/<stem>.<ext>` without clobbering anything, appending `_1`,
/// `_2`, … to the stem on collision. Creates `dir` if needed.
pub(crate) fn create_unique(
    dir: &Path,
    stem: &str,
    ext: &str,
    contents: &[u8],
) -> std::result::Result<PathBuf, (PathBuf, std::io::Error)> {
    std::fs::create_dir_all(dir).map_err(|e| (dir.to_path_buf(), e))?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{}.{}", stem, ext)
        } else {
            format!("{}_{}.{}", stem, attempt, ext)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                return file
                    .write_all(contents)
                    .and_then(|_| file.sync_all())
                    .map(|_| path.clone())
                    .map_err(|e| (path, e));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err((path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreDocument;
    use chrono::Utc;
    use tempfile::TempDir;

    fn loaded(dir: &TempDir, bytes: &[u8]) -> LoadedStore {
        let path = dir.path().join("punk_zines_database.json");
        std::fs::write(&path, bytes).unwrap();
        LoadedStore {
            path,
            bytes: bytes.to_vec(),
            document: StoreDocument::new(Vec::new()),
        }
    }

    #[test]
    fn test_backup_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir, b"{\"zines\": []}\n");
        let backup = write_backup(&store, &dir.path().join("backups"), &Utc::now()).unwrap();
        assert_eq!(std::fs::read(&backup).unwrap(), store.bytes);
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("punk_zines_database_backup_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_backups_never_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir, b"{\"zines\": []}");
        let now = Utc::now();
        let first = write_backup(&store, dir.path(), &now).unwrap();
        let second = write_backup(&store, dir.path(), &now).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_unwritable_backup_dir_fails() {
        let dir = TempDir::new().unwrap();
        let store = loaded(&dir, b"{}");
        // A regular file where the backup directory should be.
        let blocker = dir.path().join("backups");
        std::fs::write(&blocker, b"").unwrap();
        let err = write_backup(&store, &blocker, &Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Backup { .. }));
    }
}
