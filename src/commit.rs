//! Backup-then-write sequence for destructive runs.
//!
//! The only path that mutates the record store:
//!
//! 1. Write a verified byte-identical backup. Failure aborts before the
//!    store is touched.
//! 2. Replace the record list, update `total_entries` and `last_updated`,
//!    and write the store.
//! 3. Write the audit log, whether or not step 2 succeeded; the log records
//!    which it was.
//!
//! Assumes a single writer. Nothing here locks the store file.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info};
use zine_curator_core::models::Record;

use crate::audit::{write_audit_log, Removal};
use crate::backup::write_backup;
use crate::error::Result;
use crate::store::{self, LoadedStore};

/// Paths produced by a successful commit.
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub backup: PathBuf,
    pub audit: PathBuf,
    pub remaining: usize,
}

/// Persist `retained` as the new record set of `loaded`.
pub fn commit(
    loaded: &LoadedStore,
    retained: Vec<Record>,
    removals: &[Removal],
    backup_dir: &Path,
    mode: &str,
) -> Result<CommitReport> {
    let now = Local::now();

    let backup = write_backup(loaded, backup_dir, &now)?;

    let mut document = loaded.document.clone();
    document.replace_records(retained);
    document.stamp_last_updated(now.date_naive());
    let remaining = document.records.len();

    let written = store::save(&loaded.path, &document);
    match &written {
        Ok(()) => info!(store = %loaded.path.display(), remaining, "record store written"),
        Err(e) => error!(store = %loaded.path.display(), error = %e, "record store write failed"),
    }

    let audit = write_audit_log(backup_dir, mode, written.is_ok(), removals, &now);
    written?;
    let audit = audit?;

    Ok(CommitReport {
        backup,
        audit,
        remaining,
    })
}
