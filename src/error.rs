//! Store-level error types.
//!
//! Per-record problems (an unreadable image, a missing identifier) never
//! surface here; they degrade to "no key" inside the core. Every variant
//! below aborts the run before the store is mutated, or reports that the
//! mutation itself failed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for record-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store file does not exist.
    #[error("Record store not found: {}", .0.display())]
    Missing(PathBuf),

    /// The store file exists but could not be read.
    #[error("Failed to read record store {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a valid `{ database_info, zines }` document.
    #[error("Malformed record store {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two records share an id.
    #[error("Malformed record store {}: duplicate record id '{id}'", .path.display())]
    DuplicateId { path: PathBuf, id: String },

    /// Writing the store back failed.
    #[error("Failed to write record store {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup copy could not be written.
    #[error("Failed to write backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup was written but does not match the store bytes.
    #[error("Backup {} does not match the record store contents", .0.display())]
    BackupVerify(PathBuf),

    /// The audit log could not be written.
    #[error("Failed to write audit log {}: {source}", .path.display())]
    Audit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
