//! Removal audit log.
//!
//! Every destructive run writes one JSON file listing each removed record
//! with its reason:
//!
//! ```json
//! {
//!   "run_at": "2024-05-01T12:00:00+02:00",
//!   "mode": "apply",
//!   "store_written": true,
//!   "removed": [
//!     { "reason": "non_zine", "record": { ... } },
//!     { "reason": "false_positive:mediatype audio", "record": { ... } },
//!     { "reason": "duplicate_of:SG003", "record": { ... } }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::info;
use zine_curator_core::models::Record;
use zine_curator_core::prune::PruneReason;

use crate::backup::create_unique;
use crate::error::{Result, StoreError};

/// Why a record left the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    NonZine,
    /// Accepted by the classifier, then flagged by false-positive screening.
    FalsePositive(PruneReason),
    DuplicateOf(String),
    /// Matched a manual removal rule.
    Manual,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalReason::NonZine => f.write_str("non_zine"),
            RemovalReason::FalsePositive(why) => write!(f, "false_positive:{}", why),
            RemovalReason::DuplicateOf(id) => write!(f, "duplicate_of:{}", id),
            RemovalReason::Manual => f.write_str("manual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub record: Record,
    pub reason: RemovalReason,
}

#[derive(Serialize)]
struct AuditEntry<'a> {
    reason: String,
    record: &'a Record,
}

#[derive(Serialize)]
struct AuditLog<'a> {
    run_at: String,
    mode: &'a str,
    store_written: bool,
    removed: Vec<AuditEntry<'a>>,
}

/// Write the audit log for one run into `dir`.
///
/// The file is named `cleanup_removed_<YYYYmmdd_HHMMSS>_<pid>.json` (or
/// `manual_removed_…` for manual runs) and is never overwritten.
pub fn write_audit_log<Tz: TimeZone>(
    dir: &Path,
    mode: &str,
    store_written: bool,
    removals: &[Removal],
    now: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: fmt::Display,
{
    let log = AuditLog {
        run_at: now.to_rfc3339(),
        mode,
        store_written,
        removed: removals
            .iter()
            .map(|r| AuditEntry {
                reason: r.reason.to_string(),
                record: &r.record,
            })
            .collect(),
    };
    let prefix = if mode == "remove" { "manual" } else { "cleanup" };
    let stem = format!(
        "{}_removed_{}_{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        std::process::id()
    );

    let mut bytes = serde_json::to_vec_pretty(&log).map_err(|e| StoreError::Audit {
        path: dir.join(&stem),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    bytes.push(b'\n');

    let path = create_unique(dir, &stem, "json", &bytes)
        .map_err(|(path, source)| StoreError::Audit { path, source })?;
    info!(audit = %path.display(), removed = removals.len(), "audit log written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn test_reason_strings() {
        assert_eq!(RemovalReason::NonZine.to_string(), "non_zine");
        assert_eq!(
            RemovalReason::DuplicateOf("SG003".to_string()).to_string(),
            "duplicate_of:SG003"
        );
        assert_eq!(RemovalReason::Manual.to_string(), "manual");
        assert_eq!(
            RemovalReason::FalsePositive(PruneReason::MediaType("audio".to_string())).to_string(),
            "false_positive:mediatype audio"
        );
    }

    #[test]
    fn test_audit_log_lists_every_removal() {
        let dir = TempDir::new().unwrap();
        let removals = vec![
            Removal {
                record: Record::new("Y1", "Lincoln High Yearbook"),
                reason: RemovalReason::NonZine,
            },
            Removal {
                record: Record::new("SG003b", "Sniffin' Glue #3"),
                reason: RemovalReason::DuplicateOf("SG003".to_string()),
            },
        ];
        let path = write_audit_log(dir.path(), "apply", true, &removals, &Utc::now()).unwrap();
        let value: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "apply");
        assert_eq!(value["store_written"], true);
        assert_eq!(value["removed"].as_array().unwrap().len(), 2);
        assert_eq!(value["removed"][0]["reason"], "non_zine");
        assert_eq!(value["removed"][1]["reason"], "duplicate_of:SG003");
        assert_eq!(value["removed"][1]["record"]["zine_name"], "Sniffin' Glue #3");
    }

    #[test]
    fn test_repeated_runs_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let a = write_audit_log(dir.path(), "apply", true, &[], &now).unwrap();
        let b = write_audit_log(dir.path(), "apply", true, &[], &now).unwrap();
        assert_ne!(a, b);
    }
}
