//! The on-disk record store.
//!
//! A single JSON document:
//!
//! ```json
//! {
//!   "database_info": { "total_entries": 2, "last_updated": "2024-05-01" },
//!   "zines": [ { "id": "SG003", "zine_name": "Sniffin' Glue #3", ... } ]
//! }
//! ```
//!
//! `metadata` and `records` are accepted as aliases on read. Unknown fields
//! at every level are carried through unchanged. The loaded bytes are kept
//! next to the parsed document so a backup can be verified byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use zine_curator_core::models::Record;

use crate::error::{Result, StoreError};

/// The store's metadata block, kept as the stored object so its keys
/// round-trip in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: Map<String, Value>,
}

impl Metadata {
    pub fn total_entries(&self) -> Option<u64> {
        self.entries.get("total_entries").and_then(Value::as_u64)
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.entries
            .insert("total_entries".to_string(), Value::from(count as u64));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Parsed store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(rename = "database_info", alias = "metadata", default)]
    pub metadata: Metadata,
    #[serde(rename = "zines", alias = "records")]
    pub records: Vec<Record>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoreDocument {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            metadata: Metadata::default(),
            records,
            extra: Map::new(),
        }
    }

    /// Replace the record list and bring `total_entries` in line with it.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.metadata.set_total_entries(self.records.len());
    }

    /// Record `last_updated` (YYYY-MM-DD) in the metadata block.
    pub fn stamp_last_updated(&mut self, date: chrono::NaiveDate) {
        self.metadata.insert(
            "last_updated",
            Value::String(date.format("%Y-%m-%d").to_string()),
        );
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// A store as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedStore {
    pub path: PathBuf,
    /// Exact bytes read, used for backup verification.
    pub bytes: Vec<u8>,
    pub document: StoreDocument,
}

/// Read and validate the store at `path`.
///
/// Fails when the file is missing or unreadable, when it does not parse as
/// a store document, or when two records share an id.
pub fn load(path: &Path) -> Result<LoadedStore> {
    if !path.exists() {
        return Err(StoreError::Missing(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse(path, &bytes)?;
    Ok(LoadedStore {
        path: path.to_path_buf(),
        bytes,
        document,
    })
}

/// Parse store bytes, enforcing unique record ids.
pub fn parse(path: &Path, bytes: &[u8]) -> Result<StoreDocument> {
    let document: StoreDocument =
        serde_json::from_slice(bytes).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(document.records.len());
    for record in &document.records {
        if !seen.insert(record.id.as_str()) {
            return Err(StoreError::DuplicateId {
                path: path.to_path_buf(),
                id: record.id.clone(),
            });
        }
    }
    Ok(document)
}

/// Serialize the document with two-space indentation.
pub fn to_bytes(document: &StoreDocument) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write the document to `path` through a sibling temp file and a rename,
/// so a failed write leaves the previous contents in place.
pub fn save(path: &Path, document: &StoreDocument) -> Result<()> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let bytes = to_bytes(document)
        .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, &bytes).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e)
    })?;
    Ok(())
}
