//! Identity-key extraction.
//!
//! Four independent extractors each derive zero or one normalized key from a
//! single record. Two records sharing any non-empty key of the same
//! [`KeyKind`] are duplicates. Extractors never look at other records.
//!
//! | Kind | Source field | Normalization |
//! |------|--------------|---------------|
//! | `catalog` | catalog identifier | verbatim, catalog-sourced records only |
//! | `url` | `archive_source` | query string and fragment stripped |
//! | `title` | name, issue, year | lower-cased, punctuation and ordinal words dropped |
//! | `hash` | local image bytes | SHA-256 hex |

use std::fmt;

use crate::classify::normalize_text;
use crate::image::{content_digest, ImageSource};
use crate::models::Record;

/// Words dropped from names before building the title key.
const ORDINAL_WORDS: &[&str] = &["issue", "no", "number", "vol", "volume"];

/// Separator between the name, issue, and year parts of a title key.
pub const TITLE_KEY_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    Catalog,
    Url,
    Title,
    Hash,
}

impl KeyKind {
    pub const ALL: [KeyKind; 4] = [KeyKind::Catalog, KeyKind::Url, KeyKind::Title, KeyKind::Hash];

    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Catalog => "catalog",
            KeyKind::Url => "url",
            KeyKind::Title => "title",
            KeyKind::Hash => "hash",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog identifier of a catalog-sourced record.
pub fn catalog_key(record: &Record) -> Option<String> {
    record.catalog_identifier()
}

/// Source URL with query string and fragment removed.
///
/// Values without a `scheme://` part (e.g. source labels) are returned
/// trimmed but otherwise as-is.
pub fn url_key(record: &Record) -> Option<String> {
    let url = record.source_url.as_deref()?.trim();
    if url.is_empty() {
        return None;
    }
    if !url.contains("://") {
        return Some(url.to_string());
    }
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let base = &url[..end];
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// `name|issue|year`, normalized. `None` when the normalized name is empty.
pub fn title_key(record: &Record) -> Option<String> {
    let name = normalize_title(&record.name);
    if name.is_empty() {
        return None;
    }
    let issue = record.issue_text().map(|s| s.to_lowercase()).unwrap_or_default();
    let year = record.year_text().map(|s| s.to_lowercase()).unwrap_or_default();
    Some(format!(
        "{name}{sep}{issue}{sep}{year}",
        sep = TITLE_KEY_SEPARATOR
    ))
}

/// Content digest of the record's local image.
///
/// Remote image URLs, missing files, and unreadable files all yield `None`.
pub fn hash_key<I: ImageSource + ?Sized>(record: &Record, images: &I) -> Option<String> {
    let path = record.local_image_path()?;
    images.read(path).map(|bytes| content_digest(&bytes))
}

/// Lower-case, strip punctuation and ordinal words, collapse whitespace.
pub fn normalize_title(name: &str) -> String {
    let stripped: String = normalize_text(name)
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped
        .split_whitespace()
        .filter(|w| !ORDINAL_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// All four identity keys of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityKeys {
    pub catalog: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub hash: Option<String>,
}

impl IdentityKeys {
    pub fn extract<I: ImageSource + ?Sized>(record: &Record, images: &I) -> Self {
        Self {
            catalog: catalog_key(record),
            url: url_key(record),
            title: title_key(record),
            hash: hash_key(record, images),
        }
    }

    pub fn get(&self, kind: KeyKind) -> Option<&str> {
        match kind {
            KeyKind::Catalog => self.catalog.as_deref(),
            KeyKind::Url => self.url.as_deref(),
            KeyKind::Title => self.title.as_deref(),
            KeyKind::Hash => self.hash.as_deref(),
        }
    }

    /// Present keys in [`KeyKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyKind, &str)> + '_ {
        KeyKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|key| (kind, key)))
    }
}
