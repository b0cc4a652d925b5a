//! Harvested zine records.
//!
//! A [`Record`] is the typed view of one entry in the record store. Only the
//! fields the classifier, key extractors, and ranker read are typed. The
//! stored JSON object rides along untouched, so a record read from the store
//! is written back byte-for-byte equivalent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Provenance of a record, ordered by authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceType {
    Unknown,
    OtherArchive,
    PhotoSharing,
    ManifestArchive,
    /// The authoritative catalog (Internet Archive).
    Catalog,
}

impl SourceType {
    /// Map the raw `source_type` string onto a provenance class.
    ///
    /// Unrecognized or missing strings are [`SourceType::Unknown`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("internet_archive") => SourceType::Catalog,
            Some("iiif") => SourceType::ManifestArchive,
            Some("flickr") => SourceType::PhotoSharing,
            Some("other_archive") => SourceType::OtherArchive,
            _ => SourceType::Unknown,
        }
    }

    /// Fixed authority rank: catalog highest, unknown lowest.
    pub fn authority(self) -> u8 {
        match self {
            SourceType::Catalog => 4,
            SourceType::ManifestArchive => 3,
            SourceType::PhotoSharing => 2,
            SourceType::OtherArchive => 1,
            SourceType::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceType::Catalog => "internet_archive",
            SourceType::ManifestArchive => "iiif",
            SourceType::PhotoSharing => "flickr",
            SourceType::OtherArchive => "other_archive",
            SourceType::Unknown => "unknown",
        }
    }
}

/// Catalog metadata block (`ia_metadata`) attached by the catalog harvester.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogMetadata {
    /// The catalog's media type (`texts`, `audio`, `software`, ...).
    pub fn mediatype(&self) -> Option<&str> {
        self.extra
            .get("mediatype")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One harvested zine entry.
///
/// The typed fields are a read view. A record deserialized from the store
/// keeps the JSON object it came from and serializes back to exactly that
/// object, key order included. Records built in code serialize their typed
/// fields, omitting the absent ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub issue_number: Option<Value>,
    pub year: Option<Value>,
    pub source_type: Option<String>,
    /// Canonical page for this record at its source.
    pub source_url: Option<String>,
    /// Resolved catalog item URL, when the catalog exposes one.
    pub catalog_item_url: Option<String>,
    pub catalog: Option<CatalogMetadata>,
    /// Local cached image path or remote image URL.
    pub image_location: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    stored: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RecordFields {
    id: String,
    #[serde(rename = "zine_name", default, deserialize_with = "string_or_null")]
    name: String,
    #[serde(default)]
    issue_number: Option<Value>,
    #[serde(default)]
    year: Option<Value>,
    #[serde(default)]
    source_type: Option<String>,
    #[serde(rename = "archive_source", default)]
    source_url: Option<String>,
    #[serde(rename = "ia_item_url", default)]
    catalog_item_url: Option<String>,
    #[serde(rename = "ia_metadata", default, deserialize_with = "catalog_or_none")]
    catalog: Option<CatalogMetadata>,
    #[serde(rename = "image_url", default)]
    image_location: Option<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    description: String,
    #[serde(default, deserialize_with = "vec_or_null")]
    tags: Vec<String>,
}

#[derive(Serialize)]
struct RecordFieldsRef<'a> {
    id: &'a str,
    zine_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_number: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive_source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ia_item_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ia_metadata: Option<&'a CatalogMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let stored = Map::<String, Value>::deserialize(de)?;
        let fields = RecordFields::deserialize(Value::Object(stored.clone()))
            .map_err(serde::de::Error::custom)?;
        Ok(Self {
            id: fields.id,
            name: fields.name,
            issue_number: fields.issue_number,
            year: fields.year,
            source_type: fields.source_type,
            source_url: fields.source_url,
            catalog_item_url: fields.catalog_item_url,
            catalog: fields.catalog,
            image_location: fields.image_location,
            description: fields.description,
            tags: fields.tags,
            stored: Some(stored),
        })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        if let Some(stored) = &self.stored {
            return stored.serialize(ser);
        }
        RecordFieldsRef {
            id: &self.id,
            zine_name: &self.name,
            issue_number: self.issue_number.as_ref(),
            year: self.year.as_ref(),
            source_type: self.source_type.as_deref(),
            archive_source: self.source_url.as_deref(),
            ia_item_url: self.catalog_item_url.as_deref(),
            ia_metadata: self.catalog.as_ref(),
            image_url: self.image_location.as_deref(),
            description: Some(self.description.as_str()).filter(|s| !s.is_empty()),
            tags: Some(self.tags.as_slice()).filter(|t| !t.is_empty()),
        }
        .serialize(ser)
    }
}

impl Record {
    /// Minimal record with only an id and a name; the rest empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issue_number: None,
            year: None,
            source_type: None,
            source_url: None,
            catalog_item_url: None,
            catalog: None,
            image_location: None,
            description: String::new(),
            tags: Vec::new(),
            stored: None,
        }
    }

    /// The JSON object this record was read from, if any.
    pub fn stored(&self) -> Option<&Map<String, Value>> {
        self.stored.as_ref()
    }

    /// A stored field the typed view does not cover.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.stored.as_ref().and_then(|m| m.get(key))
    }

    /// `ia_metadata.mediatype`, when present.
    pub fn mediatype(&self) -> Option<&str> {
        self.catalog.as_ref().and_then(CatalogMetadata::mediatype)
    }

    pub fn source_kind(&self) -> SourceType {
        SourceType::parse(self.source_type.as_deref())
    }

    /// `issue_number` as trimmed text, `None` when absent or blank.
    pub fn issue_text(&self) -> Option<String> {
        self.issue_number.as_ref().and_then(scalar_text)
    }

    /// `year` as trimmed text, `None` when absent or blank.
    pub fn year_text(&self) -> Option<String> {
        self.year.as_ref().and_then(scalar_text)
    }

    /// True when `image_location` is a local path rather than a remote URL.
    pub fn has_local_image(&self) -> bool {
        self.local_image_path().is_some()
    }

    pub fn local_image_path(&self) -> Option<&str> {
        let loc = self.image_location.as_deref()?.trim();
        if loc.is_empty() || loc.contains("://") {
            None
        } else {
            Some(loc)
        }
    }

    /// The catalog identifier, only for catalog-sourced records.
    ///
    /// Read from the catalog metadata block first, then recovered from an
    /// `"Internet Archive: <id>"` source label or a `/details/<id>` item URL.
    pub fn catalog_identifier(&self) -> Option<String> {
        if self.source_kind() != SourceType::Catalog {
            return None;
        }
        let from_meta = self
            .catalog
            .as_ref()
            .and_then(|m| m.identifier.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(id) = from_meta {
            return Some(id.to_string());
        }
        let from_label = self
            .source_url
            .as_deref()
            .and_then(|s| s.strip_prefix("Internet Archive:"))
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(id) = from_label {
            return Some(id.to_string());
        }
        self.catalog_item_url
            .as_deref()
            .and_then(|u| u.split_once("/details/"))
            .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or(""))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn has_catalog_item_url(&self) -> bool {
        self.catalog_item_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }
}

/// Render a JSON scalar as trimmed text. Strings and numbers only.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn string_or_null<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

/// A non-object or unparseable `ia_metadata` counts as absent.
fn catalog_or_none<'de, D>(de: D) -> Result<Option<CatalogMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Object(_) => CatalogMetadata::deserialize(value).ok(),
        _ => None,
    })
}

fn vec_or_null<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}
