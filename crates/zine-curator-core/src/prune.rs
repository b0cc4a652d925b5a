//! False-positive screening for records the classifier accepted.
//!
//! Harvesting by keyword drags in catalog items that mention punk or zines
//! without being one: LibriVox audiobooks, old-time radio, software
//! collections, botanical journals, local newspapers. The classifier's
//! positive evidence accepts those. [`PruneRules`] runs after it, over the
//! accepted records only, and flags them before duplicate resolution.
//!
//! Checks, in order; known series are never flagged:
//!
//! 1. catalog media type `audio`; `software` or `collection` unless the
//!    description mentions "zine" or "punk";
//! 2. a false-positive phrase in name + description (literature, radio,
//!    audiobook and reference titles);
//! 3. an excluded word in the name (newspapers, botany, medicine);
//! 4. a numeric year outside the configured era.

use std::fmt;

use crate::classify::{normalize_text, KNOWN_SERIES};
use crate::models::Record;

/// Phrases marking audiobooks, public-domain literature, radio shows and
/// reference works.
pub const FALSE_POSITIVE_PHRASES: &[&str] = &[
    "librivox",
    "audiobook",
    "audio book",
    "alice in wonderland",
    "moby dick",
    "tom sawyer",
    "sherlock holmes",
    "huckleberry finn",
    "dracula",
    "frankenstein",
    "treasure island",
    "swiss family robinson",
    "great expectations",
    "heart of darkness",
    "wuthering heights",
    "gulliver's travels",
    "uncle tom's cabin",
    "grimm",
    "sense and sensibility",
    "gunsmoke",
    "dragnet",
    "suspense",
    "richard diamond",
    "philip marlowe",
    "software library",
    "software capsule",
    "martin luther king",
    "i have a dream",
    "art of war",
    "game of life",
    "anthem",
    "time machine",
    "call of the wild",
    "secret garden",
    "princess of mars",
    "gods of mars",
    "science of getting rich",
    "swenska wetenskaps",
    "paxton's magazine of botany",
    "icones plantarum",
    "expédition dans",
    "archaeology of crete",
];

/// Words that rule a title out: newspapers, natural science, medicine.
pub const TITLE_EXCLUSIONS: &[&str] = &[
    "newspaper",
    "enterprise",
    "times",
    "gazette",
    "herald",
    "tribune",
    "diary of",
    "columbine",
    "massacre",
    "suicide",
    "lynch letter",
    "botany",
    "botanical",
    "horticulture",
    "flora",
    "plantarum",
    "pharmacopoeia",
    "toxicology",
    "anatomy",
    "physiology",
    "paxton",
    "swenska wetenskaps",
    "expédition dans",
    "telegraph",
    "chronicle",
    "blairmore",
    "wimpy kid",
];

/// First year of the punk era.
pub const ERA_START: i64 = 1974;

/// Catalog media types that are never zines.
const REJECTED_MEDIATYPES: &[&str] = &["audio"];

/// Catalog media types kept only when the description names zines or punk.
const SUSPECT_MEDIATYPES: &[&str] = &["software", "collection"];

/// Why a record was flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneReason {
    MediaType(String),
    Phrase(String),
    TitleExclusion(String),
    OutOfEra(i64),
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::MediaType(m) => write!(f, "mediatype {}", m),
            PruneReason::Phrase(p) => write!(f, "phrase '{}'", p),
            PruneReason::TitleExclusion(w) => write!(f, "title word '{}'", w),
            PruneReason::OutOfEra(y) => write!(f, "year {} outside era", y),
        }
    }
}

/// Screening tables.
#[derive(Debug, Clone)]
pub struct PruneRules {
    known_good: Vec<String>,
    phrases: Vec<String>,
    title_exclusions: Vec<String>,
    era_start: Option<i64>,
    era_end: Option<i64>,
    check_mediatype: bool,
}

impl PruneRules {
    /// Built-in tables with the era open-ended after [`ERA_START`].
    pub fn standard() -> Self {
        Self {
            known_good: normalize(KNOWN_SERIES.iter().map(|s| s.to_string())),
            phrases: normalize(FALSE_POSITIVE_PHRASES.iter().map(|s| s.to_string())),
            title_exclusions: normalize(TITLE_EXCLUSIONS.iter().map(|s| s.to_string())),
            era_start: Some(ERA_START),
            era_end: None,
            check_mediatype: true,
        }
    }

    /// Rules that flag nothing.
    pub fn none() -> Self {
        Self {
            known_good: Vec::new(),
            phrases: Vec::new(),
            title_exclusions: Vec::new(),
            era_start: None,
            era_end: None,
            check_mediatype: false,
        }
    }

    pub fn with_known_good(mut self, titles: impl IntoIterator<Item = String>) -> Self {
        self.known_good.extend(normalize(titles));
        self
    }

    pub fn with_phrases(mut self, phrases: impl IntoIterator<Item = String>) -> Self {
        self.phrases.extend(normalize(phrases));
        self
    }

    pub fn with_title_exclusions(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.title_exclusions.extend(normalize(words));
        self
    }

    pub fn with_era(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.era_start = start;
        self.era_end = end;
        self
    }

    /// `Some(reason)` when the record should be dropped.
    pub fn check(&self, record: &Record) -> Option<PruneReason> {
        let name = normalize_text(&record.name);
        if self.known_good.iter().any(|t| name.contains(t.as_str())) {
            return None;
        }
        let description = normalize_text(&record.description);

        if self.check_mediatype {
            if let Some(media) = record.mediatype().map(normalize_text) {
                if REJECTED_MEDIATYPES.contains(&media.as_str()) {
                    return Some(PruneReason::MediaType(media));
                }
                if SUSPECT_MEDIATYPES.contains(&media.as_str())
                    && !description.contains("zine")
                    && !description.contains("punk")
                {
                    return Some(PruneReason::MediaType(media));
                }
            }
        }

        let text = format!("{} {}", name, description);
        if let Some(p) = self.phrases.iter().find(|p| text.contains(p.as_str())) {
            return Some(PruneReason::Phrase(p.clone()));
        }
        if let Some(w) = self.title_exclusions.iter().find(|w| name.contains(w.as_str())) {
            return Some(PruneReason::TitleExclusion(w.clone()));
        }

        let year = record.year_text().and_then(|y| y.parse::<i64>().ok());
        if let Some(year) = year {
            let early = self.era_start.is_some_and(|s| year < s);
            let late = self.era_end.is_some_and(|e| year > e);
            if early || late {
                return Some(PruneReason::OutOfEra(year));
            }
        }
        None
    }
}

impl Default for PruneRules {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(tokens: impl IntoIterator<Item = String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| normalize_text(&t))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogMetadata;
    use serde_json::json;

    fn with_mediatype(mut rec: Record, media: &str) -> Record {
        let mut meta = CatalogMetadata::default();
        meta.extra.insert("mediatype".to_string(), json!(media));
        rec.catalog = Some(meta);
        rec
    }

    #[test]
    fn test_audio_mediatype_flagged() {
        let rec = with_mediatype(Record::new("A", "Punk rock interviews"), "audio");
        assert_eq!(
            PruneRules::standard().check(&rec),
            Some(PruneReason::MediaType("audio".to_string()))
        );
    }

    #[test]
    fn test_software_kept_when_description_mentions_zines() {
        let rules = PruneRules::standard();
        let mut rec = with_mediatype(Record::new("S", "DIY disk scans"), "software");
        assert!(rules.check(&rec).is_some());
        rec.description = "a zine archive on floppy".to_string();
        assert_eq!(rules.check(&rec), None);
    }

    #[test]
    fn test_phrase_in_description_flagged() {
        let mut rec = Record::new("L", "Punk classics vol 1");
        rec.description = "LibriVox recording".to_string();
        assert_eq!(
            PruneRules::standard().check(&rec),
            Some(PruneReason::Phrase("librivox".to_string()))
        );
    }

    #[test]
    fn test_title_exclusion_only_checks_name() {
        let rules = PruneRules::standard();
        let mut rec = Record::new("G", "Punk fanzine");
        rec.description = "reviewed in the local gazette".to_string();
        assert_eq!(rules.check(&rec), None);
        let rec = Record::new("G2", "Punk Gazette");
        assert_eq!(
            rules.check(&rec),
            Some(PruneReason::TitleExclusion("gazette".to_string()))
        );
    }

    #[test]
    fn test_year_outside_era() {
        let rules = PruneRules::standard();
        let mut rec = Record::new("Y", "Hardcore zine");
        rec.year = Some(json!("1962"));
        assert_eq!(rules.check(&rec), Some(PruneReason::OutOfEra(1962)));
        rec.year = Some(json!(2031));
        assert_eq!(rules.check(&rec), None);
        assert_eq!(
            rules.clone().with_era(Some(1974), Some(2025)).check(&rec),
            Some(PruneReason::OutOfEra(2031))
        );
        rec.year = Some(json!("circa 1980"));
        assert_eq!(rules.check(&rec), None);
    }

    #[test]
    fn test_known_series_never_flagged() {
        let mut rec = with_mediatype(Record::new("K", "Maximum Rocknroll Times"), "audio");
        rec.year = Some(json!(1950));
        assert_eq!(PruneRules::standard().check(&rec), None);
    }

    #[test]
    fn test_none_flags_nothing() {
        let mut rec = with_mediatype(Record::new("N", "Dracula gazette"), "audio");
        rec.year = Some(json!(1890));
        assert_eq!(PruneRules::none().check(&rec), None);
    }
}
