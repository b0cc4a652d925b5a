//! Probable-zine classification.
//!
//! Classification is an ordered rule cascade held in a [`Policy`]. The
//! first rule whose matcher fires decides the verdict; later rules are never
//! consulted. The order is fixed by [`Policy::from_tables`]:
//!
//! 1. **Known series**: the normalized name contains an allowlisted title → zine.
//! 2. **Positive evidence**: name + description contain a domain token → zine.
//! 3. **Negative evidence**: name + description contain a non-zine media token → not a zine.
//! 4. **Issue numbering**: `issue_number` is set or the name carries a numbering marker → zine.
//! 5. **Default** → not a zine.
//!
//! The allowlist runs before the negative set so that a verified title such
//! as "Sniffin' Glue" survives a description mentioning "newspaper".
//!
//! # Example
//!
//! ```rust
//! use zine_curator_core::classify::{is_probable_zine, Policy, RuleKind};
//! use zine_curator_core::models::Record;
//!
//! let mut rec = Record::new("SG003", "Sniffin' Glue #3");
//! rec.description = "scanned from a newspaper clipping".to_string();
//! assert!(is_probable_zine(&rec));
//! assert_eq!(Policy::standard().classify(&rec).rule, RuleKind::KnownSeries);
//! ```

use std::fmt;
use std::sync::OnceLock;

use crate::models::Record;

/// Titles verified in advance as zine series.
pub const KNOWN_SERIES: &[&str] = &[
    "maximum rocknroll",
    "punk planet",
    "cometbus",
    "slug & lettuce",
    "slug and lettuce",
    "forced exposure",
    "touch and go",
    "flipside",
    "search & destroy",
    "sniffin' glue",
    "chainsaw",
    "ripped & torn",
    "kill your pet puppy",
    "jamming",
    "el zine",
    "heartattack",
    "we got power",
    "profane existence",
    "no mag",
    "damage",
    "bikini kill",
    "book your own fuckin' life",
    "riot grrrl",
    "your flesh",
    "girl germs",
    "clit rocket",
];

/// Domain words that indicate zine content.
pub const POSITIVE_TOKENS: &[&str] = &[
    "zine",
    "fanzine",
    "punk",
    "riot grrrl",
    "queercore",
    "hardcore",
    "diy",
    "issue",
    "no.",
    "numero",
    "nummer",
    "núm",
    "nº",
    "n°",
];

/// Content-type words for media that are rarely zines.
pub const NEGATIVE_TOKENS: &[&str] = &[
    "flyer",
    "poster",
    "postcard",
    "ticket",
    "press release",
    "program",
    "newspaper",
    "microfilm",
    "microfiche",
    "map",
    "drawing",
    "blueprint",
    "minutes",
    "meeting",
    "newsletter archive",
    "course",
    "syllabus",
    "capstone",
    "yearbook",
    "brochure",
    "directory",
    "newspaperissue",
    "music event",
];

/// Which rule in the cascade decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    KnownSeries,
    PositiveEvidence,
    NegativeEvidence,
    IssueNumbering,
    Default,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::KnownSeries => "known-series",
            RuleKind::PositiveEvidence => "positive-evidence",
            RuleKind::NegativeEvidence => "negative-evidence",
            RuleKind::IssueNumbering => "issue-numbering",
            RuleKind::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Any token is a substring of the normalized name.
    NameContainsAny(Vec<String>),
    /// Any token is a substring of the normalized evidence text.
    TextContainsAny(Vec<String>),
    IssueNumbering,
    Always,
}

/// One `(predicate, verdict)` entry of the policy table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: RuleKind,
    pub verdict: bool,
    matcher: Matcher,
}

impl Rule {
    /// Tokens this rule matches on; empty for structural rules.
    pub fn tokens(&self) -> &[String] {
        match &self.matcher {
            Matcher::NameContainsAny(t) | Matcher::TextContainsAny(t) => t,
            Matcher::IssueNumbering | Matcher::Always => &[],
        }
    }

    fn evaluate(&self, input: &Evidence<'_>) -> Option<Option<String>> {
        match &self.matcher {
            Matcher::NameContainsAny(tokens) => first_contained(&input.name, tokens).map(Some),
            Matcher::TextContainsAny(tokens) => first_contained(&input.text, tokens).map(Some),
            Matcher::IssueNumbering => {
                if input.record.issue_text().is_some() || has_numbering_marker(&input.name) {
                    Some(None)
                } else {
                    None
                }
            }
            Matcher::Always => Some(None),
        }
    }
}

/// Outcome of running a record through the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_zine: bool,
    pub rule: RuleKind,
    /// The token that fired, for token-matching rules.
    pub matched: Option<String>,
}

/// Token tables a [`Policy`] is built from.
#[derive(Debug, Clone, Default)]
pub struct PolicyTables {
    pub series: Vec<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    /// Include tags in the evidence text. Off by default: harvesters stamp
    /// "punk" and "zine" tags on everything they import.
    pub use_tags: bool,
}

impl PolicyTables {
    /// The built-in tables.
    pub fn standard() -> Self {
        Self {
            series: to_owned(KNOWN_SERIES),
            positive: to_owned(POSITIVE_TOKENS),
            negative: to_owned(NEGATIVE_TOKENS),
            use_tags: false,
        }
    }
}

/// Ordered classification policy.
#[derive(Debug, Clone)]
pub struct Policy {
    rules: Vec<Rule>,
    use_tags: bool,
}

impl Policy {
    /// Build the cascade from token tables. Tokens are lower-cased; blank
    /// tokens are dropped.
    pub fn from_tables(tables: PolicyTables) -> Self {
        let rules = vec![
            Rule {
                kind: RuleKind::KnownSeries,
                verdict: true,
                matcher: Matcher::NameContainsAny(normalize_tokens(tables.series)),
            },
            Rule {
                kind: RuleKind::PositiveEvidence,
                verdict: true,
                matcher: Matcher::TextContainsAny(normalize_tokens(tables.positive)),
            },
            Rule {
                kind: RuleKind::NegativeEvidence,
                verdict: false,
                matcher: Matcher::TextContainsAny(normalize_tokens(tables.negative)),
            },
            Rule {
                kind: RuleKind::IssueNumbering,
                verdict: true,
                matcher: Matcher::IssueNumbering,
            },
            Rule {
                kind: RuleKind::Default,
                verdict: false,
                matcher: Matcher::Always,
            },
        ];
        Self {
            rules,
            use_tags: tables.use_tags,
        }
    }

    /// The policy built from the built-in tables.
    pub fn standard() -> Self {
        Self::from_tables(PolicyTables::standard())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the cascade. Total: the final rule always fires.
    pub fn classify(&self, record: &Record) -> Classification {
        let evidence = Evidence::new(record, self.use_tags);
        for rule in &self.rules {
            if let Some(matched) = rule.evaluate(&evidence) {
                return Classification {
                    is_zine: rule.verdict,
                    rule: rule.kind,
                    matched,
                };
            }
        }
        Classification {
            is_zine: false,
            rule: RuleKind::Default,
            matched: None,
        }
    }

    pub fn is_probable_zine(&self, record: &Record) -> bool {
        self.classify(record).is_zine
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classify with the built-in policy.
pub fn is_probable_zine(record: &Record) -> bool {
    static STANDARD: OnceLock<Policy> = OnceLock::new();
    STANDARD.get_or_init(Policy::standard).is_probable_zine(record)
}

struct Evidence<'a> {
    record: &'a Record,
    name: String,
    text: String,
}

impl<'a> Evidence<'a> {
    fn new(record: &'a Record, use_tags: bool) -> Self {
        let name = normalize_text(&record.name);
        let mut text = format!("{} {}", name, normalize_text(&record.description));
        if use_tags {
            for tag in &record.tags {
                text.push(' ');
                text.push_str(&normalize_text(tag));
            }
        }
        Self { record, name, text }
    }
}

/// Lower-case, trim, and fold typographic apostrophes.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

fn normalize_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| normalize_text(&t))
        .filter(|t| !t.is_empty())
        .collect()
}

fn to_owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn first_contained(haystack: &str, tokens: &[String]) -> Option<String> {
    tokens
        .iter()
        .find(|t| haystack.contains(t.as_str()))
        .cloned()
}

/// Numbering markers in a normalized name: the words `issue` or `no`,
/// `#` followed by a digit, or `vol`/`volume` followed by a number.
fn has_numbering_marker(name: &str) -> bool {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.iter().any(|w| *w == "issue" || *w == "no") {
        return true;
    }
    let volume_numbered = words.windows(2).any(|pair| {
        (pair[0] == "vol" || pair[0] == "volume") && pair[1].chars().all(|c| c.is_ascii_digit())
    });
    if volume_numbered {
        return true;
    }
    name.match_indices('#').any(|(i, _)| {
        name[i + 1..]
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}
