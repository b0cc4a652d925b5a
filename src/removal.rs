//! Manual removal of records by id or pattern.
//!
//! Rules come from `--ids a,b,c` and/or a rules file with one rule per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! id=SG003
//! url~archive.qzap.org/index.php/Detail/Object/Show/object_id/400
//! name~Not A Zine Title
//! https://example.org/bare/lines/with/slashes/are/url/rules
//! MRR432
//! ```
//!
//! `url~` is a case-sensitive substring of `archive_source`; `name~` is a
//! case-insensitive substring of the name. Removal goes through the same
//! confirm → backup → write → audit sequence as cleanup.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::warn;
use zine_curator_core::models::Record;

use crate::audit::{Removal, RemovalReason};
use crate::commit::commit;
use crate::config::Config;
use crate::confirm::Confirm;
use crate::store;

/// Number of matches listed in a dry run.
const PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalRule {
    Id(String),
    UrlContains(String),
    NameContains(String),
}

impl RemovalRule {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RemovalRule::Id(id) => record.id == *id,
            RemovalRule::UrlContains(fragment) => record
                .source_url
                .as_deref()
                .is_some_and(|u| u.contains(fragment.as_str())),
            RemovalRule::NameContains(fragment) => record
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
        }
    }
}

/// Parse a rules file. Empty rule values are rejected: they would match
/// every record.
pub fn parse_rules(text: &str) -> Result<Vec<RemovalRule>> {
    let mut rules = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let rule = if let Some(v) = line.strip_prefix("id=") {
            RemovalRule::Id(v.trim().to_string())
        } else if let Some(v) = line.strip_prefix("url~") {
            RemovalRule::UrlContains(v.trim().to_string())
        } else if let Some(v) = line.strip_prefix("name~") {
            RemovalRule::NameContains(v.trim().to_string())
        } else if line.contains("://") || line.contains('/') {
            RemovalRule::UrlContains(line.to_string())
        } else {
            RemovalRule::Id(line.to_string())
        };
        if rule_value(&rule).is_empty() {
            bail!("line {}: empty removal rule '{}'", lineno + 1, line);
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// Id rules from a comma-separated list. Blank entries are skipped.
pub fn rules_from_ids(ids: &str) -> Vec<RemovalRule> {
    ids.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| RemovalRule::Id(s.to_string()))
        .collect()
}

fn rule_value(rule: &RemovalRule) -> &str {
    match rule {
        RemovalRule::Id(v) | RemovalRule::UrlContains(v) | RemovalRule::NameContains(v) => v,
    }
}

/// Split records into kept and removed; a record is removed when any rule
/// matches it.
pub fn partition(records: Vec<Record>, rules: &[RemovalRule]) -> (Vec<Record>, Vec<Removal>) {
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = Vec::new();
    for record in records {
        if rules.iter().any(|r| r.matches(&record)) {
            removed.push(Removal {
                record,
                reason: RemovalReason::Manual,
            });
        } else {
            kept.push(record);
        }
    }
    (kept, removed)
}

/// Collect rules from `--ids` and `--file`.
pub fn collect_rules(ids: Option<&str>, file: Option<&Path>) -> Result<Vec<RemovalRule>> {
    let mut rules = Vec::new();
    if let Some(ids) = ids {
        rules.extend(rules_from_ids(ids));
    }
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        rules.extend(parse_rules(&text)?);
    }
    if rules.is_empty() {
        bail!("no removal rules given; pass --ids or --file");
    }
    Ok(rules)
}

#[derive(Debug, Clone)]
pub enum RemoveOutcome {
    DryRun { matched: usize },
    NothingMatched,
    Declined { matched: usize },
    Removed {
        removed: usize,
        backup: PathBuf,
        audit: PathBuf,
    },
}

/// CLI entry point for `zines remove`.
pub fn run_remove(
    config: &Config,
    rules: &[RemovalRule],
    dry_run: bool,
    confirm: &mut dyn Confirm,
) -> Result<RemoveOutcome> {
    let loaded = store::load(&config.store.path)?;
    let (kept, removed) = partition(loaded.document.records.clone(), rules);

    println!(
        "{} {} entries (keeping {}).",
        if dry_run { "Would remove" } else { "Removing" },
        removed.len(),
        kept.len()
    );
    for r in removed.iter().take(PREVIEW_LIMIT) {
        println!(
            "  - {} | {} | {}",
            r.record.id,
            r.record.name,
            r.record.source_url.as_deref().unwrap_or("-")
        );
    }
    if removed.len() > PREVIEW_LIMIT {
        println!("  ... and {} more", removed.len() - PREVIEW_LIMIT);
    }

    if dry_run {
        return Ok(RemoveOutcome::DryRun {
            matched: removed.len(),
        });
    }
    if removed.is_empty() {
        return Ok(RemoveOutcome::NothingMatched);
    }

    let question = format!("Proceed to remove {} entries?", removed.len());
    if !confirm.confirm(&question)? {
        warn!("manual removal declined; record store untouched");
        println!("Cancelled.");
        return Ok(RemoveOutcome::Declined {
            matched: removed.len(),
        });
    }

    let report = commit(&loaded, kept, &removed, &config.store.backup_dir, "remove")
        .with_context(|| format!("removal from {} failed", loaded.path.display()))?;
    println!("Backup saved: {}", report.backup.display());
    println!(
        "Removed {} entries. Log: {}",
        removed.len(),
        report.audit.display()
    );

    Ok(RemoveOutcome::Removed {
        removed: removed.len(),
        backup: report.backup,
        audit: report.audit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str, url: Option<&str>) -> Record {
        let mut r = Record::new(id, name);
        r.source_url = url.map(str::to_string);
        r
    }

    #[test]
    fn test_parse_rules_formats() {
        let text = "\
# header
id=SG003

url~archive.qzap.org/object_id/400
name~Not A Zine
https://example.org/x
MRR432
";
        let rules = parse_rules(text).unwrap();
        assert_eq!(
            rules,
            vec![
                RemovalRule::Id("SG003".to_string()),
                RemovalRule::UrlContains("archive.qzap.org/object_id/400".to_string()),
                RemovalRule::NameContains("Not A Zine".to_string()),
                RemovalRule::UrlContains("https://example.org/x".to_string()),
                RemovalRule::Id("MRR432".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_rule_rejected() {
        let err = parse_rules("id=A\nname~   \n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_rules_from_ids() {
        assert_eq!(
            rules_from_ids(" A, ,B "),
            vec![RemovalRule::Id("A".to_string()), RemovalRule::Id("B".to_string())]
        );
    }

    #[test]
    fn test_partition_by_rules() {
        let records = vec![
            rec("A", "Flipside", Some("https://e.org/a")),
            rec("B", "NOT A ZINE at all", None),
            rec("C", "Cometbus", Some("https://qzap.org/object_id/400")),
            rec("D", "Punk Planet", None),
        ];
        let rules = vec![
            RemovalRule::Id("A".to_string()),
            RemovalRule::NameContains("not a zine".to_string()),
            RemovalRule::UrlContains("object_id/400".to_string()),
        ];
        let (kept, removed) = partition(records, &rules);
        assert_eq!(kept.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["D"]);
        assert_eq!(removed.len(), 3);
        assert!(removed.iter().all(|r| r.reason == RemovalReason::Manual));
    }

    #[test]
    fn test_url_rule_is_case_sensitive() {
        let r = rec("A", "x", Some("https://E.org/A"));
        assert!(!RemovalRule::UrlContains("e.org/a".to_string()).matches(&r));
        assert!(RemovalRule::UrlContains("E.org/A".to_string()).matches(&r));
    }

    #[test]
    fn test_collect_rules_requires_some() {
        assert!(collect_rules(None, None).is_err());
        assert_eq!(collect_rules(Some("A"), None).unwrap().len(), 1);
    }
}
