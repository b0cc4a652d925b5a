//! Classification and duplicate cleanup of the record store.
//!
//! Coordinates the full flow: load → classify → screen accepted records for
//! known false positives → resolve duplicates among the rest → report, and in
//! apply mode → confirm → backup → write → audit log. Analysis never touches
//! persisted state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use zine_curator_core::classify::{Classification, Policy};
use zine_curator_core::image::ImageSource;
use zine_curator_core::keys::KeyKind;
use zine_curator_core::models::Record;
use zine_curator_core::prune::PruneRules;
use zine_curator_core::resolve::{resolve, DuplicateGroup};

use crate::audit::{Removal, RemovalReason};
use crate::commit::commit;
use crate::config::Config;
use crate::confirm::Confirm;
use crate::images::FsImages;
use crate::store;

/// Number of removals listed per section in the human report.
const REPORT_SAMPLE: usize = 20;

/// The computed outcome of a cleanup, before anything is persisted.
#[derive(Debug, Clone)]
pub struct CleanupPlan {
    pub original_count: usize,
    /// Records that passed classification and screening.
    pub probable_count: usize,
    /// Records to keep, in original order.
    pub retained: Vec<Record>,
    /// Non-zines first, then screened false positives, then duplicates, each
    /// in original order.
    pub removals: Vec<Removal>,
    pub groups: Vec<DuplicateGroup>,
    pub key_matches: BTreeMap<KeyKind, usize>,
    /// Classification of each non-zine, aligned with the non-zine removals.
    pub rejections: Vec<Classification>,
}

impl CleanupPlan {
    /// Classifier rejections plus screened false positives.
    pub fn non_zine_count(&self) -> usize {
        self.rejections.len() + self.false_positive_count()
    }

    pub fn false_positive_count(&self) -> usize {
        self.removals
            .iter()
            .filter(|r| matches!(r.reason, RemovalReason::FalsePositive(_)))
            .count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.removals.len() - self.non_zine_count()
    }

    pub fn summary(&self) -> CleanupSummary {
        CleanupSummary {
            total: self.original_count,
            probable_zines: self.probable_count,
            non_zines: self.non_zine_count(),
            false_positives: self.false_positive_count(),
            duplicate_groups: self.groups.len(),
            duplicates: self.duplicate_count(),
            removed: self.removals.len(),
            remaining: self.retained.len(),
            key_matches: KeyKind::ALL
                .into_iter()
                .map(|k| (k.label().to_string(), self.key_matches.get(&k).copied().unwrap_or(0)))
                .collect(),
        }
    }
}

/// Counts reported by analyze and apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub total: usize,
    pub probable_zines: usize,
    pub non_zines: usize,
    /// The part of `non_zines` flagged by false-positive screening.
    pub false_positives: usize,
    pub duplicate_groups: usize,
    pub duplicates: usize,
    pub removed: usize,
    pub remaining: usize,
    /// Records sharing each key kind with an earlier record.
    pub key_matches: BTreeMap<String, usize>,
}

/// Classify `records`, screen the accepted ones, then resolve duplicates
/// among what is left.
pub fn plan_cleanup<I: ImageSource + ?Sized>(
    records: Vec<Record>,
    policy: &Policy,
    screen: &PruneRules,
    images: &I,
) -> CleanupPlan {
    let original_count = records.len();

    let mut probable = Vec::with_capacity(records.len());
    let mut non_zines = Vec::new();
    let mut rejections = Vec::new();
    let mut false_positives = Vec::new();
    for record in records {
        let classification = policy.classify(&record);
        if classification.is_zine {
            match screen.check(&record) {
                Some(why) => {
                    debug!(id = %record.id, reason = %why, "screened out as false positive");
                    false_positives.push(Removal {
                        record,
                        reason: RemovalReason::FalsePositive(why),
                    });
                }
                None => probable.push(record),
            }
        } else {
            debug!(id = %record.id, rule = %classification.rule, "rejected as non-zine");
            non_zines.push(Removal {
                record,
                reason: RemovalReason::NonZine,
            });
            rejections.push(classification);
        }
    }
    let probable_count = probable.len();

    let resolution = resolve(probable, images);
    for group in &resolution.groups {
        debug!(
            survivor = %group.survivor_id,
            members = group.member_ids.len(),
            linked_by = ?group.linked_by,
            "duplicate group resolved"
        );
    }

    let mut removals = non_zines;
    removals.extend(false_positives);
    removals.extend(resolution.duplicates.into_iter().map(|d| Removal {
        record: d.record,
        reason: RemovalReason::DuplicateOf(d.survivor_id),
    }));

    CleanupPlan {
        original_count,
        probable_count,
        retained: resolution.survivors,
        removals,
        groups: resolution.groups,
        key_matches: resolution.key_matches,
        rejections,
    }
}

/// Load the configured store and compute its cleanup plan.
pub fn plan_from_store(config: &Config) -> Result<(store::LoadedStore, CleanupPlan)> {
    let loaded = store::load(&config.store.path)?;
    let images = FsImages::new(config.image_root());
    let plan = plan_cleanup(
        loaded.document.records.clone(),
        &config.policy(),
        &config.prune_rules(),
        &images,
    );
    Ok((loaded, plan))
}

/// CLI entry point for `zines analyze`. No side effects on persisted state.
pub fn run_analyze(config: &Config, json: bool) -> Result<CleanupSummary> {
    let (_, plan) = plan_from_store(config)?;
    let summary = plan.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_plan(&plan);
    }
    Ok(summary)
}

/// Outcome of an apply run.
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// Confirmation was declined; nothing was written.
    Declined(CleanupSummary),
    /// Nothing to remove and the metadata count already matches.
    Unchanged(CleanupSummary),
    Applied {
        summary: CleanupSummary,
        backup: PathBuf,
        audit: PathBuf,
    },
}

/// CLI entry point for `zines apply`.
pub fn run_apply(config: &Config, confirm: &mut dyn Confirm) -> Result<ApplyOutcome> {
    let (loaded, plan) = plan_from_store(config)?;
    let summary = plan.summary();
    print_plan(&plan);

    let count_current =
        loaded.document.metadata.total_entries() == Some(loaded.document.records.len() as u64);
    if plan.removals.is_empty() && count_current {
        println!();
        println!("Nothing to remove.");
        return Ok(ApplyOutcome::Unchanged(summary));
    }

    println!();
    let question = format!(
        "Remove {} non-zines and {} duplicates from {}?",
        summary.non_zines,
        summary.duplicates,
        loaded.path.display()
    );
    if !confirm.confirm(&question)? {
        warn!("cleanup declined; record store untouched");
        println!("Cancelled.");
        return Ok(ApplyOutcome::Declined(summary));
    }

    let report = commit(
        &loaded,
        plan.retained,
        &plan.removals,
        &config.store.backup_dir,
        "apply",
    )
    .with_context(|| format!("cleanup of {} failed", loaded.path.display()))?;
    info!(removed = summary.removed, remaining = report.remaining, "cleanup applied");

    println!();
    println!("=== CLEANUP COMPLETE ===");
    println!("  backup:             {}", report.backup.display());
    println!("  removed non-zines:  {}", summary.non_zines);
    println!("  removed duplicates: {}", summary.duplicates);
    println!("  remaining entries:  {}", report.remaining);
    println!("  audit log:          {}", report.audit.display());

    Ok(ApplyOutcome::Applied {
        summary,
        backup: report.backup,
        audit: report.audit,
    })
}

fn print_plan(plan: &CleanupPlan) {
    let summary = plan.summary();
    println!("=== ANALYSIS ===");
    println!("  {:<20} {:>6}", "total records", summary.total);
    println!("  {:<20} {:>6}", "probable zines", summary.probable_zines);
    println!("  {:<20} {:>6}", "non-zines", summary.non_zines);
    println!("    {:<18} {:>6}", "false positives", summary.false_positives);
    println!("  {:<20} {:>6}", "duplicate groups", summary.duplicate_groups);
    println!("  {:<20} {:>6}", "duplicates", summary.duplicates);
    for kind in KeyKind::ALL {
        println!(
            "    {:<18} {:>6}",
            format!("shared {} key", kind),
            plan.key_matches.get(&kind).copied().unwrap_or(0)
        );
    }
    println!("  {:<20} {:>6}", "total removed", summary.removed);
    println!("  {:<20} {:>6}", "remaining", summary.remaining);

    let non_zines = plan
        .removals
        .iter()
        .filter(|r| r.reason == RemovalReason::NonZine)
        .zip(&plan.rejections);
    if plan.non_zine_count() > 0 {
        println!();
        println!("Non-zines:");
        for (removal, classification) in non_zines.take(REPORT_SAMPLE) {
            let detail = match &classification.matched {
                Some(token) => format!("{} '{}'", classification.rule, token),
                None => classification.rule.to_string(),
            };
            println!("  {:<16} {:<48} [{}]", removal.record.id, truncate(&removal.record.name, 48), detail);
        }
        if plan.non_zine_count() > REPORT_SAMPLE {
            println!("  ... and {} more", plan.non_zine_count() - REPORT_SAMPLE);
        }
    }

    if plan.false_positive_count() > 0 {
        println!();
        println!("False positives:");
        let flagged = plan.removals.iter().filter_map(|r| match &r.reason {
            RemovalReason::FalsePositive(why) => Some((r, why)),
            _ => None,
        });
        for (removal, why) in flagged.take(REPORT_SAMPLE) {
            println!("  {:<16} {:<48} [{}]", removal.record.id, truncate(&removal.record.name, 48), why);
        }
        if plan.false_positive_count() > REPORT_SAMPLE {
            println!("  ... and {} more", plan.false_positive_count() - REPORT_SAMPLE);
        }
    }

    if !plan.groups.is_empty() {
        println!();
        println!("Duplicate groups (survivor <- removed):");
        for group in plan.groups.iter().take(REPORT_SAMPLE) {
            let removed: Vec<&str> = group
                .member_ids
                .iter()
                .filter(|id| **id != group.survivor_id)
                .map(String::as_str)
                .collect();
            let kinds: Vec<&str> = group.linked_by.iter().map(|k| k.label()).collect();
            println!(
                "  {} <- {}  [{}]",
                group.survivor_id,
                removed.join(", "),
                kinds.join(",")
            );
        }
        if plan.groups.len() > REPORT_SAMPLE {
            println!("  ... and {} more", plan.groups.len() - REPORT_SAMPLE);
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars - 1).collect();
        out.push('…');
        out
    }
}
