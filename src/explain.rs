//! Per-record classification and key breakdown.
//!
//! `zines explain <id>` shows which classifier rule decided a record,
//! whether false-positive screening flags it, and the four identity keys it
//! would be grouped by.

use anyhow::{bail, Result};
use zine_curator_core::classify::Classification;
use zine_curator_core::keys::{IdentityKeys, KeyKind};
use zine_curator_core::models::Record;
use zine_curator_core::prune::PruneReason;
use zine_curator_core::rank::Authority;

use crate::config::Config;
use crate::images::FsImages;
use crate::store;

#[derive(Debug, Clone)]
pub struct Explanation {
    pub record: Record,
    pub classification: Classification,
    /// Only computed for records the classifier accepts.
    pub screening: Option<PruneReason>,
    pub keys: IdentityKeys,
    pub authority: Authority,
}

pub fn explain_record(config: &Config, id: &str) -> Result<Explanation> {
    let loaded = store::load(&config.store.path)?;
    let record = match loaded.document.find(id) {
        Some(r) => r.clone(),
        None => bail!("record not found: {}", id),
    };
    let images = FsImages::new(config.image_root());
    let classification = config.policy().classify(&record);
    let screening = if classification.is_zine {
        config.prune_rules().check(&record)
    } else {
        None
    };
    Ok(Explanation {
        classification,
        screening,
        keys: IdentityKeys::extract(&record, &images),
        authority: Authority::of(&record),
        record,
    })
}

/// CLI entry point for `zines explain <id>`.
pub fn run_explain(config: &Config, id: &str) -> Result<()> {
    let e = explain_record(config, id)?;

    println!("--- Record ---");
    println!("id:           {}", e.record.id);
    println!("name:         {}", e.record.name);
    println!("source_type:  {}", e.record.source_kind().label());
    if let Some(ref url) = e.record.source_url {
        println!("source_url:   {}", url);
    }
    if let Some(ref image) = e.record.image_location {
        println!("image:        {}", image);
    }
    println!();

    println!("--- Classification ---");
    println!(
        "verdict:      {}",
        if e.classification.is_zine { "probable zine" } else { "non-zine" }
    );
    println!("rule:         {}", e.classification.rule);
    if let Some(ref token) = e.classification.matched {
        println!("matched:      '{}'", token);
    }
    if let Some(ref why) = e.screening {
        println!("screened out: {}", why);
    }
    println!();

    println!("--- Identity keys ---");
    for kind in KeyKind::ALL {
        println!("{:<13} {}", format!("{}:", kind), e.keys.get(kind).unwrap_or("-"));
    }
    println!();
    println!("--- Authority ---");
    println!("{:?}", e.authority);

    Ok(())
}
