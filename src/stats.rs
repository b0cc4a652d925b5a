//! Record store statistics.
//!
//! A quick summary of what the store holds: record counts, the metadata
//! block's `total_entries`, source-type distribution, and how many records
//! carry catalog identifiers or locally cached images. Used by `zines stats`.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use zine_curator_core::models::Record;

use crate::config::Config;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub total_entries: Option<u64>,
    /// Raw `source_type` strings; records without one count as `unknown`.
    pub source_types: BTreeMap<String, usize>,
    pub local_images: usize,
    pub remote_images: usize,
    pub catalog_identifiers: usize,
    pub store_bytes: u64,
}

pub fn compute_stats(records: &[Record], total_entries: Option<u64>, store_bytes: u64) -> StoreStats {
    let mut source_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut local_images = 0;
    let mut remote_images = 0;
    let mut catalog_identifiers = 0;

    for record in records {
        let source = record
            .source_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown");
        *source_types.entry(source.to_string()).or_insert(0) += 1;

        match record.image_location.as_deref().map(str::trim) {
            Some(loc) if !loc.is_empty() => {
                if record.has_local_image() {
                    local_images += 1;
                } else {
                    remote_images += 1;
                }
            }
            _ => {}
        }

        if record.catalog_identifier().is_some() {
            catalog_identifiers += 1;
        }
    }

    StoreStats {
        records: records.len(),
        total_entries,
        source_types,
        local_images,
        remote_images,
        catalog_identifiers,
        store_bytes,
    }
}

/// Run the stats command: load the store and print a summary.
pub fn run_stats(config: &Config) -> Result<StoreStats> {
    let loaded = store::load(&config.store.path)?;
    let stats = compute_stats(
        &loaded.document.records,
        loaded.document.metadata.total_entries(),
        loaded.bytes.len() as u64,
    );

    println!("Zine Curator: Store Stats");
    println!("==========================");
    println!();
    println!("  Store:          {}", config.store.path.display());
    println!("  Size:           {}", format_bytes(stats.store_bytes));
    println!();
    println!("  Records:        {}", stats.records);
    match stats.total_entries {
        Some(n) if n as usize == stats.records => println!("  total_entries:  {}", n),
        Some(n) => println!("  total_entries:  {} (stale)", n),
        None => println!("  total_entries:  (missing)"),
    }
    println!("  Catalog ids:    {}", stats.catalog_identifiers);
    println!(
        "  Images:         {} local, {} remote",
        stats.local_images, stats.remote_images
    );

    if !stats.source_types.is_empty() {
        println!();
        println!("  By source type:");
        println!("  {:<24} {:>6} {:>7}", "SOURCE", "COUNT", "SHARE");
        println!("  {}", "-".repeat(40));
        let mut rows: Vec<(&String, &usize)> = stats.source_types.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (source, count) in rows {
            println!(
                "  {:<24} {:>6} {:>6.1}%",
                source,
                count,
                (*count as f64 / stats.records as f64) * 100.0
            );
        }
    }
    println!();

    Ok(stats)
}

/// Byte count scaled to the largest unit that keeps it at or above one.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
