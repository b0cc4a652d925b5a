//! Authority ranking among duplicate records.
//!
//! Criteria, earlier dominating later:
//!
//! 1. Source type rank (catalog > manifest-archive > photo-sharing > other-archive > unknown).
//! 2. A resolved catalog item URL is present.
//! 3. A non-empty year is present.
//! 4. The image is cached locally.
//! 5. Earlier position in the original record order.
//!
//! Criteria 1–4 form [`Authority`], compared lexicographically. Positions are
//! unique within a record set, so `(Authority, Reverse(position))` is a total
//! order and pairwise reduction over a group yields the same winner in any
//! comparison order.

use std::cmp::Ordering;

use crate::models::Record;

/// Comparable authority signals of one record. Greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Authority {
    source_rank: u8,
    catalog_item_url: bool,
    year: bool,
    local_image: bool,
}

impl Authority {
    pub fn of(record: &Record) -> Self {
        Self {
            source_rank: record.source_kind().authority(),
            catalog_item_url: record.has_catalog_item_url(),
            year: record.year_text().is_some(),
            local_image: record.has_local_image(),
        }
    }
}

/// A record paired with its position in the original iteration order.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub position: usize,
    pub record: &'a Record,
}

impl<'a> Candidate<'a> {
    pub fn new(position: usize, record: &'a Record) -> Self {
        Self { position, record }
    }
}

/// Order candidates by authority, then by earlier position.
///
/// `Greater` means `a` should be kept over `b`.
pub fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    Authority::of(a.record)
        .cmp(&Authority::of(b.record))
        .then_with(|| b.position.cmp(&a.position))
}

/// The better of two candidates.
pub fn pick_better<'a>(a: Candidate<'a>, b: Candidate<'a>) -> Candidate<'a> {
    match compare(&a, &b) {
        Ordering::Less => b,
        Ordering::Greater | Ordering::Equal => a,
    }
}

/// Pairwise-reduce a group to its single survivor. `None` for an empty group.
pub fn pick_survivor<'a, I>(candidates: I) -> Option<Candidate<'a>>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    candidates.into_iter().reduce(pick_better)
}
