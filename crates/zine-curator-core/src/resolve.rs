//! Duplicate resolution over the union of all identity keys.
//!
//! Two records are linked when they share a non-empty key of the same
//! [`KeyKind`]. Links are transitive: the resolver computes connected
//! components over all four key relations at once with a disjoint-set
//! forest, then keeps exactly one survivor per component, chosen by
//! [`rank::pick_survivor`](crate::rank::pick_survivor).
//!
//! # Algorithm
//!
//! 1. Extract [`IdentityKeys`] for every record.
//! 2. For each `(kind, key)`, union the record with the first record that
//!    carried the same pair.
//! 3. Group records by component root, ordered by their earliest member.
//! 4. For components of size ≥ 2, pick the survivor; every other member is
//!    removed as a duplicate of it.
//!
//! The survivor of a component depends only on the component's membership
//! and the original positions, never on which key linked whom first.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::image::ImageSource;
use crate::keys::{IdentityKeys, KeyKind};
use crate::models::Record;
use crate::rank::{pick_survivor, Candidate};

/// A record removed because another record in its component survived.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateRemoval {
    pub record: Record,
    pub survivor_id: String,
}

/// One equivalence class with at least two members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub survivor_id: String,
    /// Member ids in original order, survivor included.
    pub member_ids: Vec<String>,
    /// Key kinds that produced at least one link inside the group.
    pub linked_by: BTreeSet<KeyKind>,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Retained records in original order.
    pub survivors: Vec<Record>,
    /// Removed records in original order.
    pub duplicates: Vec<DuplicateRemoval>,
    /// Groups ordered by their earliest member.
    pub groups: Vec<DuplicateGroup>,
    /// Per key kind, how many records shared that key with an earlier record.
    pub key_matches: BTreeMap<KeyKind, usize>,
}

impl Resolution {
    pub fn key_match_count(&self, kind: KeyKind) -> usize {
        self.key_matches.get(&kind).copied().unwrap_or(0)
    }
}

/// Resolve duplicates, extracting keys with `images` for the hash key.
pub fn resolve<I: ImageSource + ?Sized>(records: Vec<Record>, images: &I) -> Resolution {
    let keys: Vec<IdentityKeys> = records
        .iter()
        .map(|r| IdentityKeys::extract(r, images))
        .collect();
    resolve_with_keys(records, &keys)
}

/// Resolve duplicates from precomputed keys. `keys[i]` belongs to `records[i]`.
///
/// # Panics
///
/// Panics if `keys` and `records` differ in length.
pub fn resolve_with_keys(records: Vec<Record>, keys: &[IdentityKeys]) -> Resolution {
    assert_eq!(
        records.len(),
        keys.len(),
        "one IdentityKeys entry per record"
    );
    let n = records.len();
    let mut forest = DisjointSet::new(n);
    let mut first_seen: HashMap<(KeyKind, &str), usize> = HashMap::new();
    let mut links: Vec<(usize, KeyKind)> = Vec::new();
    let mut key_matches: BTreeMap<KeyKind, usize> = BTreeMap::new();

    for (position, record_keys) in keys.iter().enumerate() {
        for (kind, key) in record_keys.iter() {
            match first_seen.entry((kind, key)) {
                Entry::Occupied(seen) => {
                    forest.union(*seen.get(), position);
                    links.push((position, kind));
                    *key_matches.entry(kind).or_insert(0) += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }
    }

    // Components in order of their earliest member.
    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut component_of: Vec<usize> = Vec::with_capacity(n);
    for position in 0..n {
        let root = forest.find(position);
        let index = *component_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[index].push(position);
        component_of.push(index);
    }

    let mut linked_by: Vec<BTreeSet<KeyKind>> = vec![BTreeSet::new(); components.len()];
    for (position, kind) in links {
        linked_by[component_of[position]].insert(kind);
    }

    let mut removed_by: Vec<Option<usize>> = vec![None; n];
    let mut groups = Vec::new();
    for (index, members) in components.iter().enumerate() {
        if members.len() < 2 {
            continue;
        }
        let survivor = pick_survivor(members.iter().map(|&p| Candidate::new(p, &records[p])))
            .map(|c| c.position)
            .unwrap_or(members[0]);
        for &member in members {
            if member != survivor {
                removed_by[member] = Some(survivor);
            }
        }
        groups.push(DuplicateGroup {
            survivor_id: records[survivor].id.clone(),
            member_ids: members.iter().map(|&p| records[p].id.clone()).collect(),
            linked_by: std::mem::take(&mut linked_by[index]),
        });
    }

    let survivor_ids: Vec<Option<String>> = removed_by
        .iter()
        .map(|s| s.map(|p| records[p].id.clone()))
        .collect();

    let mut survivors = Vec::with_capacity(n);
    let mut duplicates = Vec::new();
    for (record, survivor_id) in records.into_iter().zip(survivor_ids) {
        match survivor_id {
            Some(survivor_id) => duplicates.push(DuplicateRemoval {
                record,
                survivor_id,
            }),
            None => survivors.push(record),
        }
    }

    Resolution {
        survivors,
        duplicates,
        groups,
        key_matches,
    }
}

/// Disjoint-set forest with path halving and union by rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
