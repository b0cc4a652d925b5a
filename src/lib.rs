//! # Zine Curator
//!
//! Cleanup tooling for a harvested punk-zine record store.
//!
//! Records arrive from several archives (Internet Archive, IIIF manifests,
//! photo-sharing sites, small institutional archives) and pile up in one
//! JSON document. Zine Curator decides which records are probable zines,
//! groups records that describe the same item, keeps the most authoritative
//! copy of each group, and rewrites the store behind a verified backup and
//! an audit log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Record store │──▶│  Classifier  │──▶│   Resolver   │
//! │    (JSON)    │   │ rule cascade │   │  union-find  │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!        ▲                                     │
//!        │           ┌──────────────┐          │
//!        └───────────│    Commit    │◀─────────┘
//!                    │ backup+audit │
//!                    └──────────────┘
//! ```
//!
//! Classification, key extraction, ranking and resolution live in the pure
//! `zine-curator-core` crate. This crate adds the store format, filesystem
//! images, backups, audit logs, confirmation and the `zines` CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! zines analyze                 # report what a cleanup would do
//! zines apply                   # back up, clean, write, log
//! zines remove --ids SG003      # drop specific records
//! zines stats                   # store overview
//! zines explain SG003           # why a record is (not) a zine
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`store`] | Record store load/save |
//! | [`images`] | Filesystem image source for hash keys |
//! | [`cleanup`] | Analyze and apply the cleanup pipeline |
//! | [`removal`] | Manual removal by id or pattern |
//! | [`commit`] | Backup, write, audit sequence |
//! | [`backup`] | Verified store backups |
//! | [`audit`] | Removal audit logs |
//! | [`confirm`] | Yes/no confirmation |
//! | [`stats`] | Store statistics |
//! | [`explain`] | Per-record classification breakdown |
//! | [`error`] | Store error type |

pub mod audit;
pub mod backup;
pub mod cleanup;
pub mod commit;
pub mod config;
pub mod confirm;
pub mod error;
pub mod explain;
pub mod images;
pub mod removal;
pub mod stats;
pub mod store;
