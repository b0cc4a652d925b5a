//! # Zine Curator Core
//!
//! Pure classification and entity-resolution logic for harvested zine
//! records: the record model, the probable-zine policy, false-positive
//! screening, identity-key extraction, authority ranking, and transitive
//! duplicate resolution.
//!
//! This crate performs no filesystem or process I/O. Image bytes for the
//! hash key are read through the [`image::ImageSource`] trait, which the
//! application implements over the local image cache.

pub mod classify;
pub mod image;
pub mod keys;
pub mod models;
pub mod prune;
pub mod rank;
pub mod resolve;
