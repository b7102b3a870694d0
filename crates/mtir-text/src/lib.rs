//! mtir-text
//!
//! Tantivy-backed implementation of the `SearchBackend` capability: one
//! index directory per collection name, destructive rebuilds, deterministic
//! ranked search and term-dictionary extraction.

pub mod backend;
pub mod tantivy_utils;

pub use backend::TantivyBackend;
