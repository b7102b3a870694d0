//! mtir-relevance
//!
//! Converts raw retrieval scores into discrete relevance grades: max-scaling
//! normalization, interval construction (Fisher-Jenks natural breaks or a
//! single percentile cutoff), and the interval-to-grade lookup.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod binner;
pub mod jenks;
pub mod normalize;

pub use binner::RelevanceBinner;
pub use jenks::natural_breaks;
pub use normalize::normalize;
