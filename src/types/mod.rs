//! Shared data structures for OEE analysis
//!
//! - `records`: raw status / production / quality samples and time windows
//! - `oee`: derived buckets, ratios, stop events, waterfall steps and timeline points

mod oee;
mod records;

pub use oee::*;
pub use records::*;
