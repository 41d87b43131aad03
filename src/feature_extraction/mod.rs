//! Feature extraction from the stream itself.
//!
//! - [`Agg`]: running group-by aggregate of one feature

pub mod agg;

pub use agg::{Agg, AggStat};
