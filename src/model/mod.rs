//! Online models used as the final stage of a pipeline.
//!
//! Models learn from one labelled sample at a time. Weights are sparse and
//! keyed by feature name, so new features can appear at any point in the
//! stream and start from a zero weight.

pub mod linear;

pub use linear::{
    LinearParams, LinearRegression, LinearRegressionConfig, LogisticRegression,
    LogisticRegressionConfig,
};
