//! Scaling transformers for feature normalization.
//!
//! Every scaler keeps running statistics per feature and updates them one
//! sample at a time.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`StandardScaler`] | Z-score with running mean and variance |
//! | [`MinMaxScaler`] | Scale to [0, 1] with running min and max |
//! | [`MaxAbsScaler`] | Scale by running max absolute value |
//! | [`Normalizer`] | Scale individual samples to unit norm (stateless) |

pub mod maxabs;
pub mod minmax;
pub mod normalizer;
pub mod standard;

pub use maxabs::MaxAbsScaler;
pub use minmax::MinMaxScaler;
pub use normalizer::{NormType, Normalizer};
pub use standard::{StandardScaler, StandardScalerConfig};
