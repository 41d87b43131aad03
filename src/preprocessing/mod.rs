//! Online preprocessing transformers.
//!
//! Every transformer here implements [`Transformer`](crate::stage::Transformer):
//! `learn_one` updates running statistics from one unlabelled sample and
//! `transform_one` applies the current statistics without changing them.
//! Inside a [`Pipeline`](crate::compose::Pipeline) the two are driven by the
//! pipeline's dispatch rules, so a scaler keeps learning from every sample
//! that is sent through for a prediction.
//!
//! # Available Transformers
//!
//! ## Scaling
//! - [`StandardScaler`]: Z-score normalization
//! - [`MinMaxScaler`]: Scale to [0, 1]
//! - [`MaxAbsScaler`]: Scale by maximum absolute value
//! - [`Normalizer`]: Scale individual samples to unit norm
//!
//! ## Encoding
//! - [`OneHotEncoder`]: Indicator features for text and boolean values
//!
//! ## Feature engineering
//! - [`PolynomialExtender`]: Polynomial and interaction features

pub mod encoding;
pub mod feature_engineering;
pub mod scaling;

pub use encoding::OneHotEncoder;
pub use feature_engineering::PolynomialExtender;
pub use scaling::{
    MaxAbsScaler, MinMaxScaler, NormType, Normalizer, StandardScaler, StandardScalerConfig,
};

/// Division that yields `0` instead of `inf`/`NaN` for a zero denominator.
pub(crate) fn safe_div(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}
