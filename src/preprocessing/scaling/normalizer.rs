//! Normalizer - scales individual samples to unit norm.
//!
//! Each sample is rescaled independently of every other sample, so the
//! normalizer keeps no state. The norm is computed over the numeric features
//! only; other features pass through.
//!
//! Supports three norm types:
//! - L1: Sum of absolute values = 1
//! - L2 (default): Sum of squares = 1 (Euclidean norm)
//! - Max: Maximum absolute value = 1

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::preprocessing::safe_div;
use crate::stage::{impl_into_stage, Transformer};
use serde::{Deserialize, Serialize};

/// Type of normalization to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NormType {
    /// L1 norm: sum of absolute values = 1
    L1,
    /// L2 norm (Euclidean): sum of squares = 1
    #[default]
    L2,
    /// Max norm: maximum absolute value = 1
    Max,
}

/// Stateless per-sample normalizer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Normalizer {
    norm: NormType,
}

impl Normalizer {
    pub fn new(norm: NormType) -> Self {
        Self { norm }
    }

    fn norm_of(&self, x: &FeatureMap) -> f64 {
        let values = x.values().filter_map(FeatureValue::as_number);
        match self.norm {
            NormType::L1 => values.map(f64::abs).sum(),
            NormType::L2 => values.map(|v| v * v).sum::<f64>().sqrt(),
            NormType::Max => values.map(f64::abs).fold(0.0, f64::max),
        }
    }
}

impl Transformer for Normalizer {
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let norm = self.norm_of(x);
        Ok(x.iter()
            .map(|(name, value)| {
                let out = match value.as_number() {
                    Some(v) => FeatureValue::Number(safe_div(v, norm)),
                    None => value.clone(),
                };
                (name.clone(), out)
            })
            .collect())
    }
}

impl_into_stage!(Transformer: Normalizer);
