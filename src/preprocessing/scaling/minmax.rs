//! Online Min-Max Scaler.
//!
//! Scales each numeric feature to `[0, 1]` using the running minimum and
//! maximum: `(x - min) / (max - min)`. Values outside the range seen so far
//! map outside `[0, 1]`.

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::preprocessing::safe_div;
use crate::stage::{impl_into_stage, Transformer};
use crate::stats::{Max, Min, Univariate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Range {
    min: Min,
    max: Max,
}

/// Online MinMaxScaler.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MinMaxScaler {
    ranges: BTreeMap<String, Range>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Running `(min, max)` of a feature.
    pub fn range(&self, feature: &str) -> Option<(f64, f64)> {
        self.ranges
            .get(feature)
            .map(|r| (r.min.get(), r.max.get()))
    }
}

impl Transformer for MinMaxScaler {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        for (name, value) in x {
            if let Some(v) = value.as_number() {
                let range = self.ranges.entry(name.clone()).or_default();
                range.min.update(v);
                range.max.update(v);
            }
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        Ok(x.iter()
            .map(|(name, value)| {
                let out = match (value.as_number(), self.ranges.get(name)) {
                    (Some(v), Some(r)) => {
                        let (min, max) = (r.min.get(), r.max.get());
                        FeatureValue::Number(safe_div(v - min, max - min))
                    }
                    (Some(_), None) => FeatureValue::Number(0.0),
                    (None, _) => value.clone(),
                };
                (name.clone(), out)
            })
            .collect())
    }
}

impl_into_stage!(Transformer: MinMaxScaler);
