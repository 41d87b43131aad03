//! Online MaxAbs Scaler.
//!
//! Divides each numeric feature by the largest absolute value seen so far,
//! which maps the data into `[-1, 1]` without shifting it.

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::preprocessing::safe_div;
use crate::stage::{impl_into_stage, Transformer};
use crate::stats::{AbsMax, Univariate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Online MaxAbsScaler.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaxAbsScaler {
    abs_max: BTreeMap<String, AbsMax>,
}

impl MaxAbsScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_abs(&self, feature: &str) -> Option<f64> {
        self.abs_max.get(feature).map(|s| s.get())
    }
}

impl Transformer for MaxAbsScaler {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        for (name, value) in x {
            if let Some(v) = value.as_number() {
                self.abs_max.entry(name.clone()).or_default().update(v);
            }
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        Ok(x.iter()
            .map(|(name, value)| {
                let out = match value.as_number() {
                    Some(v) => FeatureValue::Number(safe_div(v, self.max_abs(name).unwrap_or(0.0))),
                    None => value.clone(),
                };
                (name.clone(), out)
            })
            .collect())
    }
}

impl_into_stage!(Transformer: MaxAbsScaler);
