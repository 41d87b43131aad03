//! Online one-hot encoding for categorical features.
//!
//! Text and boolean features are expanded into one indicator feature per
//! category, named `<feature>_<category>`. Categories are learnt on the fly,
//! so the output grows as new categories appear in the stream.

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::stage::{impl_into_stage, Transformer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One-hot encoder for categorical features.
///
/// With `sparse = false` (the default) every category seen so far for a
/// feature is emitted, with `0` for all but the current one. With
/// `sparse = true` only the indicator of the current category is emitted.
/// Numeric and timestamp features pass through unchanged.
///
/// # Example
/// ```
/// use streamlearn::features::{FeatureMap, FeatureValue};
/// use streamlearn::preprocessing::OneHotEncoder;
/// use streamlearn::stage::Transformer;
///
/// let mut encoder = OneHotEncoder::new();
/// let mut x = FeatureMap::new();
/// x.insert("color".to_string(), FeatureValue::from("red"));
/// encoder.learn_one(&x).unwrap();
///
/// let out = encoder.transform_one(&x).unwrap();
/// assert_eq!(out["color_red"], FeatureValue::Number(1.0));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    sparse: bool,
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only emit the indicator of the active category.
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    /// Categories seen so far for a feature.
    pub fn categories(&self, feature: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(feature)
    }

    fn indicator(feature: &str, category: &str) -> String {
        format!("{}_{}", feature, category)
    }
}

impl Transformer for OneHotEncoder {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        for (name, value) in x.iter().filter(|(_, v)| v.is_categorical()) {
            self.categories
                .entry(name.clone())
                .or_default()
                .insert(value.to_string());
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let mut out = FeatureMap::new();
        for (name, value) in x {
            if !value.is_categorical() {
                out.insert(name.clone(), value.clone());
                continue;
            }
            if !self.sparse {
                if let Some(seen) = self.categories.get(name) {
                    for category in seen {
                        out.insert(Self::indicator(name, category), FeatureValue::Number(0.0));
                    }
                }
            }
            out.insert(
                Self::indicator(name, &value.to_string()),
                FeatureValue::Number(1.0),
            );
        }
        Ok(out)
    }
}

impl_into_stage!(Transformer: OneHotEncoder);
