//! Feature selection by name.

use crate::error::PipelineError;
use crate::features::FeatureMap;
use crate::stage::{impl_into_stage, Transformer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keeps only the listed features.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Select {
    keys: BTreeSet<String>,
}

impl Select {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }
}

impl Transformer for Select {
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        Ok(x.iter()
            .filter(|(k, _)| self.keys.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Removes the listed features.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Discard {
    keys: BTreeSet<String>,
}

impl Discard {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transformer for Discard {
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        Ok(x.iter()
            .filter(|(k, _)| !self.keys.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl_into_stage!(Transformer: Select, Discard);
