//! Stateless transformers built from closures.

use crate::error::PipelineError;
use crate::features::FeatureMap;
use crate::stage::{impl_into_stage, Transformer};

type TransformFn = dyn Fn(&FeatureMap) -> Result<FeatureMap, PipelineError> + Send;

/// Wraps a function as a transformer.
///
/// Useful for ad-hoc feature extraction such as pulling the hour out of a
/// timestamp. The function is called on every sample; it has no state to
/// learn.
pub struct FuncTransformer {
    func: Box<TransformFn>,
}

impl FuncTransformer {
    /// Wraps an infallible function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&FeatureMap) -> FeatureMap + Send + 'static,
    {
        Self {
            func: Box::new(move |x: &FeatureMap| Ok(func(x))),
        }
    }

    /// Wraps a function that may reject a sample.
    pub fn try_new<F>(func: F) -> Self
    where
        F: Fn(&FeatureMap) -> Result<FeatureMap, PipelineError> + Send + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl Transformer for FuncTransformer {
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        (self.func)(x)
    }
}

impl_into_stage!(Transformer: FuncTransformer);
