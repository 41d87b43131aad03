//! Composition of stages.
//!
//! - [`Pipeline`]: sequential chain with dual-path update dispatch
//! - [`TransformerUnion`]: parallel transformers merged by key
//! - [`Select`] / [`Discard`]: keep or drop features by name
//! - [`FuncTransformer`]: closure-based stateless transformer

pub mod func;
pub mod pipeline;
pub mod select;
pub mod union;

pub use func::FuncTransformer;
pub use pipeline::{Pipeline, PipelineConfig, TransformerChain};
pub use select::{Discard, Select};
pub use union::TransformerUnion;
