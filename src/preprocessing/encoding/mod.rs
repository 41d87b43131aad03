//! Encoding transformers for categorical features.

pub mod one_hot;

pub use one_hot::OneHotEncoder;
