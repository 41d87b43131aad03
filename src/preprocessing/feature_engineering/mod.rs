//! Feature engineering transformers.

pub mod polynomial;

pub use polynomial::PolynomialExtender;
