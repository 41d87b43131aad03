//! Sample streams.
//!
//! A stream yields `(features, label)` pairs one at a time, ready to be fed
//! to [`Pipeline::produce`](crate::compose::Pipeline::produce) and
//! [`Pipeline::fit`](crate::compose::Pipeline::fit).

pub mod csv_stream;

pub use csv_stream::{iter_csv, iter_csv_path, Converter, CsvOptions, CsvStream};

use crate::error::PipelineError;
use crate::features::{FeatureMap, Label};

/// One item of a stream: the features and, when known, the label.
pub type Sample = Result<(FeatureMap, Option<Label>), PipelineError>;
