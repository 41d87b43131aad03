//! Error types for pipeline operations.

use std::fmt;

/// Error type for pipeline construction, learning and inference.
#[derive(Debug)]
pub enum PipelineError {
    /// Stages were composed in a way that breaks the pipeline invariant
    /// (a non-transformer before the final position, or inside a union).
    InvalidComposition(String),
    /// The pipeline has no stages.
    EmptyPipeline,
    /// The stage cannot perform the requested operation.
    UnsupportedOperation {
        stage: String,
        operation: &'static str,
    },
    /// The label does not match what the final stage learns from.
    InvalidLabel { expected: &'static str, got: String },
    /// A feature reached a numeric stage with a non-numeric value.
    NonNumericFeature(String),
    /// Invalid hyperparameter value.
    InvalidParameter(String),
    /// Malformed CSV input.
    Csv(String),
    /// A CSV field could not be converted to the requested type.
    Parse {
        column: String,
        value: String,
        message: String,
    },
    /// I/O error during file operations.
    Io(String),
    /// Serialization or deserialization error.
    SerializationError(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidComposition(msg) => {
                write!(f, "Invalid composition: {}", msg)
            }
            PipelineError::EmptyPipeline => write!(f, "Pipeline has no stages"),
            PipelineError::UnsupportedOperation { stage, operation } => {
                write!(f, "Unsupported operation: {} cannot {}", stage, operation)
            }
            PipelineError::InvalidLabel { expected, got } => {
                write!(f, "Invalid label: expected {}, got {}", expected, got)
            }
            PipelineError::NonNumericFeature(name) => {
                write!(f, "Non-numeric feature: '{}'", name)
            }
            PipelineError::InvalidParameter(msg) => {
                write!(f, "Invalid parameter: {}", msg)
            }
            PipelineError::Csv(msg) => write!(f, "CSV error: {}", msg),
            PipelineError::Parse {
                column,
                value,
                message,
            } => {
                write!(
                    f,
                    "Parse error in column '{}' for value '{}': {}",
                    column, value, message
                )
            }
            PipelineError::Io(msg) => write!(f, "I/O error: {}", msg),
            PipelineError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Csv(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}
