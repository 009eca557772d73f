//! Errors raised while turning an input record into a prediction.

/// Failure of the prediction pipeline.
///
/// These are the only two ways a well-formed record can fail once the
/// artifacts are loaded. Both are recoverable: the caller shows the message
/// and lets the user correct the submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// A categorical value is outside the vocabulary the encoder was fit on.
    #[error("Unknown category for {column}: {value:?}")]
    UnknownCategory { column: String, value: String },

    /// The assembled feature vector does not match the width the scaler and
    /// model expect.
    #[error("Feature shape mismatch: expected {expected} columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}

impl PredictionError {
    pub(crate) fn unknown(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Failure to build an [`InputRecord`](super::InputRecord) from raw values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Category(#[from] PredictionError),

    #[error("Invalid input: {}", .0.join(", "))]
    OutOfRange(Vec<String>),
}
