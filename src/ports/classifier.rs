//! Classifier port: Trait for the trained model.
//!
//! The model is an opaque artifact. This trait keeps the prediction pipeline
//! independent of how the model is stored or evaluated.

use crate::domain::PredictionError;

/// A fitted classifier over standardized feature vectors.
pub trait Classifier: Send + Sync {
    /// Number of input columns the model was fit on.
    fn n_features(&self) -> usize;

    /// Predict the integer class code of a single standardized sample.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` if `features.len()` differs
    /// from [`n_features`](Self::n_features).
    fn predict(&self, features: &[f64]) -> Result<u32, PredictionError>;
}
