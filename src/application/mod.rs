//! Application layer: Use cases and services.
//!
//! Orchestrates domain types with the classifier port to implement the
//! single use case: predicting an obesity level from a survey record.

mod prediction;

pub use prediction::PredictionService;
