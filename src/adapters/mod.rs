//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: JSON classifier, scaler and encoders, plus integrity checks
//! - `sanitize`: measurement filtering for logs

pub mod artifacts;
pub mod sanitize;

pub use artifacts::{ArtifactBundle, ArtifactError, IntegrityPolicy};
