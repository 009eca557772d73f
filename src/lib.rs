//! # Weightwise
//!
//! Obesity-level prediction from a lifestyle survey.
//!
//! This crate provides:
//! - A deterministic prediction pipeline over a trained random forest,
//!   standard scaler and label encoders
//! - Artifact loading with SHA-256 manifests and Ed25519 signatures
//! - Terminal UI for interactive use, JSON lines for batch use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Survey record, categories, prediction and BMI types
//! - `ports`: The classifier trait
//! - `adapters`: JSON artifacts, integrity checks, log sanitization
//! - `application`: The prediction service
//! - `tui`: Terminal user interface
//! - `headless`: JSON lines on stdin/stdout

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod headless;
pub mod ports;
pub mod tui;

pub use adapters::{ArtifactBundle, ArtifactError, IntegrityPolicy};
pub use application::PredictionService;
pub use config::{AppConfig, ConfigError};
pub use domain::{InputRecord, ObesityLevel, Prediction, PredictionError, PredictionReport};

/// Result type for Weightwise operations
pub type Result<T> = std::result::Result<T, WeightwiseError>;

/// Main error type for Weightwise
#[derive(Debug, thiserror::Error)]
pub enum WeightwiseError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Invalid submission: {0}")]
    Record(#[from] domain::RecordError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
