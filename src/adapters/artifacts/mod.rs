//! Trained artifact adapter.
//!
//! Loads the classifier, scaler and label encoders from JSON files in one
//! directory, verifies them against the optional signed manifest, and checks
//! they agree with each other and with the fixed feature layout before any
//! prediction runs. There is no partial mode: any failure here is fatal.

mod encoder;
mod forest;
pub mod integrity;
mod scaler;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use encoder::{EncoderSet, EncoderSetFile, LabelEncoder};
pub use forest::{FlatTree, RandomForest, RandomForestFile};
pub use integrity::{ArtifactManifest, IntegrityPolicy};
pub use scaler::StandardScaler;

use crate::domain::{
    Category, Frequency, Gender, ObesityLevel, Transport, FEATURE_COLUMNS, TARGET_COLUMN,
};
use crate::ports::Classifier;

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODERS_FILE: &str = "encoders.json";

/// Files covered by the manifest.
pub const ARTIFACT_FILES: [&str; 3] = [MODEL_FILE, SCALER_FILE, ENCODERS_FILE];

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Input columns that go through a fitted label encoder.
pub const ENCODED_COLUMNS: [&str; 4] = ["Gender", "CAEC", "CALC", "MTRANS"];

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Incompatible artifacts: {0}")]
    Incompatible(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn check_version(file: &str, version: u32) -> Result<(), ArtifactError> {
    if version == SUPPORTED_FORMAT_VERSION {
        Ok(())
    } else {
        Err(ArtifactError::Incompatible(format!(
            "{file} has format_version {version}, expected {SUPPORTED_FORMAT_VERSION}"
        )))
    }
}

/// The three loaded artifacts, consistent with each other.
///
/// Immutable once built; share it behind `Arc`.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub classifier: RandomForest,
    pub scaler: StandardScaler,
    pub encoders: EncoderSet,
    /// Present when the directory carried a manifest
    pub manifest: Option<ArtifactManifest>,
}

impl ArtifactBundle {
    /// Load and cross-check all artifacts in `dir`.
    ///
    /// # Errors
    /// Returns an `ArtifactError` if any file is missing, corrupt, fails the
    /// integrity policy, or disagrees with the others.
    pub fn load(dir: &Path, policy: &IntegrityPolicy) -> Result<Self, ArtifactError> {
        tracing::info!("Loading artifacts from {:?}", dir);

        let manifest = integrity::verify(dir, &ARTIFACT_FILES, policy)?;

        let model_file: RandomForestFile = read_json(&dir.join(MODEL_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let encoder_file: EncoderSetFile = read_json(&dir.join(ENCODERS_FILE))?;

        check_version(MODEL_FILE, model_file.format_version)?;
        check_version(SCALER_FILE, scaler.format_version)?;
        check_version(ENCODERS_FILE, encoder_file.format_version)?;

        let classifier = RandomForest::from_file(model_file)?;
        scaler.validate()?;

        if scaler.feature_names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(ArtifactError::Incompatible(format!(
                "scaler columns {:?} do not match the expected order {:?}",
                scaler.feature_names, FEATURE_COLUMNS
            )));
        }
        if classifier.n_features() != scaler.width() {
            return Err(ArtifactError::Incompatible(format!(
                "model expects {} features, scaler produces {}",
                classifier.n_features(),
                scaler.width()
            )));
        }

        let mut required = ENCODED_COLUMNS.to_vec();
        required.push(TARGET_COLUMN);
        let encoders = EncoderSet::from_file(encoder_file, &required)?;

        check_target(&classifier, &encoders)?;
        warn_on_unencodable(&encoders);

        tracing::info!(
            "Artifacts loaded: {} trees, {} features, {} classes, manifest {}",
            classifier.n_trees(),
            classifier.n_features(),
            classifier.classes().len(),
            if manifest.is_some() { "verified" } else { "absent" }
        );

        Ok(Self {
            classifier,
            scaler,
            encoders,
            manifest,
        })
    }
}

/// Every target label must be canonical and every model class decodable.
fn check_target(classifier: &RandomForest, encoders: &EncoderSet) -> Result<(), ArtifactError> {
    let target = encoders
        .get(TARGET_COLUMN)
        .ok_or_else(|| ArtifactError::Incompatible(format!("no {TARGET_COLUMN} encoder")))?;

    if let Some(bad) = target
        .classes()
        .iter()
        .find(|label| ObesityLevel::from_canonical(label).is_none())
    {
        return Err(ArtifactError::Incompatible(format!(
            "{TARGET_COLUMN} encoder has unknown label {bad:?}"
        )));
    }

    let n_labels = target.classes().len();
    if let Some(code) = classifier
        .classes()
        .iter()
        .find(|code| **code as usize >= n_labels)
    {
        return Err(ArtifactError::Incompatible(format!(
            "model class {code} has no {TARGET_COLUMN} label ({n_labels} known)"
        )));
    }
    Ok(())
}

/// Form answers the encoders were never fit on fail at prediction time;
/// surface them once at startup.
fn warn_on_unencodable(encoders: &EncoderSet) {
    let tokens: [(&str, Vec<&str>); 4] = [
        ("Gender", Gender::ALL.iter().map(|c| c.token()).collect()),
        ("CAEC", Frequency::ALL.iter().map(|c| c.token()).collect()),
        ("CALC", Frequency::ALL.iter().map(|c| c.token()).collect()),
        ("MTRANS", Transport::ALL.iter().map(|c| c.token()).collect()),
    ];
    for (column, values) in tokens {
        for value in values {
            if encoders.encode(column, value).is_err() {
                tracing::warn!("Encoder {column} cannot encode form answer {value:?}");
            }
        }
    }
}
