//! Categorical label encoders.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::domain::PredictionError;

/// Bidirectional mapping between a fitted vocabulary and integer codes.
///
/// The code of a token is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// # Errors
    /// Returns `ArtifactError::Incompatible` for an empty vocabulary or
    /// duplicate tokens.
    pub fn new(column: impl Into<String>, classes: Vec<String>) -> Result<Self, ArtifactError> {
        let column = column.into();
        if classes.is_empty() {
            return Err(ArtifactError::Incompatible(format!(
                "encoder {column} has an empty vocabulary"
            )));
        }
        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(class.as_str()) {
                return Err(ArtifactError::Incompatible(format!(
                    "encoder {column} lists {class:?} twice"
                )));
            }
        }
        Ok(Self { column, classes })
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Label to code.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` if `label` was not seen
    /// during fitting.
    pub fn transform(&self, label: &str) -> Result<u32, PredictionError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| i as u32)
            .ok_or_else(|| PredictionError::unknown(&self.column, label))
    }

    /// Code to label.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` for a code outside the
    /// vocabulary.
    pub fn inverse_transform(&self, code: u32) -> Result<&str, PredictionError> {
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| PredictionError::unknown(&self.column, code.to_string()))
    }
}

/// On-disk form of `encoders.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSetFile {
    pub format_version: u32,
    pub columns: BTreeMap<String, Vec<String>>,
}

/// All fitted encoders, keyed by column name. Read-only after loading.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderSet {
    /// Build from the deserialized file, requiring every column in `required`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Incompatible` if a required encoder is absent
    /// or any vocabulary is malformed.
    pub fn from_file(file: EncoderSetFile, required: &[&str]) -> Result<Self, ArtifactError> {
        let encoders = file
            .columns
            .into_iter()
            .map(|(column, classes)| {
                LabelEncoder::new(column.clone(), classes).map(|enc| (column, enc))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|c| !encoders.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(ArtifactError::Incompatible(format!(
                "encoder set is missing columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { encoders })
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    /// Forward-transform `label` with the encoder for `column`.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` if there is no encoder for
    /// `column` or it does not know `label`.
    pub fn encode(&self, column: &str, label: &str) -> Result<u32, PredictionError> {
        self.get(column)
            .ok_or_else(|| PredictionError::unknown(column, label))?
            .transform(label)
    }

    /// Inverse-transform `code` with the encoder for `column`.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` if there is no encoder for
    /// `column` or `code` is out of range.
    pub fn decode(&self, column: &str, code: u32) -> Result<&str, PredictionError> {
        self.get(column)
            .ok_or_else(|| PredictionError::unknown(column, code.to_string()))?
            .inverse_transform(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mtrans() -> LabelEncoder {
        LabelEncoder::new(
            "MTRANS",
            ["Automobile", "Bike", "Motorbike", "Public_Transportation", "Walking"]
                .map(String::from)
                .to_vec(),
        )
        .expect("valid encoder")
    }

    #[test]
    fn test_forward_and_inverse() {
        let enc = mtrans();
        assert_eq!(enc.transform("Public_Transportation"), Ok(3));
        assert_eq!(enc.inverse_transform(3), Ok("Public_Transportation"));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(
            mtrans().transform("Teleport"),
            Err(PredictionError::UnknownCategory {
                column: "MTRANS".into(),
                value: "Teleport".into()
            })
        );
        assert!(mtrans().inverse_transform(5).is_err());
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = LabelEncoder::new("CAEC", vec!["no".into(), "no".into()]).expect_err("dup");
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_set_requires_columns() {
        let file = EncoderSetFile {
            format_version: 1,
            columns: BTreeMap::from([("Gender".to_string(), vec!["Female".into(), "Male".into()])]),
        };
        let err = EncoderSet::from_file(file.clone(), &["Gender", "CAEC"]).expect_err("missing");
        assert!(err.to_string().contains("CAEC"));

        let set = EncoderSet::from_file(file, &["Gender"]).expect("complete");
        assert_eq!(set.encode("Gender", "Male"), Ok(1));
        assert_eq!(set.decode("Gender", 0), Ok("Female"));
        assert!(set.encode("CALC", "no").is_err());
    }
}
