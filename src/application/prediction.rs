//! Prediction service: Runs one survey record through the trained pipeline.
//!
//! Steps, in order:
//! - Fixed binary coding of the yes/no answers
//! - Label encoding of the categorical answers
//! - Vector assembly in the fitted column order
//! - Standardization
//! - Classification and decoding of the target label
//! - BMI from the raw measurements

use std::sync::Arc;

use crate::adapters::artifacts::{ArtifactBundle, EncoderSet, RandomForest, StandardScaler};
use crate::domain::{
    Category, InputRecord, ObesityLevel, Prediction, PredictionError, FEATURE_COLUMNS,
    TARGET_COLUMN,
};
use crate::ports::Classifier;

/// Pure, shareable prediction pipeline over immutable artifacts.
pub struct PredictionService<C: Classifier> {
    classifier: Arc<C>,
    scaler: Arc<StandardScaler>,
    encoders: Arc<EncoderSet>,
}

impl<C: Classifier> Clone for PredictionService<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
            scaler: Arc::clone(&self.scaler),
            encoders: Arc::clone(&self.encoders),
        }
    }
}

impl PredictionService<RandomForest> {
    /// Take ownership of a loaded bundle.
    #[must_use]
    pub fn from_bundle(bundle: ArtifactBundle) -> Self {
        Self::new(
            Arc::new(bundle.classifier),
            Arc::new(bundle.scaler),
            Arc::new(bundle.encoders),
        )
    }
}

impl<C: Classifier> PredictionService<C> {
    pub fn new(classifier: Arc<C>, scaler: Arc<StandardScaler>, encoders: Arc<EncoderSet>) -> Self {
        Self {
            classifier,
            scaler,
            encoders,
        }
    }

    /// Build the unscaled feature vector in [`FEATURE_COLUMNS`] order.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` if an encoder does not know
    /// the record's answer.
    pub fn encode(&self, record: &InputRecord) -> Result<Vec<f64>, PredictionError> {
        let code = |column: &str, token: &str| -> Result<f64, PredictionError> {
            self.encoders.encode(column, token).map(f64::from)
        };

        let features = vec![
            code("Gender", record.gender.token())?,
            record.age,
            record.height,
            record.weight,
            record.family_history_with_overweight.code(),
            record.favc.code(),
            f64::from(record.fcvc),
            f64::from(record.ncp),
            code("CAEC", record.caec.token())?,
            record.smoke.code(),
            f64::from(record.ch2o),
            record.scc.code(),
            f64::from(record.faf),
            f64::from(record.tue),
            code("CALC", record.calc.token())?,
            code("MTRANS", record.mtrans.token())?,
        ];
        debug_assert_eq!(features.len(), FEATURE_COLUMNS.len());
        tracing::debug!("Encoded {} features", features.len());
        Ok(features)
    }

    /// Predict the obesity level of one record.
    ///
    /// Deterministic: the same record and artifacts always give the same
    /// result.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` for an answer outside an
    /// encoder's vocabulary, or `PredictionError::ShapeMismatch` if the
    /// feature vector does not fit the scaler or classifier.
    pub fn predict(&self, record: &InputRecord) -> Result<Prediction, PredictionError> {
        let features = self.encode(record)?;

        if features.len() != self.scaler.width() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.scaler.width(),
                got: features.len(),
            });
        }
        let scaled = self.scaler.transform(&features)?;
        tracing::debug!("Scaled feature vector");

        if scaled.len() != self.classifier.n_features() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.classifier.n_features(),
                got: scaled.len(),
            });
        }
        let class_code = self.classifier.predict(&scaled)?;
        tracing::debug!("Classifier returned class {class_code}");

        let label = self.encoders.decode(TARGET_COLUMN, class_code)?;
        let level = ObesityLevel::from_canonical(label)
            .ok_or_else(|| PredictionError::unknown(TARGET_COLUMN, label))?;

        let bmi = record.bmi();
        tracing::debug!(
            "Prediction: {} (bmi category {:?})",
            level.canonical(),
            bmi.category
        );

        Ok(Prediction {
            level,
            class_code,
            bmi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::EncoderSetFile;
    use crate::domain::{BmiCategory, Frequency, Transport, YesNo};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Returns a fixed class and records what it was given.
    struct StubClassifier {
        width: usize,
        class: u32,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl StubClassifier {
        fn new(width: usize, class: u32) -> Self {
            Self {
                width,
                class,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn n_features(&self) -> usize {
            self.width
        }

        fn predict(&self, features: &[f64]) -> Result<u32, PredictionError> {
            if features.len() != self.width {
                return Err(PredictionError::ShapeMismatch {
                    expected: self.width,
                    got: features.len(),
                });
            }
            self.seen.lock().expect("lock").push(features.to_vec());
            Ok(self.class)
        }
    }

    fn identity_scaler(width: usize) -> StandardScaler {
        StandardScaler {
            format_version: 1,
            feature_names: FEATURE_COLUMNS.iter().take(width).map(|s| s.to_string()).collect(),
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    fn encoders() -> EncoderSet {
        let columns = BTreeMap::from([
            ("Gender".to_string(), vec!["Female", "Male"]),
            ("CAEC".to_string(), vec!["Always", "Frequently", "Sometimes", "no"]),
            ("CALC".to_string(), vec!["Always", "Frequently", "Sometimes", "no"]),
            (
                "MTRANS".to_string(),
                vec!["Automobile", "Bike", "Motorbike", "Public_Transportation", "Walking"],
            ),
            (
                "NObeyesdad".to_string(),
                vec![
                    "Insufficient_Weight",
                    "Normal_Weight",
                    "Obesity_Type_I",
                    "Obesity_Type_II",
                    "Obesity_Type_III",
                    "Overweight_Level_I",
                    "Overweight_Level_II",
                ],
            ),
        ]);
        let file = EncoderSetFile {
            format_version: 1,
            columns: columns
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(String::from).collect()))
                .collect(),
        };
        EncoderSet::from_file(file, &[]).expect("encoders")
    }

    fn service(class: u32) -> PredictionService<StubClassifier> {
        PredictionService::new(
            Arc::new(StubClassifier::new(16, class)),
            Arc::new(identity_scaler(16)),
            Arc::new(encoders()),
        )
    }

    #[test]
    fn test_feature_vector_layout() {
        let svc = service(1);
        let features = svc.encode(&InputRecord::sample()).expect("encode");
        assert_eq!(
            features,
            vec![1.0, 25.0, 1.7, 70.0, 0.0, 0.0, 2.0, 3.0, 2.0, 0.0, 2.0, 0.0, 1.0, 2.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_binary_fields_use_fixed_codes() {
        let svc = service(1);
        let record = InputRecord {
            family_history_with_overweight: YesNo::Yes,
            favc: YesNo::Yes,
            smoke: YesNo::No,
            scc: YesNo::Yes,
            ..InputRecord::sample()
        };
        let f = svc.encode(&record).expect("encode");
        assert_eq!((f[4], f[5], f[9], f[11]), (1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_predict_decodes_label_and_bmi() {
        let svc = service(1);
        let prediction = svc.predict(&InputRecord::sample()).expect("predict");
        assert_eq!(prediction.level, ObesityLevel::NormalWeight);
        assert_eq!(prediction.class_code, 1);
        assert_eq!(prediction.bmi.display_value(), "24.2");
        assert_eq!(prediction.bmi.category, BmiCategory::Normal);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let svc = service(4);
        let record = InputRecord {
            weight: 150.0,
            caec: Frequency::Frequently,
            mtrans: Transport::Walking,
            ..InputRecord::sample()
        };
        let a = svc.predict(&record).expect("first");
        let b = svc.predict(&record).expect("second");
        assert_eq!(a, b);
        assert_eq!(a.level, ObesityLevel::ObesityTypeIII);
    }

    #[test]
    fn test_unknown_category_from_encoder() {
        let mut file = EncoderSetFile {
            format_version: 1,
            columns: BTreeMap::new(),
        };
        for column in ["Gender", "CAEC", "CALC", "NObeyesdad"] {
            let enc = encoders();
            let classes = enc.get(column).expect("column").classes().to_vec();
            file.columns.insert(column.to_string(), classes);
        }
        // Vocabulary fit without walking respondents.
        file.columns.insert(
            "MTRANS".to_string(),
            vec!["Automobile".into(), "Public_Transportation".into()],
        );
        let svc = PredictionService::new(
            Arc::new(StubClassifier::new(16, 1)),
            Arc::new(identity_scaler(16)),
            Arc::new(EncoderSet::from_file(file, &[]).expect("encoders")),
        );

        let record = InputRecord {
            mtrans: Transport::Walking,
            ..InputRecord::sample()
        };
        assert_eq!(
            svc.predict(&record),
            Err(PredictionError::UnknownCategory {
                column: "MTRANS".into(),
                value: "Walking".into()
            })
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let svc = PredictionService::new(
            Arc::new(StubClassifier::new(15, 1)),
            Arc::new(identity_scaler(15)),
            Arc::new(encoders()),
        );
        assert_eq!(
            svc.predict(&InputRecord::sample()),
            Err(PredictionError::ShapeMismatch {
                expected: 15,
                got: 16
            })
        );
    }

    #[test]
    fn test_scaled_vector_reaches_classifier() {
        let classifier = Arc::new(StubClassifier::new(16, 1));
        let mut scaler = identity_scaler(16);
        scaler.mean[3] = 70.0;
        scaler.scale[3] = 10.0;
        let svc = PredictionService::new(Arc::clone(&classifier), Arc::new(scaler), Arc::new(encoders()));

        svc.predict(&InputRecord::sample()).expect("predict");
        let seen = classifier.seen.lock().expect("lock");
        assert_eq!(seen[0][3], 0.0);
    }

    #[test]
    fn test_unknown_class_code() {
        let svc = service(7);
        assert!(matches!(
            svc.predict(&InputRecord::sample()),
            Err(PredictionError::UnknownCategory { column, .. }) if column == TARGET_COLUMN
        ));
    }
}
