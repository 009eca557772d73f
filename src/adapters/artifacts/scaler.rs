//! Fitted per-column standardization.

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::domain::PredictionError;

/// `(x - mean) / scale` for each column, in `feature_names` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Number of columns the scaler was fit on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// # Errors
    /// Returns `ArtifactError::Incompatible` on length mismatches or
    /// non-finite parameters.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let n = self.width();
        if n == 0 || self.mean.len() != n || self.scale.len() != n {
            return Err(ArtifactError::Incompatible(format!(
                "scaler has {n} feature names, {} means and {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ArtifactError::Incompatible(
                "scaler parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Standardize one sample.
    ///
    /// A zero scale (constant column during fitting) leaves the centered
    /// value unscaled.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` on a wrong-width sample.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if x.len() != self.width() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.width(),
                got: x.len(),
            });
        }
        Ok(x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (v - mean) / scale
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            format_version: 1,
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            mean: vec![10.0, 0.5, 3.0],
            scale: vec![2.0, 0.5, 0.0],
        }
    }

    #[test]
    fn test_transform() {
        let out = scaler().transform(&[14.0, 0.0, 5.0]).expect("transform");
        assert_eq!(out, vec![2.0, -1.0, 2.0]);
    }

    #[test]
    fn test_transform_shape_mismatch() {
        assert_eq!(
            scaler().transform(&[1.0, 2.0]),
            Err(PredictionError::ShapeMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_validate() {
        assert!(scaler().validate().is_ok());

        let mut short = scaler();
        short.scale.pop();
        assert!(short.validate().is_err());

        let mut nan = scaler();
        nan.mean[1] = f64::NAN;
        assert!(nan.validate().is_err());
    }
}
