//! Prediction result types.
//!
//! Holds the model-derived obesity level and the independently computed
//! body-mass index. The two are never reconciled: a record can be classified
//! `Overweight_Level_I` by the model while its BMI falls in the normal range.

use serde::{Deserialize, Serialize};

use super::locale::Locale;

/// Obesity level predicted by the classifier (`NObeyesdad`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObesityLevel {
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight,
    #[serde(rename = "Normal_Weight")]
    NormalWeight,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII,
}

/// Coarse grouping used to choose the advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightGroup {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl ObesityLevel {
    pub const ALL: [Self; 7] = [
        Self::InsufficientWeight,
        Self::NormalWeight,
        Self::OverweightLevelI,
        Self::OverweightLevelII,
        Self::ObesityTypeI,
        Self::ObesityTypeII,
        Self::ObesityTypeIII,
    ];

    /// Canonical label as stored in the target encoder.
    #[must_use]
    pub fn canonical(self) -> &'static str {
        match self {
            Self::InsufficientWeight => "Insufficient_Weight",
            Self::NormalWeight => "Normal_Weight",
            Self::OverweightLevelI => "Overweight_Level_I",
            Self::OverweightLevelII => "Overweight_Level_II",
            Self::ObesityTypeI => "Obesity_Type_I",
            Self::ObesityTypeII => "Obesity_Type_II",
            Self::ObesityTypeIII => "Obesity_Type_III",
        }
    }

    /// Inverse of [`canonical`](Self::canonical).
    #[must_use]
    pub fn from_canonical(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.canonical() == label)
    }

    /// Localized display label.
    #[must_use]
    pub fn display(self, locale: Locale) -> &'static str {
        match self {
            Self::InsufficientWeight => locale.pick("Berat Badan Kurang", "Insufficient Weight"),
            Self::NormalWeight => locale.pick("Berat Badan Normal", "Normal Weight"),
            Self::OverweightLevelI => {
                locale.pick("Kelebihan Berat Badan Tingkat I", "Overweight Level I")
            }
            Self::OverweightLevelII => {
                locale.pick("Kelebihan Berat Badan Tingkat II", "Overweight Level II")
            }
            Self::ObesityTypeI => locale.pick("Obesitas Tipe I", "Obesity Type I"),
            Self::ObesityTypeII => locale.pick("Obesitas Tipe II", "Obesity Type II"),
            Self::ObesityTypeIII => locale.pick("Obesitas Tipe III", "Obesity Type III"),
        }
    }

    #[must_use]
    pub fn group(self) -> WeightGroup {
        match self {
            Self::InsufficientWeight => WeightGroup::Underweight,
            Self::NormalWeight => WeightGroup::Normal,
            Self::OverweightLevelI | Self::OverweightLevelII => WeightGroup::Overweight,
            Self::ObesityTypeI | Self::ObesityTypeII | Self::ObesityTypeIII => WeightGroup::Obese,
        }
    }

    /// Fixed advice for this level.
    #[must_use]
    pub fn advisory(self, locale: Locale) -> &'static str {
        match self.group() {
            WeightGroup::Underweight => locale.pick(
                "Anda memiliki berat badan kurang. Disarankan untuk meningkatkan asupan nutrisi dan berkonsultasi dengan ahli gizi.",
                "Your weight is below the healthy range. Consider increasing your nutrient intake and consulting a nutritionist.",
            ),
            WeightGroup::Normal => locale.pick(
                "Anda memiliki berat badan normal. Pertahankan gaya hidup sehat dan pola makan seimbang.",
                "Your weight is in the normal range. Keep up a healthy lifestyle and a balanced diet.",
            ),
            WeightGroup::Overweight => locale.pick(
                "Anda mengalami kelebihan berat badan. Disarankan untuk meningkatkan aktivitas fisik dan mengurangi asupan kalori.",
                "You are overweight. Consider increasing physical activity and reducing calorie intake.",
            ),
            WeightGroup::Obese => locale.pick(
                "Anda mengalami obesitas. Sangat disarankan untuk berkonsultasi dengan dokter atau ahli gizi untuk rencana penurunan berat badan yang sehat.",
                "You are in the obese range. Consulting a doctor or nutritionist for a healthy weight-loss plan is strongly recommended.",
            ),
        }
    }
}

impl std::fmt::Display for ObesityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical())
    }
}

/// BMI bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Bucket a BMI value: <18.5, [18.5, 25), [25, 30), >=30.
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::Underweight => locale.pick("Kurang berat badan", "Underweight"),
            Self::Normal => locale.pick("Normal", "Normal"),
            Self::Overweight => locale.pick("Kelebihan berat badan", "Overweight"),
            Self::Obese => locale.pick("Obesitas", "Obese"),
        }
    }
}

/// Body-mass index computed from raw measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
    /// kg/m²
    pub value: f64,
    pub category: BmiCategory,
}

impl Bmi {
    /// `weight / height²`, weight in kilograms and height in metres.
    #[must_use]
    pub fn from_measurements(weight_kg: f64, height_m: f64) -> Self {
        let value = weight_kg / (height_m * height_m);
        Self {
            value,
            category: BmiCategory::from_bmi(value),
        }
    }

    /// Value rounded to one decimal place for display.
    #[must_use]
    pub fn display_value(&self) -> String {
        format!("{:.1}", self.value)
    }
}

/// Output of the prediction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Model-derived level
    pub level: ObesityLevel,
    /// Integer class code returned by the classifier
    pub class_code: u32,
    /// Independently derived BMI
    pub bmi: Bmi,
}

impl Prediction {
    /// Render all user-facing strings in `locale`.
    #[must_use]
    pub fn report(&self, locale: Locale) -> PredictionReport {
        PredictionReport {
            label: self.level,
            display_label: self.level.display(locale).to_string(),
            advisory: self.level.advisory(locale).to_string(),
            bmi: self.bmi.display_value(),
            bmi_category: self.bmi.category.label(locale).to_string(),
            locale,
        }
    }
}

/// Localized view of a [`Prediction`], written as one JSON line in headless
/// mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub label: ObesityLevel,
    pub display_label: String,
    pub advisory: String,
    /// One decimal place
    pub bmi: String,
    pub bmi_category: String,
    pub locale: Locale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_reference_value() {
        let bmi = Bmi::from_measurements(70.0, 1.7);
        assert!((bmi.value - 24.221_453).abs() < 1e-5);
        assert_eq!(bmi.display_value(), "24.2");
        assert_eq!(bmi.category, BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_bucket_edges() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.99), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.99), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_canonical_roundtrip_covers_all_levels() {
        for level in ObesityLevel::ALL {
            assert_eq!(ObesityLevel::from_canonical(level.canonical()), Some(level));
        }
        assert_eq!(ObesityLevel::from_canonical("Obesity_Type_IV"), None);
    }

    #[test]
    fn test_localized_labels() {
        assert_eq!(
            ObesityLevel::OverweightLevelII.display(Locale::Indonesian),
            "Kelebihan Berat Badan Tingkat II"
        );
        assert_eq!(
            ObesityLevel::ObesityTypeI.display(Locale::English),
            "Obesity Type I"
        );
        assert_eq!(BmiCategory::Obese.label(Locale::Indonesian), "Obesitas");
    }

    #[test]
    fn test_advisory_shared_within_group() {
        let a = ObesityLevel::OverweightLevelI.advisory(Locale::English);
        let b = ObesityLevel::OverweightLevelII.advisory(Locale::English);
        assert_eq!(a, b);
        assert_ne!(a, ObesityLevel::ObesityTypeI.advisory(Locale::English));
    }

    #[test]
    fn test_report_serializes_canonical_label() {
        let prediction = Prediction {
            level: ObesityLevel::NormalWeight,
            class_code: 1,
            bmi: Bmi::from_measurements(70.0, 1.7),
        };
        let report = prediction.report(Locale::English);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["label"], "Normal_Weight");
        assert_eq!(json["bmi"], "24.2");
        assert_eq!(json["bmi_category"], "Normal");
        assert_eq!(json["locale"], "en");
    }
}
