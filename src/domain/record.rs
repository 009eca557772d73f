//! Lifestyle survey record for obesity-level prediction.
//!
//! Fields follow the "estimation of obesity levels based on eating habits and
//! physical condition" survey. Categorical answers are closed enums, so an
//! unrecognized token can only fail where raw text enters the system, never
//! inside the prediction pipeline.

use serde::{Deserialize, Serialize};

use super::error::{PredictionError, RecordError};
use super::locale::Locale;
use super::prediction::Bmi;

/// Model input columns in the order the scaler and classifier were fit on.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history_with_overweight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
];

/// Column holding the target label in the encoder set.
pub const TARGET_COLUMN: &str = "NObeyesdad";

/// A closed answer vocabulary.
pub trait Category: Copy + PartialEq + Sized + 'static {
    /// Every variant, in form display order.
    const ALL: &'static [Self];

    /// The token the encoders were fit on.
    fn token(self) -> &'static str;

    /// Label shown on the form.
    fn label(self, locale: Locale) -> &'static str;

    /// Parse a raw answer.
    ///
    /// Accepts the dataset token and the labels of every locale, ignoring
    /// case, spaces and underscores.
    ///
    /// # Errors
    /// Returns `PredictionError::UnknownCategory` naming `column` if nothing
    /// matches.
    fn parse(column: &str, raw: &str) -> Result<Self, PredictionError> {
        let wanted = normalize(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|c| {
                normalize(c.token()) == wanted
                    || normalize(c.label(Locale::Indonesian)) == wanted
                    || normalize(c.label(Locale::English)) == wanted
            })
            .ok_or_else(|| PredictionError::unknown(column, raw))
    }

    /// The following variant, wrapping around.
    #[must_use]
    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// The preceding variant, wrapping around.
    #[must_use]
    fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNo {
    #[default]
    No,
    Yes,
}

impl YesNo {
    /// Fixed binary code fed to the model: `No` is 0, `Yes` is 1.
    #[must_use]
    pub const fn code(self) -> f64 {
        match self {
            Self::No => 0.0,
            Self::Yes => 1.0,
        }
    }
}


impl Category for YesNo {
    const ALL: &'static [Self] = &[Self::No, Self::Yes];

    fn token(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
        }
    }

    fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::No => locale.pick("Tidak", "No"),
            Self::Yes => locale.pick("Ya", "Yes"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Female,
    #[default]
    Male,
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female];

    fn token(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }

    fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::Female => locale.pick("Wanita", "Female"),
            Self::Male => locale.pick("Pria", "Male"),
        }
    }
}

/// How often something happens (snacking `CAEC`, alcohol `CALC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    No,
    Sometimes,
    Frequently,
    Always,
}

impl Category for Frequency {
    const ALL: &'static [Self] = &[Self::No, Self::Sometimes, Self::Frequently, Self::Always];

    fn token(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Sometimes => "Sometimes",
            Self::Frequently => "Frequently",
            Self::Always => "Always",
        }
    }

    fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::No => locale.pick("Tidak", "No"),
            Self::Sometimes => locale.pick("Kadang", "Sometimes"),
            Self::Frequently => locale.pick("Sering", "Frequently"),
            Self::Always => locale.pick("Selalu", "Always"),
        }
    }
}

/// Usual mode of transport (`MTRANS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Automobile,
    Motorbike,
    Bike,
    PublicTransportation,
    Walking,
}

impl Category for Transport {
    const ALL: &'static [Self] = &[
        Self::Automobile,
        Self::Motorbike,
        Self::Bike,
        Self::PublicTransportation,
        Self::Walking,
    ];

    fn token(self) -> &'static str {
        match self {
            Self::Automobile => "Automobile",
            Self::Motorbike => "Motorbike",
            Self::Bike => "Bike",
            Self::PublicTransportation => "Public_Transportation",
            Self::Walking => "Walking",
        }
    }

    fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::Automobile => locale.pick("Mobil", "Car"),
            Self::Motorbike => locale.pick("Sepeda Motor", "Motorbike"),
            Self::Bike => locale.pick("Sepeda", "Bicycle"),
            Self::PublicTransportation => locale.pick("Angkutan Umum", "Public transport"),
            Self::Walking => locale.pick("Berjalan", "Walking"),
        }
    }
}

/// Inclusive range of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
    /// Slider fields only take whole numbers.
    pub integral: bool,
}

impl FieldBounds {
    const fn continuous(column: &'static str, min: f64, max: f64) -> Self {
        Self {
            column,
            min,
            max,
            integral: false,
        }
    }

    const fn slider(column: &'static str, min: f64, max: f64) -> Self {
        Self {
            column,
            min,
            max,
            integral: true,
        }
    }

    /// Describe why `value` is rejected, or `None` if it is acceptable.
    #[must_use]
    pub fn check(&self, value: f64) -> Option<String> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Some(format!(
                "{} {} out of range [{}, {}]",
                self.column, value, self.min, self.max
            ));
        }
        if self.integral && value.fract() != 0.0 {
            return Some(format!("{} {} must be a whole number", self.column, value));
        }
        None
    }
}

/// Widget limits of the numeric fields.
pub mod bounds {
    use super::FieldBounds;

    pub const AGE: FieldBounds = FieldBounds::continuous("Age", 10.0, 100.0);
    pub const HEIGHT: FieldBounds = FieldBounds::continuous("Height", 1.3, 2.5);
    pub const WEIGHT: FieldBounds = FieldBounds::continuous("Weight", 30.0, 200.0);
    pub const FCVC: FieldBounds = FieldBounds::slider("FCVC", 1.0, 3.0);
    pub const NCP: FieldBounds = FieldBounds::slider("NCP", 1.0, 4.0);
    pub const CH2O: FieldBounds = FieldBounds::slider("CH2O", 1.0, 10.0);
    pub const FAF: FieldBounds = FieldBounds::slider("FAF", 0.0, 3.0);
    pub const TUE: FieldBounds = FieldBounds::slider("TUE", 0.0, 10.0);
}

/// One validated survey submission.
///
/// Raw text only becomes a record through `TryFrom<RawSubmission>`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub gender: Gender,
    /// Years
    pub age: f64,
    /// Metres
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    pub family_history_with_overweight: YesNo,
    /// Frequent consumption of high-calorie food
    pub favc: YesNo,
    /// Vegetable frequency (1-3)
    pub fcvc: u8,
    /// Main meals per day (1-4)
    pub ncp: u8,
    /// Eating between meals
    pub caec: Frequency,
    pub smoke: YesNo,
    /// Glasses of water per day (1-10)
    pub ch2o: u8,
    /// Monitors calorie intake
    pub scc: YesNo,
    /// Physical activity frequency (0-3)
    pub faf: u8,
    /// Hours on electronic devices (0-10)
    pub tue: u8,
    /// Alcohol consumption
    pub calc: Frequency,
    pub mtrans: Transport,
}

impl Default for InputRecord {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: 25.0,
            height: 1.7,
            weight: 70.0,
            family_history_with_overweight: YesNo::No,
            favc: YesNo::No,
            fcvc: 2,
            ncp: 3,
            caec: Frequency::No,
            smoke: YesNo::No,
            ch2o: 2,
            scc: YesNo::No,
            faf: 1,
            tue: 2,
            calc: Frequency::No,
            mtrans: Transport::Automobile,
        }
    }
}

impl InputRecord {
    /// A typical adult respondent, used for the form's sample data.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            caec: Frequency::Sometimes,
            calc: Frequency::Sometimes,
            mtrans: Transport::PublicTransportation,
            ..Self::default()
        }
    }

    /// Validate that all numeric fields are within the form limits.
    ///
    /// # Errors
    /// Returns one message per offending field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let checks = [
            (bounds::AGE, self.age),
            (bounds::HEIGHT, self.height),
            (bounds::WEIGHT, self.weight),
            (bounds::FCVC, f64::from(self.fcvc)),
            (bounds::NCP, f64::from(self.ncp)),
            (bounds::CH2O, f64::from(self.ch2o)),
            (bounds::FAF, f64::from(self.faf)),
            (bounds::TUE, f64::from(self.tue)),
        ];
        let errors: Vec<String> = checks.iter().filter_map(|(b, v)| b.check(*v)).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Body-mass index from the raw height and weight.
    #[must_use]
    pub fn bmi(&self) -> Bmi {
        Bmi::from_measurements(self.weight, self.height)
    }
}

/// Unvalidated submission keyed by dataset column names.
///
/// This is the shape accepted on stdin in headless mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubmission {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history_with_overweight: String,
    #[serde(rename = "FAVC")]
    pub favc: String,
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    #[serde(rename = "NCP")]
    pub ncp: f64,
    #[serde(rename = "CAEC")]
    pub caec: String,
    #[serde(rename = "SMOKE")]
    pub smoke: String,
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    #[serde(rename = "SCC")]
    pub scc: String,
    #[serde(rename = "FAF")]
    pub faf: f64,
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "CALC")]
    pub calc: String,
    #[serde(rename = "MTRANS")]
    pub mtrans: String,
}

impl TryFrom<RawSubmission> for InputRecord {
    type Error = RecordError;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        let gender = Gender::parse("Gender", &raw.gender)?;
        let family_history_with_overweight =
            YesNo::parse("family_history_with_overweight", &raw.family_history_with_overweight)?;
        let favc = YesNo::parse("FAVC", &raw.favc)?;
        let caec = Frequency::parse("CAEC", &raw.caec)?;
        let smoke = YesNo::parse("SMOKE", &raw.smoke)?;
        let scc = YesNo::parse("SCC", &raw.scc)?;
        let calc = Frequency::parse("CALC", &raw.calc)?;
        let mtrans = Transport::parse("MTRANS", &raw.mtrans)?;

        // Sliders are range-checked as floats before narrowing to u8.
        let sliders = [
            (bounds::FCVC, raw.fcvc),
            (bounds::NCP, raw.ncp),
            (bounds::CH2O, raw.ch2o),
            (bounds::FAF, raw.faf),
            (bounds::TUE, raw.tue),
        ];
        let errors: Vec<String> = sliders.iter().filter_map(|(b, v)| b.check(*v)).collect();
        if !errors.is_empty() {
            return Err(RecordError::OutOfRange(errors));
        }

        let record = Self {
            gender,
            age: raw.age,
            height: raw.height,
            weight: raw.weight,
            family_history_with_overweight,
            favc,
            fcvc: raw.fcvc as u8,
            ncp: raw.ncp as u8,
            caec,
            smoke,
            ch2o: raw.ch2o as u8,
            scc,
            faf: raw.faf as u8,
            tue: raw.tue as u8,
            calc,
            mtrans,
        };
        record.validate().map_err(RecordError::OutOfRange)?;
        Ok(record)
    }
}
