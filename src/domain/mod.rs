//! Domain layer: Core types for obesity-level prediction.
//!
//! Pure Rust types with no I/O. Input categories are closed enums and numeric
//! fields carry explicit bounds, so invalid records are rejected at
//! construction instead of inside the pipeline.

mod error;
mod locale;
mod prediction;
mod record;

pub use error::{PredictionError, RecordError};
pub use locale::Locale;
pub use prediction::{Bmi, BmiCategory, ObesityLevel, Prediction, PredictionReport, WeightGroup};
pub use record::{
    bounds, Category, FieldBounds, Frequency, Gender, InputRecord, RawSubmission, Transport,
    YesNo, FEATURE_COLUMNS, TARGET_COLUMN,
};
