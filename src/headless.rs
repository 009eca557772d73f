//! Line-oriented batch mode.
//!
//! Each input line is one JSON [`RawSubmission`]; each output line is either
//! a [`PredictionReport`] or `{"error": "..."}`. A bad line never stops the
//! run.

use std::io::{BufRead, Write};

use serde::Serialize;

use crate::application::PredictionService;
use crate::domain::{InputRecord, Locale, PredictionReport, RawSubmission};
use crate::ports::Classifier;
use crate::Result;

#[derive(Debug, Serialize)]
struct ErrorLine {
    error: String,
}

/// Parse, validate and predict one line.
///
/// # Errors
/// Returns `WeightwiseError::Serialization` for malformed JSON,
/// `WeightwiseError::Record` for unknown or out-of-range answers and
/// `WeightwiseError::Prediction` for pipeline failures.
pub fn process_line<C: Classifier>(
    service: &PredictionService<C>,
    locale: Locale,
    line: &str,
) -> Result<PredictionReport> {
    let raw: RawSubmission = serde_json::from_str(line)?;
    let record = InputRecord::try_from(raw)?;
    let prediction = service.predict(&record)?;
    Ok(prediction.report(locale))
}

/// Process every line of `input`, writing one JSON line per submission.
///
/// Returns `(succeeded, failed)` counts.
///
/// # Errors
/// Returns `WeightwiseError::Io` if reading or writing fails. A line that is
/// not valid UTF-8 is reported like any other rejected line.
pub fn run<C, R, W>(
    service: &PredictionService<C>,
    locale: Locale,
    mut input: R,
    mut output: W,
) -> Result<(usize, usize)>
where
    C: Classifier,
    R: BufRead,
    W: Write,
{
    let (mut ok, mut failed) = (0usize, 0usize);
    let mut buf = Vec::new();
    let mut index = 0usize;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        index += 1;

        // Undecodable bytes reject this line only.
        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim_end_matches(['\n', '\r']),
            Err(e) => {
                failed += 1;
                tracing::warn!("Line {index} rejected: {e}");
                let json = serde_json::to_string(&ErrorLine {
                    error: format!("Line is not valid UTF-8: {e}"),
                })?;
                writeln!(output, "{json}")?;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let json = match process_line(service, locale, line) {
            Ok(report) => {
                ok += 1;
                serde_json::to_string(&report)?
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Line {index} rejected: {e}");
                serde_json::to_string(&ErrorLine {
                    error: e.to_string(),
                })?
            }
        };
        writeln!(output, "{json}")?;
    }

    output.flush()?;
    tracing::info!("Batch complete: {ok} predicted, {failed} rejected");
    Ok((ok, failed))
}
