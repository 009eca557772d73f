//! Log sanitization for body measurements and key material.
//!
//! Submissions carry age, height and weight, and the derived BMI. None of
//! these should reach a log file verbatim, so formatted log lines pass
//! through [`SanitizingMakeWriter`], which rewrites:
//! - `age=25`, `height: 1.7`, `weight=70.5`, `bmi=24.2` style pairs
//! - validation messages of the form `Weight 250 out of range`
//! - the same fields as JSON members (`"Weight": 70`)
//! - base64 or hex secrets following `seed=`, `key=` and similar
//!
//! # Performance
//!
//! `sanitize()` caps the scanned input (see `WEIGHTWISE_SANITIZE_MAX_BYTES`)
//! and truncates anything longer.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Default cap on bytes scanned per call (16 KiB).
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const RULES: [(&str, &str); 5] = [
    (
        r"(?i)\b(age|height|weight|bmi)\s*[=:]\s*-?\d+(?:\.\d+)?",
        "${1}=[REDACTED]",
    ),
    (
        r"(?i)\b(age|height|weight|bmi)\s+-?(?:\d+(?:\.\d+)?|inf|NaN)\b",
        "${1} [REDACTED]",
    ),
    (
        r#"(?i)"(age|height|weight|bmi)"\s*:\s*"?-?\d+(?:\.\d+)?"?"#,
        r#""${1}":"[REDACTED]""#,
    ),
    (
        r"(?i)\b(?:private[_-]?key|signing[_-]?key|secret|seed|key)\b\s*[:=]\s*[A-Za-z0-9+/]{32,}={0,2}",
        "[REDACTED-SECRET]",
    ),
    (
        r"(?i)\b(?:private[_-]?key|signing[_-]?key|secret|seed|key)\b\s*[:=]\s*[0-9a-f]{32,}\b",
        "[REDACTED-SECRET]",
    ),
];

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        // Rules are literals; a pattern that fails to compile is dropped
        // rather than taking logging down with it.
        let rules: Vec<Rule> = RULES
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| Rule {
                    regex,
                    replacement,
                })
            })
            .collect();
        let set = RegexSet::new(rules.iter().map(|r| r.regex.as_str()))
            .unwrap_or_else(|_| RegexSet::empty());
        Patterns { set, rules }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("WEIGHTWISE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

/// Redact measurements and secrets in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer that sanitizes each formatted log line
/// before handing it to the inner sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line with no newline must not buffer without bound.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}
