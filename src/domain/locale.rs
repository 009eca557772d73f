//! Display language for labels and advice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language used for every user-facing string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Bahasa Indonesia
    #[default]
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    /// Pick the string for this locale.
    #[must_use]
    pub fn pick(self, indonesian: &'static str, english: &'static str) -> &'static str {
        match self {
            Self::Indonesian => indonesian,
            Self::English => english,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept full tags such as "en-US" or "id_ID".
        let lang = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "id" | "in" => Ok(Self::Indonesian),
            "en" => Ok(Self::English),
            _ => Err(format!("Unsupported locale {s:?} (expected \"id\" or \"en\")")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indonesian => write!(f, "id"),
            Self::English => write!(f, "en"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_tags() {
        assert_eq!("id".parse::<Locale>(), Ok(Locale::Indonesian));
        assert_eq!("en-US".parse::<Locale>(), Ok(Locale::English));
        assert_eq!(" ID_id ".parse::<Locale>(), Ok(Locale::Indonesian));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_pick() {
        assert_eq!(Locale::English.pick("Ya", "Yes"), "Yes");
        assert_eq!(Locale::Indonesian.pick("Ya", "Yes"), "Ya");
    }
}
