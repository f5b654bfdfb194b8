//! Question trigger times: seconds or `minutes:seconds` literals.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a question fires, as supplied by the embedding page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionTime {
    /// Plain number of seconds
    Seconds(f64),
    /// `"M:SS"` literal (a bare numeric string is also accepted)
    Code(String),
}

impl QuestionTime {
    /// Resolve to seconds.
    ///
    /// Malformed literals and negative or non-finite seconds resolve to `NaN`.
    /// Every comparison against `NaN` is false, so such a question never fires;
    /// use [`try_resolve`](Self::try_resolve) when the caller wants to surface
    /// the problem instead.
    pub fn resolve(&self) -> f64 {
        self.try_resolve().unwrap_or(f64::NAN)
    }

    /// Strict resolution that reports malformed literals.
    pub fn try_resolve(&self) -> Result<f64> {
        match self {
            QuestionTime::Seconds(s) if s.is_finite() && *s >= 0.0 => Ok(*s),
            QuestionTime::Seconds(s) => Err(Error::InvalidTime(s.to_string())),
            QuestionTime::Code(code) => parse_time_code(code),
        }
    }
}

impl From<f64> for QuestionTime {
    fn from(s: f64) -> Self {
        QuestionTime::Seconds(s)
    }
}

impl From<u32> for QuestionTime {
    fn from(s: u32) -> Self {
        QuestionTime::Seconds(f64::from(s))
    }
}

impl From<i32> for QuestionTime {
    fn from(s: i32) -> Self {
        QuestionTime::Seconds(f64::from(s))
    }
}

impl From<&str> for QuestionTime {
    fn from(code: &str) -> Self {
        QuestionTime::Code(code.to_string())
    }
}

impl fmt::Display for QuestionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionTime::Seconds(s) => write!(f, "{}", format_time_code(*s)),
            QuestionTime::Code(code) => write!(f, "{}", code),
        }
    }
}

/// Parse `"M:SS"` (or a bare non-negative number) into seconds.
///
/// The seconds field must be below 60; minutes may have any width.
pub fn parse_time_code(code: &str) -> Result<f64> {
    let trimmed = code.trim();
    let invalid = || Error::InvalidTime(code.to_string());

    let seconds = match trimmed.split_once(':') {
        Some((minutes, seconds)) => {
            if minutes.is_empty() || seconds.is_empty() || seconds.contains(':') {
                return Err(invalid());
            }
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            f64::from(minutes) * 60.0 + seconds
        }
        None => trimmed.parse::<f64>().map_err(|_| invalid())?,
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Ok(seconds)
}

/// Format seconds as `M:SS`, truncating fractions. Non-finite input yields `--:--`.
pub fn format_time_code(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
