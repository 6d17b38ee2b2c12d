use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FleetFinanceError;

/// A quarter-year label in `Q[1-4]-YYYY` form.
///
/// Ordering is chronological: first by year, then by quarter number
/// (Q1 → 1 … Q4 → 4). Reports sort descending on this ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct QuarterLabel {
    pub year: i32,
    /// 1-4
    pub quarter: u8,
}

impl QuarterLabel {
    pub fn new(year: i32, quarter: u8) -> Result<Self, FleetFinanceError> {
        if !(1..=4).contains(&quarter) {
            return Err(FleetFinanceError::Validation {
                field: "quarter".into(),
                reason: format!("quarter number must be 1-4, got {quarter}"),
            });
        }
        Ok(QuarterLabel { year, quarter })
    }
}

impl FromStr for QuarterLabel {
    type Err = FleetFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FleetFinanceError::Validation {
            field: "quarter_year".into(),
            reason: format!("expected Q[1-4]-YYYY, got {s:?}"),
        };

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[0] != b'Q' || bytes[2] != b'-' {
            return Err(invalid());
        }
        let quarter = match bytes[1] {
            b'1'..=b'4' => bytes[1] - b'0',
            _ => return Err(invalid()),
        };
        if !bytes[3..].iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let year: i32 = s[3..].parse().map_err(|_| invalid())?;
        Ok(QuarterLabel { year, quarter })
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-{:04}", self.quarter, self.year)
    }
}

impl TryFrom<String> for QuarterLabel {
    type Error = FleetFinanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuarterLabel> for String {
    fn from(value: QuarterLabel) -> Self {
        value.to_string()
    }
}
