//! Column layout of the data-volume report line.
//!
//! Format: `/data: post-comp  <size> <used> <avail> <use%> <cleanable>`
//!
//! The marker itself contains a space, so it occupies tokens 0 and 1.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of whitespace-separated tokens on the marker line
pub const MIN_TOKENS: usize = 7;

/// A named field of the capacity report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityField {
    /// Total capacity (GB)
    Total,
    /// Used capacity (GB)
    Used,
    /// Available capacity (GB)
    Available,
    /// Utilization percentage
    UsePercent,
    /// Cleanable capacity (GB)
    Reclaimable,
}

impl CapacityField {
    /// Column name as used in logs and the metrics store
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Total => "size_gb",
            Self::Used => "used_gb",
            Self::Available => "avail_gb",
            Self::UsePercent => "use_percent",
            Self::Reclaimable => "cleanable_gb",
        }
    }
}

impl fmt::Display for CapacityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// How a token is turned into a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Real number of gigabytes, taken as printed
    Gigabytes,
    /// Integer percentage with an optional trailing `%`
    Percent,
}

/// One entry of the report schema: which token feeds which field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Target field
    pub field: CapacityField,
    /// Zero-based token index on the marker line
    pub index: usize,
    /// Conversion applied to the token
    pub conversion: Conversion,
}

/// Tokens the marker itself occupies at the start of the line
pub const MARKER_TOKENS: usize = 2;

/// Token layout of the `/data: post-comp` line
pub const DATA_VOLUME_SCHEMA: [FieldSpec; 5] = [
    FieldSpec {
        field: CapacityField::Total,
        index: 2,
        conversion: Conversion::Gigabytes,
    },
    FieldSpec {
        field: CapacityField::Used,
        index: 3,
        conversion: Conversion::Gigabytes,
    },
    FieldSpec {
        field: CapacityField::Available,
        index: 4,
        conversion: Conversion::Gigabytes,
    },
    FieldSpec {
        field: CapacityField::UsePercent,
        index: 5,
        conversion: Conversion::Percent,
    },
    FieldSpec {
        field: CapacityField::Reclaimable,
        index: 6,
        conversion: Conversion::Gigabytes,
    },
];

/// Converts a gigabyte token; `None` if it is not a finite number
pub(super) fn convert_gigabytes(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a percentage token; `None` if it is not a number.
///
/// A fractional value keeps only its integer part (`95.7%` reads as 95).
pub(super) fn convert_percent(token: &str) -> Option<i64> {
    let digits = token.strip_suffix('%').unwrap_or(token);
    digits.parse::<i64>().ok().or_else(|| {
        digits
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
            .map(|v| v.trunc() as i64)
    })
}
