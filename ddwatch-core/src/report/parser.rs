//! Parser for the data-volume capacity report
//!
//! Parses the output of [`DEFAULT_COMMAND`] and extracts the figures of the
//! first line containing the marker substring.

use serde::{Deserialize, Serialize};

use super::schema::{
    CapacityField, Conversion, DATA_VOLUME_SCHEMA, MIN_TOKENS, convert_gigabytes, convert_percent,
};
use crate::models::CapacityFigures;

/// Command run on every appliance to produce the capacity report
pub const DEFAULT_COMMAND: &str = "df -h";

/// Marker identifying the post-deduplication data volume row
pub const DEFAULT_MARKER: &str = "/data: post-comp";

/// Errors that can occur while parsing a capacity report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No line of the report contains the marker
    #[error("Malformed report: no line contains '{marker}'")]
    MissingMarker {
        /// Marker that was searched for
        marker: String,
    },
    /// The marker line is too short to carry every field
    #[error("Malformed report: expected at least {expected} columns, found {found} in line '{line}'")]
    TooFewColumns {
        /// Required token count
        expected: usize,
        /// Actual token count
        found: usize,
        /// The offending line
        line: String,
    },
    /// A field is not a finite number (strict mode only)
    #[error("Malformed report: {field} value '{token}' is not a finite number in line '{line}'")]
    InvalidNumber {
        /// Field that failed conversion
        field: CapacityField,
        /// Raw token
        token: String,
        /// The offending line
        line: String,
    },
}

impl ParseError {
    /// Returns the offending report line, if one was found
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::MissingMarker { .. } => None,
            Self::TooFewColumns { line, .. } | Self::InvalidNumber { line, .. } => Some(line),
        }
    }
}

/// Result type for report parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// How non-numeric tokens are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Coerce the field to zero and record a [`CoercionAnomaly`]
    #[default]
    Lenient,
    /// Fail the whole report with [`ParseError::InvalidNumber`]
    Strict,
}

/// A field that was coerced to zero because its token was not a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionAnomaly {
    /// Field that was coerced
    pub field: CapacityField,
    /// Raw token that failed conversion
    pub token: String,
}

/// Outcome of a successful parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Extracted figures
    pub figures: CapacityFigures,
    /// Fields coerced to zero (always empty in strict mode)
    pub anomalies: Vec<CoercionAnomaly>,
    /// The marker line the figures were taken from
    pub line: String,
}

impl ParsedReport {
    /// Returns true if any field had to be coerced
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Parser for the capacity report, configured with a marker and a mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityReportParser {
    marker: String,
    mode: ParseMode,
}

impl Default for CapacityReportParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, ParseMode::Lenient)
    }
}

impl CapacityReportParser {
    /// Creates a parser looking for `marker`
    #[must_use]
    pub fn new(marker: impl Into<String>, mode: ParseMode) -> Self {
        Self {
            marker: marker.into(),
            mode,
        }
    }

    /// Returns the marker substring
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns the parse mode
    #[must_use]
    pub const fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parses a full report.
    ///
    /// Only the first line containing the marker is considered.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingMarker`] if no line contains the marker,
    /// [`ParseError::TooFewColumns`] if that line has fewer than
    /// [`MIN_TOKENS`] tokens, and in strict mode
    /// [`ParseError::InvalidNumber`] for a non-numeric field.
    pub fn parse(&self, output: &str) -> ParseResult<ParsedReport> {
        let line = output
            .lines()
            .find(|l| l.contains(self.marker.as_str()))
            .ok_or_else(|| ParseError::MissingMarker {
                marker: self.marker.clone(),
            })?;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_TOKENS {
            return Err(ParseError::TooFewColumns {
                expected: MIN_TOKENS,
                found: tokens.len(),
                line: line.trim().to_string(),
            });
        }

        let mut figures = CapacityFigures {
            total_gb: 0.0,
            used_gb: 0.0,
            available_gb: 0.0,
            use_percent: 0,
            reclaimable_gb: 0.0,
        };
        let mut anomalies = Vec::new();

        for spec in &DATA_VOLUME_SCHEMA {
            let token = tokens[spec.index];
            let converted = match spec.conversion {
                Conversion::Gigabytes => {
                    if let Some(value) = convert_gigabytes(token) {
                        Self::assign_gigabytes(&mut figures, spec.field, value);
                        true
                    } else {
                        false
                    }
                }
                Conversion::Percent => {
                    if let Some(value) = convert_percent(token) {
                        figures.use_percent = value;
                        true
                    } else {
                        false
                    }
                }
            };

            if !converted {
                match self.mode {
                    ParseMode::Strict => {
                        return Err(ParseError::InvalidNumber {
                            field: spec.field,
                            token: token.to_string(),
                            line: line.trim().to_string(),
                        });
                    }
                    // The field keeps its zero value
                    ParseMode::Lenient => anomalies.push(CoercionAnomaly {
                        field: spec.field,
                        token: token.to_string(),
                    }),
                }
            }
        }

        Ok(ParsedReport {
            figures,
            anomalies,
            line: line.trim().to_string(),
        })
    }

    fn assign_gigabytes(figures: &mut CapacityFigures, field: CapacityField, value: f64) {
        match field {
            CapacityField::Total => figures.total_gb = value,
            CapacityField::Used => figures.used_gb = value,
            CapacityField::Available => figures.available_gb = value,
            CapacityField::Reclaimable => figures.reclaimable_gb = value,
            CapacityField::UsePercent => {}
        }
    }
}
