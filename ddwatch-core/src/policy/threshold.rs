//! Day-of-week sensitive alert threshold.
//!
//! Fridays use a lower threshold so that a filling appliance is reported
//! before the weekend.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Threshold applied on Fridays
pub const FRIDAY_THRESHOLD: u8 = 93;

/// Threshold applied on every other day
pub const DEFAULT_THRESHOLD: u8 = 95;

/// UTC offset of the operational locale (America/Lima, no daylight saving)
pub const OPERATIONAL_UTC_OFFSET_HOURS: i32 = -5;

/// Alert threshold for one cycle, as an integer percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertThreshold(u8);

impl AlertThreshold {
    /// Wraps a percentage
    #[must_use]
    pub const fn new(percent: u8) -> Self {
        Self(percent)
    }

    /// Returns the percentage
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Returns true if `use_percent` meets or exceeds the threshold
    #[must_use]
    pub const fn is_met_by(self, use_percent: i64) -> bool {
        use_percent >= self.0 as i64
    }
}

impl fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Threshold for `date` with the built-in values: 93 on Fridays, 95 otherwise
#[must_use]
pub fn threshold_for_date(date: NaiveDate) -> AlertThreshold {
    ThresholdPolicy::default().for_date(date)
}

/// Maps a date in the operational locale to an [`AlertThreshold`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    offset: FixedOffset,
    friday: AlertThreshold,
    default: AlertThreshold,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            offset: operational_offset(OPERATIONAL_UTC_OFFSET_HOURS),
            friday: AlertThreshold(FRIDAY_THRESHOLD),
            default: AlertThreshold(DEFAULT_THRESHOLD),
        }
    }
}

/// Builds a fixed offset, falling back to UTC for out-of-range hours
fn operational_offset(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

impl ThresholdPolicy {
    /// Creates a policy with explicit values
    #[must_use]
    pub fn new(utc_offset_hours: i32, friday: u8, default: u8) -> Self {
        Self {
            offset: operational_offset(utc_offset_hours),
            friday: AlertThreshold(friday),
            default: AlertThreshold(default),
        }
    }

    /// UTC offset of the operational locale
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Threshold for a calendar date
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> AlertThreshold {
        if date.weekday() == Weekday::Fri {
            self.friday
        } else {
            self.default
        }
    }

    /// Calendar date of `instant` in the operational locale
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Threshold in force at `instant`
    #[must_use]
    pub fn at(&self, instant: DateTime<Utc>) -> AlertThreshold {
        self.for_date(self.local_date(instant))
    }
}
