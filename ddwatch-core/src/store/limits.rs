//! Numeric column limits of the metrics store.
//!
//! Capacity columns are NUMBER(18,2): 16 integer digits. The percentage
//! column is deliberately not bounded, out-of-range percentages are stored
//! as reported.

use crate::models::CapacityReading;
use crate::report::CapacityField;

/// Largest magnitude a capacity column accepts
pub const CAPACITY_COLUMN_LIMIT: f64 = 1e16;

/// Checks a reading against the column limits.
///
/// Returns one message per offending field; empty when the reading fits.
#[must_use]
pub fn check_column_limits(reading: &CapacityReading) -> Vec<String> {
    let f = &reading.figures;
    [
        (CapacityField::Total, f.total_gb),
        (CapacityField::Used, f.used_gb),
        (CapacityField::Available, f.available_gb),
        (CapacityField::Reclaimable, f.reclaimable_gb),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        if value.is_finite() {
            (value.abs() > CAPACITY_COLUMN_LIMIT)
                .then(|| format!("{field} ({value}) exceeds NUMBER(18,2)"))
        } else {
            Some(format!("{field} ({value}) is not finite"))
        }
    })
    .collect()
}
