//! Capacity report parsing
//!
//! Turns the free-form output of the appliance's disk usage report into
//! [`CapacityFigures`](crate::models::CapacityFigures). Only the line carrying
//! the data-volume marker is looked at; every other row is ignored.
//!
//! The column layout is described as data in [`DATA_VOLUME_SCHEMA`], so a
//! format change on the remote side is a one-entry edit.

mod parser;
mod schema;

pub use parser::{
    CapacityReportParser, CoercionAnomaly, DEFAULT_COMMAND, DEFAULT_MARKER, ParseError, ParseMode,
    ParseResult, ParsedReport,
};
pub use schema::{
    CapacityField, Conversion, DATA_VOLUME_SCHEMA, FieldSpec, MARKER_TOKENS, MIN_TOKENS,
};
