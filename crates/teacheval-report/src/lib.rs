//! teacheval-report: Rendering of rankings and record lists.

pub mod json;
pub mod markdown;

pub use json::{masked_records, SummaryReport};
