//! Composition of the daily report message.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::aggregator::{ReportSummary, REPORT_TIMESTAMP_FORMAT};
use crate::artifact::{summary_keys, DataLayout, SummaryKey};
use crate::notifier::ReportMessage;

/// Builds the report message from finished summaries.
///
/// Sections are emitted in report order (Aqua, Terra, VIIRS, each
/// quicklook then refined), each followed by a blank line. A section
/// missing from `summaries` is rendered as an empty one.
pub fn compose_message(
    summaries: &BTreeMap<SummaryKey, ReportSummary>,
    layout: &DataLayout,
    printed_at: DateTime<Utc>,
) -> ReportMessage {
    let timestamp = printed_at.format(REPORT_TIMESTAMP_FORMAT);
    let subject = format!("Generate Daily Processing Report {} UTC", timestamp);

    let mut body = format!("Generate Processing Report for {} UTC\n\n", timestamp);
    for key in summary_keys() {
        match summaries.get(&key) {
            Some(summary) => body.push_str(&summary.render()),
            None => {
                let mut empty = ReportSummary::new(key, layout);
                empty.finish(printed_at);
                body.push_str(&empty.render());
            }
        }
        body.push('\n');
    }

    ReportMessage { subject, body }
}
