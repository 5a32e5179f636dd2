//! Reconstructing a schedule from a previously exported project.
//!
//! The inverse of emission: only the delivery fields matter. A field
//! qualifies when its name ends in `_dNN_sNN` and its annotation
//! carries `@CALCDATE`; timing that cannot be parsed degrades to the
//! documented defaults (9:00 start, 90 minutes) instead of failing
//! the import. A bad row never aborts the whole file.

use regex::Regex;

use crate::schedule::SampleInstance;
use crate::types::{Day, Minutes};

/// Fallback window start when an annotation is unparseable: 9:00.
pub const DEFAULT_START: Minutes = 540;
/// Fallback window duration when an annotation is unparseable.
pub const DEFAULT_DURATION: Minutes = 90;

/// One field row as read back from an exported data dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedField {
    pub name: String,
    pub form: String,
    pub field_type: String,
    pub calculation: String,
    pub annotation: String,
}

/// Parse exported data-dictionary CSV text into field rows. The first
/// record is treated as the header and skipped. Short rows are
/// tolerated; missing cells read as empty.
pub fn parse_data_dictionary(csv: &str) -> Vec<ImportedField> {
    let records = parse_csv(csv);
    records
        .into_iter()
        .skip(1)
        .filter(|cells| !cells.is_empty() && !cells[0].is_empty())
        .map(|cells| {
            let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
            ImportedField {
                name: cell(0),
                form: cell(1),
                field_type: cell(3),
                calculation: cell(5),
                annotation: cell(17),
            }
        })
        .collect()
}

/// Rebuild the sample list from imported fields.
///
/// Day and sample number come from the field name; window start and
/// duration come from the `@CALCDATE` arithmetic, tolerating an
/// optional interposed jitter-offset reference. Output is sorted
/// day-major to restore expander order.
pub fn reconstruct_samples(fields: &[ImportedField]) -> Vec<SampleInstance> {
    let Ok(name_re) = Regex::new(r"_d(\d+)_s(\d+)$") else {
        return vec![];
    };
    let Ok(calc_re) = Regex::new(
        r"@CALCDATE\([^,]+,\s*\((\d+)\s*\*\s*1440\)\s*\+\s*(\d+)\s*\+\s*(?:\[[a-z0-9_]+\]\s*\+\s*)?mod\([^,]+,\s*(\d+)\)",
    ) else {
        return vec![];
    };

    let mut samples: Vec<SampleInstance> = fields
        .iter()
        .filter(|f| f.annotation.contains("@CALCDATE"))
        .filter_map(|field| {
            let caps = name_re.captures(&field.name)?;
            let day: Day = caps.get(1)?.as_str().parse().ok()?;
            let sample_number: u32 = caps.get(2)?.as_str().parse().ok()?;
            if day == 0 || sample_number == 0 {
                return None;
            }

            let (start, duration) = match calc_re.captures(&field.annotation) {
                Some(timing) => {
                    let start = timing.get(2).and_then(|m| m.as_str().parse().ok());
                    let duration = timing
                        .get(3)
                        .and_then(|m| m.as_str().parse().ok())
                        .filter(|&d: &Minutes| d > 0);
                    (
                        start.unwrap_or(DEFAULT_START),
                        duration.unwrap_or(DEFAULT_DURATION),
                    )
                }
                None => {
                    log::warn!(
                        "field '{}': unparseable @CALCDATE annotation, using defaults",
                        field.name
                    );
                    (DEFAULT_START, DEFAULT_DURATION)
                }
            };

            Some(SampleInstance {
                day,
                window: sample_number as usize - 1,
                start,
                duration,
            })
        })
        .collect();

    samples.sort_by_key(|s| (s.day, s.window));
    samples
}

/// Minimal CSV record reader: comma-separated cells, optional double
/// quotes, `""` escapes, newlines allowed inside quoted cells.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                records.push(std::mem::take(&mut record));
            }
            _ => cell.push(c),
        }
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }
    records
}
