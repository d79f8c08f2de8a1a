//! Comma-separated text tokenizer.

use std::borrow::Cow;

use crate::error::DatasetResult;

/// One non-blank input line split into trimmed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    pub cells: Vec<String>,
}

/// Split `text` into records.
///
/// Rules:
///
/// - `\r` is stripped and lines end at `\n`.
/// - Cells are separated by `,` and trimmed. Quotes are ordinary characters, so an
///   embedded comma always starts a new cell.
/// - Lines with no cells, or only empty cells, are dropped wherever they occur.
///
/// Records may have different widths; callers validate them against the header.
pub fn read_records(text: &str) -> DatasetResult<Vec<RawRecord>> {
    // Empty lines are removed up front so that every csv record maps to one source line.
    let mut line_numbers = Vec::new();
    let mut kept = String::with_capacity(text.len());
    for (idx0, line) in text.split('\n').enumerate() {
        let line: Cow<'_, str> = if line.contains('\r') {
            Cow::Owned(line.replace('\r', ""))
        } else {
            Cow::Borrowed(line)
        };
        if line.is_empty() {
            continue;
        }
        line_numbers.push(idx0 + 1);
        kept.push_str(&line);
        kept.push('\n');
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(kept.as_bytes());

    let mut out = Vec::with_capacity(line_numbers.len());
    for (result, line) in rdr.records().zip(line_numbers) {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        out.push(RawRecord {
            line,
            cells: record.iter().map(str::to_owned).collect(),
        });
    }
    Ok(out)
}
