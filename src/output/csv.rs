//! CSV export of the measurement record

use std::io::{self, Write};

use crate::stats::MeasureRecord;

use super::utils::csv_field;

/// Write `Path,Identifier,<measures...>`, one row per measured path.
///
/// Rows follow the identifiers of the first requested measure in sorted
/// order. Not-applicable values are written as empty fields.
pub fn write_csv<W: Write>(record: &MeasureRecord, out: &mut W) -> io::Result<usize> {
    let mut header = vec!["Path".to_string(), "Identifier".to_string()];
    header.extend(record.measures.iter().map(|m| m.name().to_string()));
    writeln!(out, "{}", header.join(","))?;

    let Some(first) = record.measures.first().and_then(|m| record.get(*m)) else {
        return Ok(0);
    };

    let mut rows = 0;
    for (identifier, paths) in first {
        for path in paths.keys() {
            let path_text = path.to_string_lossy();
            let mut row = vec![csv_field(&path_text).into_owned(), csv_field(identifier).into_owned()];
            for measure in &record.measures {
                let cell = record
                    .value(*measure, identifier, path)
                    .flatten()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                row.push(cell);
            }
            writeln!(out, "{}", row.join(","))?;
            rows += 1;
        }
    }
    Ok(rows)
}
