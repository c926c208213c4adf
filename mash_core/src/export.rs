//! CSV export of the result table.

use crate::{Result, ResultEntry, ResultKey, ResultTable};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    slot: String,
    label: String,
    value: f64,
    gallons: Option<f64>,
    status: Option<&'static str>,
}

impl From<(&ResultKey, &ResultEntry)> for CsvRow {
    fn from((key, entry): (&ResultKey, &ResultEntry)) -> Self {
        CsvRow {
            slot: key.to_string(),
            label: key.label(),
            value: entry.value,
            gallons: entry.gallons,
            status: entry.good.map(|good| if good { "good" } else { "bad" }),
        }
    }
}

/// Write every slot of `table` as CSV (with headers) to `writer`
pub fn write_csv<W: Write>(writer: W, table: &ResultTable) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut count = 0;
    for entry in table.entries() {
        writer.serialize(CsvRow::from(entry))?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

/// Export the result table to a CSV file, replacing any existing file
pub fn export_csv(path: &Path, table: &ResultTable) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let count = write_csv(file, table)?;

    tracing::info!("Exported {} result rows to {:?}", count, path);
    Ok(count)
}
