//! Tabular source reading
//!
//! Sources are CSV exports of the order spreadsheet. The whole file is read
//! into memory; order sheets are a few hundred rows at most.

use std::path::Path;
use std::time::Duration;

use super::ImportError;

/// Header row plus data rows, every cell trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Cell at `column` of `row`, `None` when absent or blank
    pub fn cell<'a>(row: &'a [String], column: usize) -> Option<&'a str> {
        row.get(column).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Parse CSV bytes into a [`SourceTable`]
///
/// Ragged rows are accepted; short rows simply have missing cells.
pub fn parse_csv(bytes: &[u8]) -> Result<SourceTable, ImportError> {
    // Strip UTF-8 BOM if present (spreadsheet exports often carry one)
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::SourceUnavailable(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::SourceUnavailable(
            "Source has no header row".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            ImportError::SourceUnavailable(format!("Malformed CSV record {}: {}", index + 1, e))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV source");

    Ok(SourceTable { headers, rows })
}

/// Read a source file with an upper bound on the wait
pub async fn read_source_file(path: &Path, timeout: Duration) -> Result<Vec<u8>, ImportError> {
    match tokio::time::timeout(timeout, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(ImportError::SourceUnavailable(format!(
            "Cannot read {}: {}",
            path.display(),
            e
        ))),
        Err(_) => Err(ImportError::SourceUnavailable(format!(
            "Timed out after {:?} reading {}",
            timeout,
            path.display()
        ))),
    }
}
