use crate::{file::csv::error::FileError, table::ImportTable};
use std::path::Path;
use tracing::info;

/// Loads an import table from a CSV file with a header row.
///
/// Header names are trimmed; cells are kept verbatim. Short records are allowed and
/// simply lack the trailing columns.
pub fn load_csv(path: impl AsRef<Path>, table: &str) -> Result<ImportTable, FileError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FileError::NotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(FileError::InvalidFormat(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut import_table = ImportTable::new(table, columns.clone());
    for record in reader.records() {
        let record = record?;
        import_table.push(
            columns
                .iter()
                .zip(record.iter())
                .map(|(c, v)| (c.clone(), v.to_string())),
        );
    }

    info!(
        "Loaded {} rows into import table '{}' from {}",
        import_table.len(),
        table,
        path.display()
    );
    Ok(import_table)
}
