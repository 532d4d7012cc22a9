use crate::{
    core::identifiers::RowId,
    execution::errors::{RowError, RowField},
};
use serde::{Deserialize, Serialize};

/// One source record of an import set, reduced to what duplicate detection needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Business key (serial number). Not unique within a batch.
    pub key: String,
    pub row: RowId,
}

impl ImportRow {
    pub fn new(key: impl Into<String>, row: u64) -> Self {
        ImportRow {
            key: key.into(),
            row: RowId(row),
        }
    }
}

/// A row as returned by a query collaborator: (key, row id) projection where either
/// column may be absent or unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub key: Option<String>,
    pub row: Option<RowId>,
}

impl ProjectedRow {
    pub fn new(key: Option<String>, row: Option<RowId>) -> Self {
        ProjectedRow { key, row }
    }
}

impl TryFrom<ProjectedRow> for ImportRow {
    type Error = RowError;

    fn try_from(projected: ProjectedRow) -> Result<Self, Self::Error> {
        let key = projected
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or(RowError::Missing(RowField::Key))?;
        let row = projected.row.ok_or(RowError::Missing(RowField::RowId))?;
        Ok(ImportRow { key, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_projection_converts() {
        let row = ImportRow::try_from(ProjectedRow::new(Some("SN-1".into()), Some(RowId(7))));
        assert_eq!(row, Ok(ImportRow::new("SN-1", 7)));
    }

    #[test]
    fn blank_key_is_missing() {
        let err = ImportRow::try_from(ProjectedRow::new(Some("  ".into()), Some(RowId(1))))
            .unwrap_err();
        assert_eq!(err, RowError::Missing(RowField::Key));
    }

    #[test]
    fn absent_row_id_is_missing() {
        let err = ImportRow::try_from(ProjectedRow::new(Some("SN-1".into()), None)).unwrap_err();
        assert_eq!(err, RowError::Missing(RowField::RowId));
    }
}
