use crate::{
    core::identifiers::ImportSetId,
    execution::errors::RowError,
    records::row::{ImportRow, ProjectedRow},
};

/// Ordered rows of one import set. The order is significant: duplicate resolution keeps
/// the first row it sees for each key.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub import_set: ImportSetId,
    pub rows: Vec<ImportRow>,
}

/// A projected row that could not be turned into an [`ImportRow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// Position of the offending row in the fetched sequence.
    pub position: usize,
    pub error: RowError,
}

impl ImportBatch {
    pub fn new(import_set: ImportSetId, rows: Vec<ImportRow>) -> Self {
        Self { import_set, rows }
    }

    /// Builds a batch from query output, failing on the first malformed row.
    pub fn from_projected(
        import_set: ImportSetId,
        projected: Vec<ProjectedRow>,
    ) -> Result<Self, MalformedRow> {
        let rows = projected
            .into_iter()
            .enumerate()
            .map(|(position, p)| {
                ImportRow::try_from(p).map_err(|error| MalformedRow { position, error })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { import_set, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::identifiers::RowId, execution::errors::RowField};

    #[test]
    fn from_projected_keeps_order() {
        let batch = ImportBatch::from_projected(
            "iset".into(),
            vec![
                ProjectedRow::new(Some("B".into()), Some(RowId(2))),
                ProjectedRow::new(Some("A".into()), Some(RowId(1))),
            ],
        )
        .unwrap();

        assert_eq!(
            batch.rows,
            vec![ImportRow::new("B", 2), ImportRow::new("A", 1)]
        );
    }

    #[test]
    fn from_projected_reports_position_of_malformed_row() {
        let err = ImportBatch::from_projected(
            "iset".into(),
            vec![
                ProjectedRow::new(Some("A".into()), Some(RowId(1))),
                ProjectedRow::new(None, Some(RowId(2))),
            ],
        )
        .unwrap_err();

        assert_eq!(err.position, 1);
        assert_eq!(err.error, RowError::Missing(RowField::Key));
    }

    #[test]
    fn malformed_row_can_be_cloned_into_reports() {
        let err = ImportBatch::from_projected(
            "iset".into(),
            vec![ProjectedRow::new(Some("A".into()), None)],
        )
        .unwrap_err();

        let copy = err.clone();
        assert_eq!(copy, err);
        assert_eq!(copy.error, RowError::Missing(RowField::RowId));
    }
}
