use crate::error::SharedSetupError;
use async_trait::async_trait;
use connectors::query::RowQuery;
use engine_core::context::run::RunContext;
use std::sync::Arc;
use tracing::info;

/// Setup shared by every transform map, run once before duplicate detection.
#[async_trait]
pub trait SharedSetup: Send + Sync {
    async fn perform(&self, ctx: &RunContext) -> Result<(), SharedSetupError>;
}

/// Checks that the import table carries every configured source field.
pub struct RequiredFieldsSetup {
    query: Arc<dyn RowQuery>,
}

impl RequiredFieldsSetup {
    pub fn new(query: Arc<dyn RowQuery>) -> Self {
        Self { query }
    }
}

#[async_trait]
impl SharedSetup for RequiredFieldsSetup {
    async fn perform(&self, ctx: &RunContext) -> Result<(), SharedSetupError> {
        let table = &ctx.map().source_table;
        let columns = self.query.fields(table).await?;
        let settings = ctx.settings();

        let missing: Vec<String> = settings
            .source_field_names()
            .into_iter()
            .chain([settings.row_field.as_str(), settings.import_set_field.as_str()])
            .filter(|f| !columns.iter().any(|c| c.eq_ignore_ascii_case(f)))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(SharedSetupError::MissingFields {
                table: table.clone(),
                fields: missing,
            });
        }

        info!(
            "Shared setup done for map '{}' (run {}, today {})",
            ctx.map().name,
            ctx.run_id(),
            ctx.date_today().date_naive()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::table::ImportTable;
    use engine_core::context::run::TransformMap;
    use model::execution::settings::ImportSettings;

    fn ctx() -> RunContext {
        RunContext::new(
            Some(TransformMap::new("Mutatielijst", "u_mutations", "alm_hardware")),
            "ISET1".into(),
            ImportSettings::default(),
        )
        .unwrap()
    }

    fn table(columns: &[&str]) -> Arc<dyn RowQuery> {
        Arc::new(ImportTable::new(
            "u_mutations",
            columns.iter().map(|c| c.to_string()).collect(),
        ))
    }

    #[tokio::test]
    async fn passes_when_all_fields_exist() {
        let setup = RequiredFieldsSetup::new(table(&[
            "sys_import_set",
            "sys_import_row",
            "u_serienr",
            "U_COMPUTACENTER_CATEGORY",
            "u_cmdb_cat_",
            "u_omschrijving",
            "u_tagnr",
        ]));
        setup.perform(&ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn names_every_missing_field() {
        let setup = RequiredFieldsSetup::new(table(&["sys_import_set", "sys_import_row", "u_serienr"]));
        let err = setup.perform(&ctx()).await.unwrap_err();

        match err {
            SharedSetupError::MissingFields { table, fields } => {
                assert_eq!(table, "u_mutations");
                assert_eq!(
                    fields,
                    vec![
                        "u_computacenter_category",
                        "u_cmdb_cat_",
                        "u_omschrijving",
                        "u_tagnr"
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_table_surfaces_as_query_error() {
        let setup = RequiredFieldsSetup::new(Arc::new(ImportTable::new("other", Vec::new())));
        let err = setup.perform(&ctx()).await.unwrap_err();
        assert!(matches!(err, SharedSetupError::Query(_)));
    }
}
