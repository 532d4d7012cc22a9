use crate::execution::errors::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix of every environment variable read by [`ImportSettings::from_vars`].
pub const ENV_PREFIX: &str = "ASSET_IMPORT_";

/// Field names and switches for one import run.
///
/// Built once per run and handed to the on-start stage; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Column holding the serial number, the duplicate key.
    pub serial_field: String,
    pub category_field: String,
    pub sub_category_field: String,
    pub description_field: String,
    pub tag_field: String,
    /// Column holding the per-row ordinal.
    pub row_field: String,
    /// Column that links a row to its import set.
    pub import_set_field: String,
    /// Process only the first `test_run_max_rows` rows.
    pub test_run: bool,
    pub test_run_max_rows: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            serial_field: "u_serienr".to_string(),
            category_field: "u_computacenter_category".to_string(),
            sub_category_field: "u_cmdb_cat_".to_string(),
            description_field: "u_omschrijving".to_string(),
            tag_field: "u_tagnr".to_string(),
            row_field: "sys_import_row".to_string(),
            import_set_field: "sys_import_set".to_string(),
            test_run: false,
            test_run_max_rows: 20,
        }
    }
}

impl ImportSettings {
    /// Source columns the import depends on.
    pub fn source_field_names(&self) -> Vec<&str> {
        vec![
            self.serial_field.as_str(),
            self.category_field.as_str(),
            self.sub_category_field.as_str(),
            self.description_field.as_str(),
            self.tag_field.as_str(),
        ]
    }

    /// Overlays `ASSET_IMPORT_*` variables onto the defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        let fields: [(&str, &mut String); 7] = [
            ("SERIAL_FIELD", &mut settings.serial_field),
            ("CATEGORY_FIELD", &mut settings.category_field),
            ("SUB_CATEGORY_FIELD", &mut settings.sub_category_field),
            ("DESCRIPTION_FIELD", &mut settings.description_field),
            ("TAG_FIELD", &mut settings.tag_field),
            ("ROW_FIELD", &mut settings.row_field),
            ("IMPORT_SET_FIELD", &mut settings.import_set_field),
        ];

        for (name, slot) in fields {
            if let Some(value) = lookup(vars, name) {
                let value = value.trim();
                if value.is_empty() {
                    return Err(SettingsError::Empty {
                        key: format!("{ENV_PREFIX}{name}"),
                    });
                }
                *slot = value.to_string();
            }
        }

        if let Some(value) = lookup(vars, "TEST_RUN") {
            settings.test_run = parse_bool("TEST_RUN", value)?;
        }

        if let Some(value) = lookup(vars, "TEST_RUN_MAX_ROWS") {
            settings.test_run_max_rows =
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| SettingsError::Invalid {
                        key: format!("{ENV_PREFIX}TEST_RUN_MAX_ROWS"),
                        value: value.clone(),
                        reason: e.to_string(),
                    })?;
        }

        Ok(settings)
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a String> {
    vars.get(&format!("{ENV_PREFIX}{name}"))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SettingsError::Invalid {
            key: format!("{ENV_PREFIX}{name}"),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
