use crate::error::CliError;
use model::execution::settings::ImportSettings;
use std::{collections::HashMap, fs, path::Path};

/// Process environment overlaid with `.env` files; the source of [`ImportSettings`].
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Values from the file win over values already present.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn settings(&self) -> Result<ImportSettings, CliError> {
        Ok(ImportSettings::from_vars(&self.vars)?)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    idx + 1
                ))
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    idx + 1
                )));
            }

            self.vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
