use crate::{commands::Commands, env::EnvManager, error::CliError};
use clap::Parser;
use connectors::{file::csv::source::load_csv, query::RowQuery};
use engine_core::{
    context::run::TransformMap,
    state::{IgnoreSetStore, sled_store::SledIgnoreSetStore},
};
use engine_processing::{onstart::OnStartStage, setup::RequiredFieldsSetup};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "asset-import",
    version = "0.1.0",
    about = "On-start stage for asset imports: shared setup and duplicate serial detection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            import_set,
            map,
            source_table,
            target_table,
            env_file,
            state_dir,
            output,
        } => {
            let mut env = EnvManager::from_process();
            if let Some(path) = env_file {
                env.load_from_file(path)?;
            }
            let settings = env.settings()?;

            let source_table = source_table.unwrap_or_else(|| table_name_from(&input));
            let table: Arc<dyn RowQuery> = Arc::new(load_csv(&input, &source_table)?);
            let store = open_state_store(state_dir.as_deref())?;

            let stage = OnStartStage::new(
                Arc::new(RequiredFieldsSetup::new(table.clone())),
                table,
                store,
            );

            let map = map.map(|name| TransformMap::new(name, source_table, target_table));
            let outcome = stage.start(map, import_set.into(), settings).await?;

            info!(
                "Run {} finished; show it again with `asset-import show --run {}`",
                outcome.run_id, outcome.run_id
            );
            output::report_run(&outcome, stage.metrics().snapshot(), output).await?;
        }
        Commands::Show {
            run,
            state_dir,
            json,
        } => {
            let store = open_state_store(state_dir.as_deref())?;
            let published = store
                .load(&run.as_str().into())
                .await?
                .ok_or_else(|| CliError::RunNotFound(run.clone()))?;
            output::print_published(&published, json)?;
        }
    }

    Ok(())
}

fn table_name_from(input: &str) -> String {
    Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import_table")
        .to_string()
}

fn open_state_store(dir: Option<&str>) -> Result<Arc<dyn IgnoreSetStore>, CliError> {
    let path = match dir {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .ok_or_else(|| CliError::Unexpected("Could not determine home directory".into()))?
            .join(".asset-import/state"),
    };
    let store = SledIgnoreSetStore::open(&path)?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_defaults_to_file_stem() {
        assert_eq!(table_name_from("/tmp/u_stock_import.csv"), "u_stock_import");
        assert_eq!(table_name_from("plain"), "plain");
    }

    #[test]
    fn cli_parses_run_arguments() {
        let cli = Cli::parse_from([
            "asset-import",
            "run",
            "--input",
            "rows.csv",
            "--import-set",
            "ISET0001",
            "--map",
            "Voorraadlijst",
        ]);
        match cli.command {
            Commands::Run {
                map, target_table, ..
            } => {
                assert_eq!(map.as_deref(), Some("Voorraadlijst"));
                assert_eq!(target_table, "alm_hardware");
            }
            _ => panic!("expected run command"),
        }
    }
}
