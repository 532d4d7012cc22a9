use crate::error::CliError;
use engine_core::{metrics::MetricsSnapshot, state::PublishedIgnoreSet};
use engine_processing::onstart::OnStartOutcome;
use serde::Serialize;

#[derive(Serialize)]
struct RunReport<'a> {
    outcome: &'a OnStartOutcome,
    metrics: MetricsSnapshot,
}

pub async fn report_run(
    outcome: &OnStartOutcome,
    metrics: MetricsSnapshot,
    path: Option<String>,
) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&RunReport { outcome, metrics })?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}

pub fn print_published(published: &PublishedIgnoreSet, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(published)?);
        return Ok(());
    }

    println!("Ignore set for run '{}':", published.run_id);
    println!("-----------------------------");
    println!("{:<16} {}", "Import set", published.import_set);
    println!("{:<16} {}", "Table", published.table);
    println!("{:<16} {}", "Published", published.published_at.to_rfc3339());
    println!("{:<16} {}", "Rows ignored", published.rows.len());
    let rows: Vec<String> = published.rows.iter().map(|r| r.to_string()).collect();
    println!("{:<16} {}", "Row ids", rows.join(", "));
    Ok(())
}
