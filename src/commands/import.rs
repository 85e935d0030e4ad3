use anyhow::Result;
use colored::Colorize;
use ghcp_stats::{config::Config, importer::GithubImporter, store::MetricStore};
use tracing::info;

/// Execute the import command
///
/// Fetches the Copilot metrics of every configured organization and stores
/// the days that are not in the database yet.
pub async fn execute(cfg: Config) -> Result<()> {
    if cfg.github.orgs.is_empty() {
        println!("{}", "No organizations configured (github.orgs)".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Importing metrics for {} organization(s)...", cfg.github.orgs.len()).yellow()
    );

    let store = MetricStore::connect(&cfg.database.path).await?;
    let importer = GithubImporter::from_config(&cfg.github)?;
    let summary = importer.import_all(&store, &cfg.github.orgs).await?;

    info!(
        orgs = summary.orgs,
        fetched = summary.fetched,
        inserted = summary.inserted,
        "Import finished"
    );

    println!("{}", "✓ Import complete".green());
    println!("  Organizations: {}", summary.orgs);
    println!("  Days fetched:  {}", summary.fetched);
    println!("  New snapshots: {}", summary.inserted);

    Ok(())
}
