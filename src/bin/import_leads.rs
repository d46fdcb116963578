//! Batch import of a header-less CSV file: every row is enriched and stored.

use clap::Parser;
use osint_leads_api::batch::BatchOrchestrator;
use osint_leads_api::config::Config;
use osint_leads_api::csv_io::read_import_rows;
use osint_leads_api::db::Database;
use osint_leads_api::db_storage::LeadStore;
use osint_leads_api::services::GeminiService;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "import_leads", about = "Enrich and store every row of a CSV file")]
struct Args {
    /// CSV file with one lead per row and no header
    file: PathBuf,

    /// Enrichment calls in flight (defaults to BATCH_CONCURRENCY)
    #[arg(short, long)]
    concurrency: Option<usize>,
}

/// Main entry point for the import script.
///
/// Reads the rows up front, then enriches and stores them one by one,
/// printing `[current/total]` after each row.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let file = File::open(&args.file)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", args.file.display(), e))?;
    let rows = read_import_rows(file)?;
    tracing::info!("Read {} row(s) from {}", rows.len(), args.file.display());

    let db = Database::new(&config.database_url).await?;
    let store = LeadStore::new(db.pool.clone());
    let enricher = GeminiService::new(&config)?;

    let orchestrator =
        BatchOrchestrator::with_concurrency(args.concurrency.unwrap_or(config.batch_concurrency));
    let summary = orchestrator
        .run(&enricher, &store, rows, |progress| {
            println!("[{}/{}]", progress.current, progress.total);
        })
        .await;

    println!(
        "Done: {} inserted, {} failed, {} skipped (of {})",
        summary.inserted, summary.failed, summary.skipped, summary.total
    );

    Ok(())
}
