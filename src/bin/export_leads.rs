//! Writes stored leads as CSV, optionally filtered by a search term.

use clap::Parser;
use osint_leads_api::config::Config;
use osint_leads_api::csv_io::{export_filename, write_export};
use osint_leads_api::db::Database;
use osint_leads_api::db_storage::LeadStore;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export_leads", about = "Export stored leads as CSV")]
struct Args {
    /// Output file; `-` writes to stdout. Defaults to leads_YYYY-MM-DD.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only export leads whose company, input or contact name contains this term
    #[arg(short, long)]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    let store = LeadStore::new(db.pool.clone());

    let mut leads = store.list().await?;
    if let Some(term) = args.search.as_deref() {
        leads.retain(|lead| lead.matches(term));
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_filename(chrono::Local::now().date_naive())));

    if output.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_export(&leads, config.export_utc_offset_hours, &mut handle)?;
        handle.flush()?;
    } else {
        let file = File::create(&output)
            .map_err(|e| anyhow::anyhow!("cannot create {}: {}", output.display(), e))?;
        write_export(&leads, config.export_utc_offset_hours, file)?;
        tracing::info!("Exported {} lead(s) to {}", leads.len(), output.display());
    }

    Ok(())
}
