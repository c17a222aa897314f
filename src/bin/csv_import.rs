use anyhow::Context;
use clap::Parser;
use set_archive::adapters::csv_import::{DEFAULT_DELIMITER, DEFAULT_TABLE};
use set_archive::utils::logger::{self, LogFormat};
use set_archive::{CsvImporter, Store};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csv_import")]
#[command(about = "Bulk-load every CSV file under a directory into one table")]
struct Args {
    /// Directory scanned recursively for *.csv files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "archive.db")]
    database: PathBuf,

    /// Target table; it must already exist
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Field delimiter
    #[arg(long, default_value_t = DEFAULT_DELIMITER as char)]
    delimiter: char,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_logger(args.verbose, LogFormat::Compact);

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let store = Store::open(&args.database)
        .with_context(|| format!("failed to open database '{}'", args.database.display()))?;
    let importer = CsvImporter::new(store, &args.table)?.with_delimiter(args.delimiter as u8);

    let summary = importer
        .import_dir(&args.data_dir)
        .await
        .with_context(|| format!("import from '{}' failed", args.data_dir.display()))?;

    tracing::info!(
        "Imported {} rows from {} files into {}",
        summary.rows,
        summary.files,
        args.table
    );
    Ok(())
}
