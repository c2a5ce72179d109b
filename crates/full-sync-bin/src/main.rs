//! Full Sync - streams a table's records into bulk writes against a target store.

mod table_syncer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sync_config_and_utils::{init_logging, Config, Paths};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

/// Full sync command-line interface.
#[derive(Parser)]
#[command(name = "full-sync")]
#[command(about = "Batch a table's records into bulk writes against a target store")]
#[command(version)]
struct Cli {
    /// Table to sync. Becomes the collection of the target namespace.
    #[arg(short, long)]
    table: String,

    /// JSONL source, one record per line. `-` reads stdin.
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Config file. Defaults to <base-dir>/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Base directory for config and logs. Defaults to ~/.full-sync
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            config.load_from_env();
            config
        }
        None => Config::load(&paths)?,
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate()?;

    init_logging(&config.log_level, Some(paths.log_file()));
    info!(
        source_id = %config.source_id,
        target_type = %config.target_type,
        target_address = %config.target_address,
        document_syncers = config.document_syncer_count,
        "Configuration loaded"
    );

    let reader = open_input(&cli.input).await?;
    let summary = table_syncer::sync_table(0, &cli.table, &config, reader)
        .await
        .with_context(|| format!("full sync of table {} failed", cli.table))?;

    info!(
        table = %cli.table,
        lines = summary.feed.lines,
        unrecognized = summary.feed.unrecognized,
        batches = summary.written.batches,
        records = summary.written.records,
        bytes = summary.written.bytes,
        "Full sync finished"
    );
    Ok(())
}

async fn open_input(input: &str) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(input)
        .await
        .with_context(|| format!("opening input {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}
