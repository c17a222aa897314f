use anyhow::Context;
use clap::Parser;
use set_archive::core::{ConfigProvider, RunSummary};
use set_archive::utils::logger::{self, LogFormat};
use set_archive::utils::validation::Validate;
use set_archive::{CliConfig, EtlEngine, LocalStorage, SetPipeline, Store, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let log_format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(cli.verbose, log_format);

    tracing::info!("Starting set-archive");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match cli.config.clone() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            run(config).await
        }
        None => run(cli).await,
    };

    match outcome {
        Ok(summary) => {
            tracing::info!(
                "Run completed: {} pages, {} sets kept of {}, {} icons downloaded ({} skipped, {} failed), {} rows inserted",
                summary.pages,
                summary.kept,
                summary.normalized,
                summary.icons.downloaded,
                summary.icons.skipped,
                summary.icons.failed,
                summary.persisted
            );
            println!("✅ Processed {} sets", summary.kept);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Run aborted: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run<C: ConfigProvider + Validate>(config: C) -> set_archive::Result<RunSummary> {
    config.validate()?;

    let store = Store::open(config.database_path())?;
    store.ensure_schema().await?;

    let storage = LocalStorage::new(config.icon_root());
    let pipeline = SetPipeline::new(storage, config, store)?;

    EtlEngine::new(pipeline).run().await
}
