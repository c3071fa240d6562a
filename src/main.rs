use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use coin_history_cli::artifacts::JsonArtifactDir;
use coin_history_cli::cli::{Cli, Mode};
use coin_history_cli::config::Config;
use coin_history_cli::fetch::HistoryFetcher;
use coin_history_cli::ingest::{CooldownPolicy, Ingestor};
use coin_history_cli::store::PriceStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mode = cli.mode()?;
    let config = Config::from_env()?;

    let fetcher = HistoryFetcher::new(&config.api_base, &config.api_key, config.request_timeout)?;
    let sink = JsonArtifactDir::new(&config.artifacts_dir);
    sink.prepare()?;

    let store = if cli.store_db {
        let store = PriceStore::connect(config.require_database_url()?).await?;
        store.ensure_schema().await?;
        Some(store)
    } else {
        None
    };

    let ingestor = Ingestor::new(fetcher, sink, store, CooldownPolicy::new(config.cooldown));

    let report = match mode {
        Mode::Single(day) => ingestor.run_single(&cli.coin, day).await?,
        Mode::Range(start, end) => ingestor.run_range(&cli.coin, start, end).await?,
    };

    println!(
        "days processed successfully: {}/{}",
        report.succeeded, report.attempted
    );
    Ok(())
}
