use clap::Parser;

use vdw_search::config::AppConfig;
use vdw_search::state::AppState;

/// Clear and rebuild the search index from the content store.
#[derive(Debug, Parser)]
#[command(name = "reindex", version)]
struct Args {
    /// Only clear the index, do not rebuild.
    #[arg(long)]
    clear_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vdw_search::init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Search index rebuild failed: {e}");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let state = AppState::connect(&config).await?;

    tracing::info!(index = %config.index_name, "Clearing search index");
    state.indexer.clear().await?;

    if args.clear_only {
        tracing::info!("Index clearing completed");
        return Ok(());
    }

    tracing::info!("Initializing search index settings");
    state.index_manager.initialize().await?;

    let entities = state.content_repo.stream_published().await?;
    let stats = state.indexer.bulk_reindex(entities).await?;

    if stats.indexed == 0 {
        tracing::warn!("No published pages found to index");
    } else {
        tracing::info!(
            indexed = stats.indexed,
            batches = stats.batches,
            "Search index rebuilt"
        );
    }

    Ok(())
}
