//! Coordinator process entry point

use clap::Parser;
use shared::{ProcessId, logging, process_debug};

use coordinator::{Coordinator, CoordinatorConfig, CoordinatorResult, FileArtifactStore, FileCursorStore};

#[tokio::main]
async fn main() -> CoordinatorResult<()> {
    // Values from .env become defaults for the env-backed flags
    dotenv::dotenv().ok();
    let config = CoordinatorConfig::parse();

    ProcessId::init_coordinator();
    logging::init_tracing_with_level(Some(&config.log_level));

    config.validate()?;
    let address = config.bind_address()?;
    let layout = config.layout();

    process_debug!(
        ProcessId::current(),
        "Store: {}, poll every {:?}, wait up to {:?}, {} samples",
        layout.root().display(),
        config.poll_interval(),
        config.max_wait(),
        config.total_samples
    );

    let cursor = FileCursorStore::new(&layout);
    let store = FileArtifactStore::new(layout);
    let coordinator = Coordinator::new(cursor, store, config.submission_settings());

    coordinator.prepare_store().await?;
    coordinator.run(address).await?;

    logging::log_success(ProcessId::current(), "Coordinator stopped gracefully");
    Ok(())
}
