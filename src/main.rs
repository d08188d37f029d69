use std::sync::Arc;

use clap::Parser;
use lock_states::config::{Config, StoreKind};
use lock_states::http::{self, AppState};
use lock_states::{logging, FileLockStore, InMemoryLockStore, LockService, LockStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init_logging(&config.log_level, config.log_json)?;

    match config.store {
        StoreKind::Memory => run(InMemoryLockStore::new(), &config).await,
        StoreKind::File => {
            let store = FileLockStore::open(&config.data_dir)?;
            info!(dir = %store.dir().display(), "using file store");
            run(store, &config).await
        }
    }
}

async fn run<S: LockStore + 'static>(store: S, config: &Config) -> anyhow::Result<()> {
    let service = LockService::new(store).with_max_attempts(config.max_attempts);
    let state = Arc::new(AppState::new(service, config.public_url()));
    http::serve(state, &config.bind).await?;
    Ok(())
}
