//! Server configuration from flags and environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::service::DEFAULT_MAX_ATTEMPTS;

/// Which [`LockStore`](crate::LockStore) backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process memory; locks are lost on restart.
    Memory,
    /// One JSON file per lock under `--data-dir`.
    File,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "lock-states", version, about = "Named, key-authorized locks over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "LOCK_STATES_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    #[arg(long, env = "LOCK_STATES_STORE", value_enum, default_value = "memory")]
    pub store: StoreKind,

    /// Directory for the file store.
    #[arg(long, env = "LOCK_STATES_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Load/save cycles per request before a contended write gives up.
    #[arg(long, env = "LOCK_STATES_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Base URL shown on the usage page. Defaults to `http://<bind>`.
    #[arg(long, env = "LOCK_STATES_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Default log filter, overridden by `LOCK_STATES_LOG`.
    #[arg(long, env = "LOCK_STATES_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit JSON log lines.
    #[arg(long, env = "LOCK_STATES_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind))
    }
}
