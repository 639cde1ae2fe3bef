use anyhow::Context;
use conduit::kernel::config::load_settings;
use conduit_daemon::{DEFAULT_CONFIG_PATH, Daemon};
use conduit_logger::Logger;
use std::path::PathBuf;

#[conduit_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    let loaded = load_settings(Some(&path))
        .with_context(|| format!("Critical: Configuration at {} is malformed", path.display()))?;

    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).config(&loaded.config.logging)?.init()?;

    Daemon::builder().loaded(loaded).build()?.run().await
}
