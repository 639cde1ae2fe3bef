//! # Conduit Daemon
//!
//! Loads the configuration, binds every configured project to the services registered in
//! the process and keeps running until a shutdown signal arrives.
//!
//! ## Example
//! ```no_run
//! use conduit_daemon::Daemon;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Daemon::builder()
//!         .config_path("conduit.toml")
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

use anyhow::{Context, Result};
use conduit::domain::config::ConduitConfig;
use conduit::kernel::config::{LoadedConfig, load_settings};
use conduit::projects::{ProjectRegistry, StartupReport};
use conduit::services::{FactoryConfigStore, ServiceRegistry};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Configuration file used when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "conduit.toml";

/// A fluent builder for configuring and initializing the [`Daemon`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct DaemonBuilder {
    path: Option<PathBuf>,
    loaded: Option<LoadedConfig>,
    registry: Option<ServiceRegistry>,
    store: Option<FactoryConfigStore>,
}

impl DaemonBuilder {
    /// Loads configuration from `path` at build time.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Uses an already loaded configuration instead of reading a file.
    pub fn loaded(mut self, loaded: LoadedConfig) -> Self {
        self.loaded = Some(loaded);
        self
    }

    /// Shares a service registry that connector/exporter services register into.
    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn factory_store(mut self, store: FactoryConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    /// # Errors
    /// Returns an error if the configuration file is missing or malformed.
    pub fn build(self) -> Result<Daemon> {
        let loaded = match self.loaded {
            Some(loaded) => loaded,
            None => {
                let path = self.path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
                load_settings(Some(&path))
                    .with_context(|| format!("Failed to load configuration from {}", path.display()))?
            },
        };

        Ok(Daemon {
            loaded,
            registry: self.registry.unwrap_or_default(),
            store: self.store.unwrap_or_default(),
        })
    }
}

/// A configured daemon ready to start.
#[must_use = "call .run().await to start the daemon"]
#[derive(Debug)]
pub struct Daemon {
    loaded: LoadedConfig,
    registry: ServiceRegistry,
    store: FactoryConfigStore,
}

impl Daemon {
    pub fn builder() -> DaemonBuilder {
        DaemonBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &ConduitConfig {
        &self.loaded.config
    }

    /// Registry that in-process services register into.
    #[must_use]
    pub const fn services(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Factory configurations registered by the startup, for service instantiators.
    #[must_use]
    pub const fn factory_store(&self) -> &FactoryConfigStore {
        &self.store
    }

    /// Assembles and binds all projects and returns the report without installing it.
    ///
    /// # Errors
    /// Returns an error if a project descriptor is malformed.
    pub async fn start(&self) -> Result<StartupReport> {
        let report = conduit::init(&self.loaded, self.store.clone(), &self.registry)
            .await
            .context("Project startup failed")?;

        for project in report.registry.iter() {
            info!(
                project = project.name(),
                connector = project.connector().is_bound(),
                exporter = project.exporter().is_bound(),
                "Project ready"
            );
        }
        if report.failed > 0 {
            warn!(failed = report.failed, "Some services could not be bound; see errors above");
        }
        Ok(report)
    }

    /// Starts, installs the project registry process-wide, then waits for Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns an error if startup fails or a registry is already installed.
    pub async fn run(self) -> Result<()> {
        let report = self.start().await?;
        let registry: &'static ProjectRegistry =
            report.registry.install().context("Failed to publish project registry")?;
        info!(
            projects = registry.len(),
            bound = report.bound,
            failed = report.failed,
            "Conduit daemon running"
        );

        if let Err(e) = shutdown_signal().await {
            error!("Error while waiting for shutdown signal: {e}");
            return Err(e);
        }
        info!("Shutdown signal received, stopping");
        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
