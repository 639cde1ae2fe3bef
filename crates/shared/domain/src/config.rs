use crate::constants::{DEFAULT_SERVICE_ID_KEY, DEFAULT_SERVICE_WAIT_MS};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Typed sections of the Conduit configuration file.
///
/// The `project.*` key space lives in the same file but is read through the flat
/// configuration source, not through this struct.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConduitConfigInner {
    pub logging: LoggingConfig,
    pub binding: BindingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ConduitConfig {
    #[serde(flatten, default)]
    inner: Arc<ConduitConfigInner>,
}

impl Deref for ConduitConfig {
    type Target = ConduitConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ConduitConfig {
    fn deref_mut(&mut self) -> &mut ConduitConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Console/file logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `conduit_projects=debug`.
    pub filter: Option<String>,
    pub console: bool,
    /// Directory for rolling log files; file logging is off when unset.
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    /// Export spans through the global OpenTelemetry tracer. Needs the logger's
    /// `opentelemetry` feature.
    pub opentelemetry: bool,
}

/// Service resolution settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// How long to wait for each configured service to register.
    pub timeout_ms: u64,
    /// Property that selects the connector service kind.
    pub connector_id_key: String,
    /// Property that selects the exporter service kind.
    pub exporter_id_key: String,
}

impl BindingConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 10,
            opentelemetry: false,
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_SERVICE_WAIT_MS,
            connector_id_key: DEFAULT_SERVICE_ID_KEY.to_owned(),
            exporter_id_key: DEFAULT_SERVICE_ID_KEY.to_owned(),
        }
    }
}
