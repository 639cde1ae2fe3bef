use super::{ConfigError, ConfigErrorExt, FlatConfig};
use config::{Config, Environment, File};
use conduit_domain::config::ConduitConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "conduit";
const ENV_PREFIX: &str = "CONDUIT";
const ENV_SEPARATOR: &str = "__";

/// Typed sections plus the flattened key space, built from one layered load.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ConduitConfig,
    pub space: FlatConfig,
}

/// Layers a required configuration file with `CONDUIT__*` environment overrides.
///
/// Without a path, `conduit.{toml,yaml,json,...}` in the working directory is used.
/// Nested keys are addressed with double underscores, e.g. `CONDUIT__BINDING__TIMEOUT_MS`
/// maps to `binding.timeout_ms`.
fn layered(path: Option<&Path>) -> Result<Config, ConfigError> {
    let effective_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    info!("Loading config from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
        .build()
        .context("Failed to build config")
}

/// Loads a single typed configuration structure.
///
/// # Errors
/// Returns an error if the file is missing or its content does not match `T`.
///
/// # Example
/// ```rust
/// use conduit_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path: Option<&Path> = path.as_ref().map(AsRef::as_ref);
    layered(path)?.try_deserialize::<T>().context("Failed to deserialize config")
}

/// Loads the typed [`ConduitConfig`] and the flat key space from the same sources.
///
/// # Errors
/// Returns an error if the file is missing or a typed section is malformed.
pub fn load_settings(path: Option<impl AsRef<Path>>) -> Result<LoadedConfig, ConfigError> {
    let path: Option<&Path> = path.as_ref().map(AsRef::as_ref);
    let layered = layered(path)?;

    let config = layered.clone().try_deserialize::<ConduitConfig>().context("Failed to deserialize config")?;
    let space = FlatConfig::from_config(&layered)?;

    Ok(LoadedConfig { config, space })
}
