//! Configuration loading and the flat key space used for project descriptors.

mod flat;
mod loader;

pub use flat::FlatConfig;
pub use config::FileFormat;
pub use loader::{LoadedConfig, load_config, load_settings};

use conduit_domain::property::PropertyValue;
use std::borrow::Cow;

/// Custom error type for config loading.
#[conduit_derive::conduit_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Read-only view over a flat, dot-separated configuration key space.
pub trait ConfigSource: Send + Sync {
    /// Returns the string list stored under `key`, or `None` when the key is absent.
    fn get_array(&self, key: &str) -> Option<Vec<String>>;

    /// Returns every entry whose key starts with `prefix.`, with full keys, in key order.
    fn properties_under(&self, prefix: &str) -> Vec<(String, PropertyValue)>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn get_array(&self, key: &str) -> Option<Vec<String>> {
        (**self).get_array(key)
    }

    fn properties_under(&self, prefix: &str) -> Vec<(String, PropertyValue)> {
        (**self).properties_under(prefix)
    }
}
