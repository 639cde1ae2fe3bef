use super::{ConfigError, ConfigErrorExt, ConfigSource};
use config::{Config, FileFormat, Source, Value, ValueKind};
use conduit_domain::property::PropertyValue;
use std::collections::BTreeMap;
use tracing::debug;

/// Flattened configuration: fully qualified dotted keys mapped to scalar or list values.
///
/// Nested tables are expanded into dotted keys (`[project.alpha.connector] type = "x"`
/// becomes `project.alpha.connector.type`). Empty values are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    entries: BTreeMap<String, PropertyValue>,
}

impl FlatConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens an already layered [`Config`].
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if the sources cannot be collected.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let root = config.collect().context("Failed to collect configuration")?;
        let mut flat = Self::new();
        for (key, value) in root {
            flat.flatten(key, value);
        }
        Ok(flat)
    }

    /// Parses a single in-memory document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if `content` is not valid for `format`.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::from_str(content, format))
            .build()
            .context("Failed to parse configuration")?;
        Self::from_config(&config)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn flatten(&mut self, key: String, value: Value) {
        match value.kind {
            ValueKind::Table(table) => {
                for (child, value) in table {
                    self.flatten(format!("{key}.{child}"), value);
                }
            },
            kind => match convert(kind) {
                Some(value) => {
                    self.entries.insert(key, value);
                },
                None => debug!(%key, "Skipping configuration value without a flat representation"),
            },
        }
    }
}

fn convert(kind: ValueKind) -> Option<PropertyValue> {
    match kind {
        ValueKind::Nil | ValueKind::Table(_) => None,
        ValueKind::Boolean(v) => Some(PropertyValue::Boolean(v)),
        ValueKind::I64(v) => Some(PropertyValue::Integer(v)),
        ValueKind::I128(v) => i64::try_from(v).ok().map(PropertyValue::Integer),
        ValueKind::U64(v) => i64::try_from(v).ok().map(PropertyValue::Integer),
        ValueKind::U128(v) => i64::try_from(v).ok().map(PropertyValue::Integer),
        ValueKind::Float(v) => Some(PropertyValue::Float(v)),
        ValueKind::String(v) => Some(PropertyValue::String(v)),
        ValueKind::Array(items) => {
            Some(PropertyValue::List(items.into_iter().filter_map(|item| convert(item.kind)).collect()))
        },
    }
}

impl<K, V> FromIterator<(K, V)> for FlatConfig
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl ConfigSource for FlatConfig {
    /// Lists come either as native arrays or as comma-separated strings
    /// (`CONDUIT__PROJECT__PROJECTS=alpha,beta`).
    fn get_array(&self, key: &str) -> Option<Vec<String>> {
        let items = match self.entries.get(key)? {
            PropertyValue::List(items) => items.iter().map(ToString::to_string).collect(),
            PropertyValue::String(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
            scalar => vec![scalar.to_string()],
        };
        Some(items)
    }

    fn properties_under(&self, prefix: &str) -> Vec<(String, PropertyValue)> {
        let start = format!("{prefix}.");
        self.entries
            .range(start.clone()..)
            .take_while(|(key, _)| key.starts_with(&start))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [project]
        projects = ["alpha", "beta"]

        [project.alpha.connector]
        pid = "C1"
        type = "jira"
        port = 8080

        [project.alpha.exporter]
        pid = "E1"
        type = "csv"
        columns = ["id", "title"]
    "#;

    #[test]
    fn nested_tables_become_dotted_keys() {
        let flat = FlatConfig::parse(SAMPLE, FileFormat::Toml).unwrap();

        assert_eq!(flat.get("project.alpha.connector.pid"), Some(&PropertyValue::from("C1")));
        assert_eq!(flat.get("project.alpha.connector.port"), Some(&PropertyValue::Integer(8080)));
        assert_eq!(
            flat.get("project.alpha.exporter.columns"),
            Some(&PropertyValue::List(vec!["id".into(), "title".into()]))
        );
    }

    #[test]
    fn arrays_and_joined_strings_are_lists() {
        let flat = FlatConfig::parse(SAMPLE, FileFormat::Toml).unwrap();
        assert_eq!(flat.get_array("project.projects"), Some(vec!["alpha".to_owned(), "beta".to_owned()]));

        let joined: FlatConfig = [("project.projects", "a, b,,c")].into_iter().collect();
        assert_eq!(
            joined.get_array("project.projects"),
            Some(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
        );
        assert_eq!(joined.get_array("project.missing"), None);
    }

    #[test]
    fn properties_under_respects_segment_boundary() {
        let flat: FlatConfig = [
            ("project.a.connector.pid", "C1"),
            ("project.a.connector.type", "X"),
            ("project.a.connectors.pid", "nope"),
            ("project.ab.connector.pid", "nope"),
        ]
        .into_iter()
        .collect();

        let keys: Vec<String> =
            flat.properties_under("project.a.connector").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["project.a.connector.pid", "project.a.connector.type"]);
    }

    #[test]
    fn layered_config_flattens_with_key_case_kept() {
        let config = Config::builder()
            .add_source(config::File::from_str(
                "[project.Alpha.connector]\nconnectorId = \"jira\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let flat = FlatConfig::from_config(&config).unwrap();
        assert_eq!(flat.get("project.Alpha.connector.connectorId"), Some(&PropertyValue::from("jira")));
        assert_eq!(flat.len(), 1);
    }
}
