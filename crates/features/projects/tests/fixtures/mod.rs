#![allow(dead_code)]

use conduit_domain::capability::{ExportService, RequirementsSource};
use conduit_domain::property::{Properties, PropertyValue};
use conduit_kernel::config::FlatConfig;
use conduit_services::ServiceRegistry;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub struct Source(pub &'static str);

impl RequirementsSource for Source {
    fn source_id(&self) -> &str {
        self.0
    }
}

pub struct Sink(pub &'static str);

impl ExportService for Sink {
    fn exporter_id(&self) -> &str {
        self.0
    }
}

pub fn typed(kind: &str) -> Properties {
    let mut props = Properties::new();
    props.insert("type".to_owned(), kind.into());
    props
}

pub fn register_source(registry: &ServiceRegistry, kind: &'static str) {
    registry.register::<dyn RequirementsSource>(Arc::new(Source(kind)), typed(kind));
}

pub fn register_exporter(registry: &ServiceRegistry, kind: &'static str) {
    registry.register::<dyn ExportService>(Arc::new(Sink(kind)), typed(kind));
}

/// Builds a flat config space without a `project.projects` list.
pub fn unlisted(entries: &[(&str, &str)]) -> FlatConfig {
    entries.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Builds a flat config space listing `projects` under `project.projects`.
pub fn config(projects: &[&str], entries: &[(&str, &str)]) -> FlatConfig {
    let mut flat = unlisted(entries);
    let list = projects.iter().map(|n| PropertyValue::from(*n)).collect();
    flat.insert("project.projects", PropertyValue::List(list));
    flat
}

/// The single-project configuration used by most scenarios.
pub fn single_project() -> FlatConfig {
    config(
        &["a"],
        &[
            ("project.a.connector.pid", "C1"),
            ("project.a.connector.type", "X"),
            ("project.a.exporter.pid", "E1"),
            ("project.a.exporter.type", "Y"),
        ],
    )
}

/// In-memory log sink for asserting emitted events.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|line| line.contains(needle)).count()
    }

    /// Installs a thread-local subscriber writing into this capture.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
