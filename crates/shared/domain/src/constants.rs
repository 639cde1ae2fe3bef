//! Key names of the flat project configuration space.
//!
//! Keys follow `project.<name>.<role>.<suffix>` where `<role>` is one of
//! [`CONNECTOR`] / [`EXPORTER`] and `<suffix>` is [`PID_KEY`] or a free-form field.

/// Ordered list of configured project names.
pub const PROJECTS_KEY: &str = "project.projects";
/// Root segment of every project key.
pub const PROJECT_PREFIX: &str = "project";
pub const CONNECTOR: &str = "connector";
pub const EXPORTER: &str = "exporter";
/// Reserved suffix carrying the factory configuration identity.
pub const PID_KEY: &str = "pid";

/// Default time to wait for a configured service to appear.
pub const DEFAULT_SERVICE_WAIT_MS: u64 = 5000;
/// Default property identifying the kind of connector/exporter service to bind.
pub const DEFAULT_SERVICE_ID_KEY: &str = "type";

/// Builds `project.<name>`.
#[must_use]
pub fn project_prefix(name: &str) -> String {
    format!("{PROJECT_PREFIX}.{name}")
}
