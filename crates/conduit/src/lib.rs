//! Facade crate for Conduit features and shared modules.
//! Re-exports domain/kernel/service primitives and composes project startup.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Load configuration with [`kernel::config::load_settings`].
//! - Create the [`services::ServiceRegistry`] that connector/exporter services register
//!   into, plus a [`services::ManagedConfigSink`].
//! - Call [`init`] to assemble and bind every configured project.

pub use conduit_domain as domain;
pub use conduit_kernel as kernel;
pub use conduit_services as services;

#[cfg(feature = "projects")]
pub use conduit_projects as projects;

/// Feature registry for runtime introspection.
pub mod features {
    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "projects")]
        "projects",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Assembles and binds all configured projects using the loaded settings.
///
/// The returned report's registry is not installed globally; the caller decides.
///
/// # Errors
/// Returns an error if a project descriptor is malformed.
#[cfg(feature = "projects")]
pub async fn init(
    loaded: &kernel::config::LoadedConfig,
    sink: impl services::ManagedConfigSink + 'static,
    registry: &services::ServiceRegistry,
) -> Result<projects::StartupReport, projects::StartupError> {
    projects::ProjectService::builder()
        .config_source(loaded.space.clone())
        .sink(sink)
        .registry(registry.clone())
        .settings(loaded.config.binding.clone())
        .build()?
        .start()
        .await
}
