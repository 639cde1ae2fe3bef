use crate::assembler::{AssemblyError, assemble};
use crate::binder::{BindOutcome, ServiceBinder};
use crate::registry::ProjectRegistry;
use conduit_domain::config::BindingConfig;
use conduit_kernel::config::ConfigSource;
use conduit_services::{ManagedConfigSink, ServiceRegistry};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

#[conduit_derive::conduit_error]
pub enum StartupError {
    #[error("Project startup aborted{}: {source}", format_context(.context))]
    Assembly { source: AssemblyError, context: Option<Cow<'static, str>> },

    #[error("Project service is missing a collaborator{}: {message}", format_context(.context))]
    MissingCollaborator { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Runtime error{}: {message}", format_context(.context))]
    Runtime { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Outcome of a startup run.
#[derive(Debug, Clone)]
pub struct StartupReport {
    pub registry: ProjectRegistry,
    /// Projects with both descriptors decoded.
    pub assembled: usize,
    /// Descriptors bound to a live service.
    pub bound: usize,
    /// Descriptors whose binding failed; each failure was logged.
    pub failed: usize,
}

/// Assembles the configured projects and binds them to live services.
///
/// ```rust,no_run
/// # use conduit_projects::ProjectService;
/// # use conduit_kernel::config::FlatConfig;
/// # use conduit_services::{FactoryConfigStore, ServiceRegistry};
/// # async fn run() -> Result<(), conduit_projects::StartupError> {
/// let report = ProjectService::builder()
///     .config_source(FlatConfig::new())
///     .sink(FactoryConfigStore::new())
///     .registry(ServiceRegistry::new())
///     .build()?
///     .start()
///     .await?;
/// report.registry.install().ok();
/// # Ok(())
/// # }
/// ```
pub struct ProjectService {
    source: Arc<dyn ConfigSource>,
    binder: ServiceBinder,
}

impl fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectService").field("binder", &self.binder).finish_non_exhaustive()
    }
}

impl ProjectService {
    #[must_use]
    pub fn builder() -> ProjectServiceBuilder {
        ProjectServiceBuilder::default()
    }

    /// Runs the startup: assemble everything, then bind each project's connector and
    /// exporter in configuration order, then freeze the registry.
    ///
    /// # Errors
    /// Returns [`StartupError::Assembly`] when a descriptor is malformed; no factory
    /// configuration is registered in that case. Binding failures are not errors.
    #[instrument(name = "project_startup", skip_all)]
    pub async fn start(&self) -> Result<StartupReport, StartupError> {
        let mut projects = assemble(self.source.as_ref())?;
        let assembled = projects.len();
        info!(projects = assembled, "Projects assembled");

        let (mut bound, mut failed) = (0, 0);
        let mut tally = |outcome: BindOutcome| match outcome {
            BindOutcome::Bound => bound += 1,
            BindOutcome::Failed(_) => failed += 1,
        };

        for project in &mut projects {
            let name = project.name().to_owned();
            tally(self.binder.bind(&name, project.connector_mut()).await);
            tally(self.binder.bind(&name, project.exporter_mut()).await);
        }

        let registry = ProjectRegistry::from_projects(projects);
        info!(projects = registry.len(), bound, failed, "Project startup complete");

        Ok(StartupReport { registry, assembled, bound, failed })
    }

    /// Blocking variant of [`ProjectService::start`] for callers outside an async context.
    ///
    /// # Errors
    /// As [`ProjectService::start`], plus [`StartupError::Runtime`] when called from
    /// inside a runtime.
    pub fn start_blocking(&self) -> Result<StartupReport, StartupError> {
        conduit_runtime::block_on(self.start()).map_err(|e| StartupError::Runtime {
            message: e.to_string().into(),
            context: Some("start_blocking".into()),
        })?
    }
}

#[derive(Default)]
pub struct ProjectServiceBuilder {
    source: Option<Arc<dyn ConfigSource>>,
    sink: Option<Arc<dyn ManagedConfigSink>>,
    registry: Option<ServiceRegistry>,
    settings: BindingConfig,
}

impl fmt::Debug for ProjectServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectServiceBuilder")
            .field("source", &self.source.is_some())
            .field("sink", &self.sink.is_some())
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ProjectServiceBuilder {
    #[must_use]
    pub fn config_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: impl ManagedConfigSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Binding timeout and identity keys; defaults apply otherwise.
    #[must_use]
    pub fn settings(mut self, settings: BindingConfig) -> Self {
        self.settings = settings;
        self
    }

    /// # Errors
    /// Returns [`StartupError::MissingCollaborator`] if the config source, sink or
    /// service registry was not supplied.
    pub fn build(self) -> Result<ProjectService, StartupError> {
        let missing = |what: &'static str| StartupError::MissingCollaborator { message: what.into(), context: None };

        let source = self.source.ok_or_else(|| missing("config source"))?;
        let sink = self.sink.ok_or_else(|| missing("managed config sink"))?;
        let registry = self.registry.ok_or_else(|| missing("service registry"))?;

        Ok(ProjectService { source, binder: ServiceBinder::new(sink, registry, self.settings) })
    }
}
