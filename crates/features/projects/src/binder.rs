use conduit_domain::capability::{ExportService, RequirementsSource};
use conduit_domain::config::BindingConfig;
use conduit_domain::project::{Configurable, Connector, Exporter, Role};
use conduit_domain::property::PropertiesDisplay;
use conduit_services::{ManagedConfigSink, ServiceError, ServiceFilter, ServiceRegistry};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

#[conduit_derive::conduit_error]
pub enum BindError {
    /// The descriptor has no `pid`, so no factory configuration can be registered.
    #[error("Descriptor has no pid{}", format_context(.context))]
    MissingPid { context: Option<Cow<'static, str>> },

    /// Factory registration, filter construction or the bounded wait failed.
    #[error("Service resolution failed{}: {source}", format_context(.context))]
    Service { source: ServiceError, context: Option<Cow<'static, str>> },
}

impl BindError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Service { source: ServiceError::Timeout { .. }, .. })
    }
}

/// A project half that resolves to a service of capability [`Bindable::Capability`].
pub trait Bindable {
    type Capability: ?Sized + Send + Sync + 'static;

    const ROLE: Role;

    fn config(&self) -> &Configurable;
    fn is_bound(&self) -> bool;
    fn attach(&mut self, service: Arc<Self::Capability>);
}

impl Bindable for Connector {
    type Capability = dyn RequirementsSource;

    const ROLE: Role = Role::Connector;

    fn config(&self) -> &Configurable {
        Self::config(self)
    }

    fn is_bound(&self) -> bool {
        Self::is_bound(self)
    }

    fn attach(&mut self, service: Arc<Self::Capability>) {
        self.bind(service);
    }
}

impl Bindable for Exporter {
    type Capability = dyn ExportService;

    const ROLE: Role = Role::Exporter;

    fn config(&self) -> &Configurable {
        Self::config(self)
    }

    fn is_bound(&self) -> bool {
        Self::is_bound(self)
    }

    fn attach(&mut self, service: Arc<Self::Capability>) {
        self.bind(service);
    }
}

/// Result of one binding attempt. Failures are already logged when returned.
#[derive(Debug)]
pub enum BindOutcome {
    Bound,
    Failed(BindError),
}

impl BindOutcome {
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound)
    }
}

/// Registers descriptor configurations and resolves them against the service registry.
#[derive(Clone)]
pub struct ServiceBinder {
    sink: Arc<dyn ManagedConfigSink>,
    registry: ServiceRegistry,
    settings: BindingConfig,
}

impl fmt::Debug for ServiceBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinder")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ServiceBinder {
    pub fn new(sink: Arc<dyn ManagedConfigSink>, registry: ServiceRegistry, settings: BindingConfig) -> Self {
        Self { sink, registry, settings }
    }

    /// Property whose value selects the service for `role`.
    #[must_use]
    pub fn identity_key(&self, role: Role) -> &str {
        match role {
            Role::Connector => &self.settings.connector_id_key,
            Role::Exporter => &self.settings.exporter_id_key,
        }
    }

    /// Binds `descriptor` to a live service, waiting up to the configured timeout.
    ///
    /// Any failure is logged with the descriptor's pid and properties and leaves the
    /// descriptor unbound. The factory configuration stays registered either way.
    pub async fn bind<D: Bindable>(&self, project: &str, descriptor: &mut D) -> BindOutcome {
        if descriptor.is_bound() {
            debug!(project, role = %D::ROLE, "Descriptor already bound");
            return BindOutcome::Bound;
        }

        match self.resolve::<D>(descriptor.config()).await {
            Ok(service) => {
                descriptor.attach(service);
                info!(project, role = %D::ROLE, pid = pid_label(descriptor.config()), "Service bound");
                BindOutcome::Bound
            },
            Err(err) => {
                let config = descriptor.config();
                error!(
                    project,
                    role = %D::ROLE,
                    pid = pid_label(config),
                    properties = %PropertiesDisplay(config.properties()),
                    kind = err.kind(),
                    error = %err,
                    "Service binding failed"
                );
                BindOutcome::Failed(err)
            },
        }
    }

    async fn resolve<D: Bindable>(&self, config: &Configurable) -> Result<Arc<D::Capability>, BindError> {
        let pid = config
            .pid()
            .ok_or_else(|| BindError::MissingPid { context: Some(D::ROLE.as_str().into()) })?;

        let update = self.sink.configure_factory(pid, config.properties())?;
        debug!(%pid, ?update, "Factory configuration registered");

        let filter = ServiceFilter::<D::Capability>::matching(self.identity_key(D::ROLE), config.properties())?;
        debug!(%pid, %filter, "Resolving service");

        let service = self.registry.wait_for(filter, self.settings.timeout()).await?;
        Ok(service)
    }
}

fn pid_label(config: &Configurable) -> &str {
    config.pid().map_or("<none>", |pid| pid.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_domain::property::{Pid, Properties};
    use conduit_services::{FactoryConfigStore, FactoryUpdate};
    use std::time::Duration;

    struct Jira(&'static str);

    impl RequirementsSource for Jira {
        fn source_id(&self) -> &str {
            self.0
        }
    }

    fn jira_props() -> Properties {
        let mut props = Properties::new();
        props.insert("type".to_owned(), "jira".into());
        props
    }

    fn connector(pid: Option<&str>, kind: Option<&str>) -> Connector {
        let mut props = Properties::new();
        if let Some(kind) = kind {
            props.insert("type".to_owned(), kind.into());
        }
        Connector::new(Configurable::new(pid.map(Pid::new), props))
    }

    fn binder(store: &FactoryConfigStore, registry: &ServiceRegistry) -> ServiceBinder {
        let settings = BindingConfig { timeout_ms: 50, ..BindingConfig::default() };
        ServiceBinder::new(Arc::new(store.clone()), registry.clone(), settings)
    }

    #[tokio::test]
    async fn binds_registered_service() {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();
        registry.register::<dyn RequirementsSource>(Arc::new(Jira("jira")), jira_props());

        let mut descriptor = connector(Some("C1"), Some("jira"));
        let outcome = binder(&store, &registry).bind("a", &mut descriptor).await;

        assert!(outcome.is_bound());
        assert_eq!(descriptor.service().unwrap().source_id(), "jira");
        assert!(store.get("C1").is_some());
    }

    #[tokio::test]
    async fn rebinding_keeps_the_first_service() {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();
        let binder = binder(&store, &registry);
        registry.register::<dyn RequirementsSource>(Arc::new(Jira("first")), jira_props());

        let mut descriptor = connector(Some("C1"), Some("jira"));
        assert!(binder.bind("a", &mut descriptor).await.is_bound());

        let mut events = store.subscribe();
        let second = registry.register::<dyn RequirementsSource>(Arc::new(Jira("second")), jira_props());
        assert!(registry.get::<dyn RequirementsSource>(second).is_some());

        assert!(binder.bind("a", &mut descriptor).await.is_bound());
        assert_eq!(descriptor.service().unwrap().source_id(), "first");
        assert_eq!(store.len(), 1);
        assert!(events.try_recv().is_err());
        assert_eq!(
            store.configure_factory(&Pid::new("C1"), descriptor.config().properties()).unwrap(),
            FactoryUpdate::Unchanged
        );
    }

    #[tokio::test]
    async fn missing_pid_registers_nothing() {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();

        let mut descriptor = connector(None, Some("jira"));
        let outcome = binder(&store, &registry).bind("a", &mut descriptor).await;

        assert!(matches!(outcome, BindOutcome::Failed(BindError::MissingPid { .. })));
        assert!(store.is_empty());
        assert!(!descriptor.is_bound());
    }

    #[tokio::test]
    async fn missing_identity_property_fails_after_registration() {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();

        let mut descriptor = connector(Some("C1"), None);
        let outcome = binder(&store, &registry).bind("a", &mut descriptor).await;

        let BindOutcome::Failed(err) = outcome else { panic!("expected failure") };
        assert!(matches!(err, BindError::Service { source: ServiceError::InvalidFilter { .. }, .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_factory_configuration() {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();

        let mut descriptor = connector(Some("C1"), Some("jira"));
        let started = tokio::time::Instant::now();
        let outcome = binder(&store, &registry).bind("a", &mut descriptor).await;

        let BindOutcome::Failed(err) = outcome else { panic!("expected timeout") };
        assert!(err.is_timeout());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(store.get("C1").is_some());
    }
}
