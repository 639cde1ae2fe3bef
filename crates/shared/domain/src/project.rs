use crate::binding::BindingState;
use crate::capability::{ExportService, RequirementsSource};
use crate::constants::{CONNECTOR, EXPORTER};
use crate::property::{Pid, Properties, PropertyValue};
use std::fmt;
use std::sync::Arc;

/// Decoded configuration of a connector or exporter.
///
/// `properties` never holds the reserved `pid` key; it is lifted into [`Configurable::pid`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configurable {
    pid: Option<Pid>,
    properties: Properties,
}

impl Configurable {
    #[must_use]
    pub const fn new(pid: Option<Pid>, properties: Properties) -> Self {
        Self { pid, properties }
    }

    #[must_use]
    pub const fn pid(&self) -> Option<&Pid> {
        self.pid.as_ref()
    }

    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Which half of a project a descriptor configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Connector,
    Exporter,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connector => CONNECTOR,
            Self::Exporter => EXPORTER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connector descriptor plus the requirements source it resolved to, if any.
///
/// The service handle is shared with the service registry; the connector never
/// shuts it down.
#[derive(Clone)]
pub struct Connector {
    config: Configurable,
    service: Option<Arc<dyn RequirementsSource>>,
}

impl Connector {
    #[must_use]
    pub const fn new(config: Configurable) -> Self {
        Self { config, service: None }
    }

    #[must_use]
    pub const fn config(&self) -> &Configurable {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<dyn RequirementsSource>> {
        self.service.as_ref()
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.service.is_some()
    }

    pub fn bind(&mut self, service: Arc<dyn RequirementsSource>) {
        self.service = Some(service);
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("config", &self.config)
            .field("service", &self.service.as_ref().map(|s| s.source_id().to_owned()))
            .finish()
    }
}

/// Exporter descriptor plus the export service it resolved to, if any.
#[derive(Clone)]
pub struct Exporter {
    config: Configurable,
    service: Option<Arc<dyn ExportService>>,
}

impl Exporter {
    #[must_use]
    pub const fn new(config: Configurable) -> Self {
        Self { config, service: None }
    }

    #[must_use]
    pub const fn config(&self) -> &Configurable {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<dyn ExportService>> {
        self.service.as_ref()
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.service.is_some()
    }

    pub fn bind(&mut self, service: Arc<dyn ExportService>) {
        self.service = Some(service);
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .field("service", &self.service.as_ref().map(|s| s.exporter_id().to_owned()))
            .finish()
    }
}

/// A named connector/exporter pairing.
///
/// Both halves are always decoded; either may still be unbound.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    connector: Connector,
    exporter: Exporter,
}

impl Project {
    pub fn new(name: impl Into<String>, connector: Connector, exporter: Exporter) -> Self {
        Self { name: name.into(), connector, exporter }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn connector(&self) -> &Connector {
        &self.connector
    }

    #[must_use]
    pub const fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub const fn connector_mut(&mut self) -> &mut Connector {
        &mut self.connector
    }

    pub const fn exporter_mut(&mut self) -> &mut Exporter {
        &mut self.exporter
    }

    #[must_use]
    pub fn binding_state(&self) -> BindingState {
        let mut state = BindingState::empty();
        state.set(BindingState::CONNECTOR, self.connector.is_bound());
        state.set(BindingState::EXPORTER, self.exporter.is_bound());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Jira;

    impl RequirementsSource for Jira {
        fn source_id(&self) -> &str {
            "jira"
        }
    }

    fn configurable(pid: &str) -> Configurable {
        let mut props = Properties::new();
        props.insert("type".to_owned(), "jira".into());
        Configurable::new(Some(Pid::new(pid)), props)
    }

    #[test]
    fn binding_state_tracks_halves() {
        let mut project = Project::new(
            "alpha",
            Connector::new(configurable("C1")),
            Exporter::new(configurable("E1")),
        );
        assert_eq!(project.binding_state(), BindingState::empty());

        project.connector_mut().bind(Arc::new(Jira));
        assert_eq!(project.binding_state(), BindingState::CONNECTOR);
        assert!(!project.binding_state().is_complete());
    }

    #[test]
    fn role_labels_match_config_segments() {
        assert_eq!(Role::Connector.to_string(), "connector");
        assert_eq!(Role::Exporter.as_str(), "exporter");
    }
}
