use crate::error::ServiceError;
use conduit_domain::property::{Pid, Properties, PropertiesDisplay};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Result of a factory configuration upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryUpdate {
    Created,
    Updated,
    Unchanged,
}

/// Change notifications for whoever instantiates services from factory configurations.
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryConfigEvent {
    Created { pid: Pid, properties: Arc<Properties> },
    Updated { pid: Pid, properties: Arc<Properties> },
    Deleted { pid: Pid },
}

/// Destination for managed factory configurations.
///
/// Registration only records the configuration; starting a service from it is up to
/// the implementation's consumers.
pub trait ManagedConfigSink: Send + Sync {
    /// Creates or updates the factory configuration identified by `pid`.
    ///
    /// Re-submitting identical properties must be a no-op.
    ///
    /// # Errors
    /// Implementation specific; [`ServiceError::InvalidPid`] for an unusable identity.
    fn configure_factory(&self, pid: &Pid, properties: &Properties) -> Result<FactoryUpdate, ServiceError>;
}

/// In-memory [`ManagedConfigSink`] that broadcasts every change.
#[derive(Clone)]
pub struct FactoryConfigStore {
    configs: Arc<RwLock<FxHashMap<Pid, Arc<Properties>>>>,
    events: broadcast::Sender<FactoryConfigEvent>,
}

impl Default for FactoryConfigStore {
    fn default() -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self { configs: Arc::default(), events }
    }
}

impl fmt::Debug for FactoryConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryConfigStore").field("configs", &self.len()).finish_non_exhaustive()
    }
}

impl FactoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, pid: &str) -> Option<Arc<Properties>> {
        self.configs.read().get(pid).cloned()
    }

    /// Removes a configuration. Returns `false` if `pid` was unknown.
    pub fn delete(&self, pid: &str) -> bool {
        let removed = self.configs.write().remove_entry(pid);
        removed.is_some_and(|(pid, _)| {
            info!(%pid, "Factory configuration deleted");
            self.notify(FactoryConfigEvent::Deleted { pid });
            true
        })
    }

    /// Sorted identities of the stored configurations.
    #[must_use]
    pub fn pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.configs.read().keys().cloned().collect();
        pids.sort_unstable();
        pids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FactoryConfigEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: FactoryConfigEvent) {
        if self.events.send(event).is_err() {
            trace!("Factory configuration event dropped: no subscribers");
        }
    }
}

impl ManagedConfigSink for FactoryConfigStore {
    fn configure_factory(&self, pid: &Pid, properties: &Properties) -> Result<FactoryUpdate, ServiceError> {
        if pid.trim().is_empty() {
            return Err(ServiceError::InvalidPid {
                message: "factory pid must not be blank".into(),
                context: Some(PropertiesDisplay(properties).to_string().into()),
            });
        }

        let (update, event) = {
            let mut configs = self.configs.write();
            let update = match configs.get(pid.as_str()) {
                Some(current) if current.as_ref() == properties => FactoryUpdate::Unchanged,
                Some(_) => FactoryUpdate::Updated,
                None => FactoryUpdate::Created,
            };

            let event = (update != FactoryUpdate::Unchanged).then(|| {
                let stored = Arc::new(properties.clone());
                configs.insert(pid.clone(), Arc::clone(&stored));
                let (pid, properties) = (pid.clone(), stored);
                match update {
                    FactoryUpdate::Created => FactoryConfigEvent::Created { pid, properties },
                    _ => FactoryConfigEvent::Updated { pid, properties },
                }
            });
            (update, event)
        };

        match event {
            Some(event) => {
                debug!(%pid, ?update, properties = %PropertiesDisplay(properties), "Factory configuration stored");
                self.notify(event);
            },
            None => trace!(%pid, "Factory configuration unchanged"),
        }
        Ok(update)
    }
}
