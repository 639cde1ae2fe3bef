use crate::error::ServiceError;
use crate::filter::ServiceFilter;
use crate::tracker::ServiceTracker;
use conduit_domain::property::Properties;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Registration event buffer per tracker.
const DEFAULT_EVENT_CAPACITY: usize = 128;

/// Identifier assigned to a service at registration, increasing in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(u64);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service#{}", self.0)
    }
}

/// Metadata of a registered service, without the instance itself.
#[derive(Debug, Clone)]
pub struct ServiceReference {
    id: ServiceId,
    capability: TypeId,
    capability_name: &'static str,
    properties: Arc<Properties>,
}

impl ServiceReference {
    #[must_use]
    pub const fn id(&self) -> ServiceId {
        self.id
    }

    #[must_use]
    pub const fn capability(&self) -> TypeId {
        self.capability
    }

    #[must_use]
    pub const fn capability_name(&self) -> &'static str {
        self.capability_name
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Lifecycle notifications delivered to trackers.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    Registered(ServiceReference),
    Unregistered(ServiceReference),
}

struct ServiceRecord {
    reference: ServiceReference,
    // Holds an `Arc<T>` for the registered capability `T`.
    instance: Arc<dyn Any + Send + Sync>,
}

struct RegistryInner {
    services: RwLock<FxHashMap<ServiceId, ServiceRecord>>,
    next_id: AtomicU64,
    events: broadcast::Sender<ServiceEvent>,
}

/// In-process registry of live services, keyed by capability and properties.
///
/// Cheap to clone; clones share the same table and event stream.
///
/// # Example
/// ```rust
/// use conduit_services::{ServiceFilter, ServiceRegistry};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn hello(&self) -> &'static str; }
/// struct En;
/// impl Greeter for En { fn hello(&self) -> &'static str { "hello" } }
///
/// let registry = ServiceRegistry::new();
/// let mut props = conduit_domain::property::Properties::new();
/// props.insert("lang".to_owned(), "en".into());
/// registry.register::<dyn Greeter>(Arc::new(En), props);
///
/// let filter = ServiceFilter::<dyn Greeter>::capability().with_property("lang", "en");
/// assert_eq!(registry.find(&filter).unwrap().hello(), "hello");
/// ```
#[derive(Clone)]
pub struct ServiceRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry").field("services", &self.len()).finish_non_exhaustive()
    }
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose trackers buffer up to `capacity` events before lagging.
    #[must_use]
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(RegistryInner {
                services: RwLock::new(FxHashMap::default()),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Registers `service` under capability `T` with the given properties.
    pub fn register<T>(&self, service: Arc<T>, properties: Properties) -> ServiceId
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let id = ServiceId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let reference = ServiceReference {
            id,
            capability: TypeId::of::<T>(),
            capability_name: type_name::<T>(),
            properties: Arc::new(properties),
        };
        let record = ServiceRecord { reference: reference.clone(), instance: Arc::new(service) };

        self.inner.services.write().insert(id, record);
        debug!(%id, capability = reference.capability_name, "Service registered");
        self.notify(ServiceEvent::Registered(reference));
        id
    }

    /// Removes a service. Returns `false` if `id` was not registered.
    pub fn unregister(&self, id: ServiceId) -> bool {
        let removed = self.inner.services.write().remove(&id);
        removed.is_some_and(|record| {
            debug!(%id, capability = record.reference.capability_name, "Service unregistered");
            self.notify(ServiceEvent::Unregistered(record.reference));
            true
        })
    }

    /// Returns the earliest registered service matching `filter`.
    #[must_use]
    pub fn find<T>(&self, filter: &ServiceFilter<T>) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let services = self.inner.services.read();
        services
            .values()
            .filter(|record| filter.matches(&record.reference))
            .min_by_key(|record| record.reference.id)
            .and_then(|record| record.instance.downcast_ref::<Arc<T>>().cloned())
    }

    /// Returns the instance registered as `id` if it provides capability `T`.
    #[must_use]
    pub fn get<T>(&self, id: ServiceId) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.inner
            .services
            .read()
            .get(&id)
            .and_then(|record| record.instance.downcast_ref::<Arc<T>>().cloned())
    }

    /// Opens a tracker for `filter`. Events published after this call are observed.
    #[must_use]
    pub fn track<T>(&self, filter: ServiceFilter<T>) -> ServiceTracker<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        ServiceTracker::open(self.clone(), filter)
    }

    /// Waits up to `timeout` for a service matching `filter`.
    ///
    /// Services already registered are returned immediately.
    ///
    /// # Errors
    /// Returns [`ServiceError::Timeout`] if nothing matches before the deadline.
    pub async fn wait_for<T>(
        &self,
        filter: ServiceFilter<T>,
        timeout: Duration,
    ) -> Result<Arc<T>, ServiceError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.track(filter).wait_for_service(timeout).await
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.services.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.inner.events.subscribe()
    }

    fn notify(&self, event: ServiceEvent) {
        if self.inner.events.send(event).is_err() {
            trace!("Service event dropped: no active trackers");
        }
    }
}
