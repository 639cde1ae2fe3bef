use crate::error::ServiceError;
use crate::filter::ServiceFilter;
use crate::registry::{ServiceEvent, ServiceRegistry};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace, warn};

/// Watches a [`ServiceRegistry`] for the first service matching a filter.
///
/// The event subscription is opened in [`ServiceTracker::open`], before the current
/// service table is scanned, so a registration racing with the scan is not missed.
pub struct ServiceTracker<T: ?Sized> {
    registry: ServiceRegistry,
    filter: ServiceFilter<T>,
    events: broadcast::Receiver<ServiceEvent>,
}

impl<T> ServiceTracker<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    #[must_use]
    pub fn open(registry: ServiceRegistry, filter: ServiceFilter<T>) -> Self {
        let events = registry.subscribe();
        Self { registry, filter, events }
    }

    #[must_use]
    pub const fn filter(&self) -> &ServiceFilter<T> {
        &self.filter
    }

    /// Returns a matching service, waiting up to `timeout` for one to register.
    ///
    /// # Errors
    /// [`ServiceError::Timeout`] when the deadline passes without a match and
    /// [`ServiceError::Closed`] if the registry event stream ends.
    pub async fn wait_for_service(&mut self, timeout: Duration) -> Result<Arc<T>, ServiceError> {
        if let Some(service) = self.registry.find(&self.filter) {
            return Ok(service);
        }

        let deadline = Instant::now() + timeout;
        debug!(filter = %self.filter, timeout_ms = timeout.as_millis(), "Waiting for service");

        loop {
            let event = match timeout_at(deadline, self.events.recv()).await {
                Ok(event) => event,
                Err(_) => {
                    return Err(ServiceError::Timeout {
                        message: format!("no service matched {} within {timeout:?}", self.filter)
                            .into(),
                        context: Some(type_name::<T>().into()),
                    });
                },
            };

            match event {
                Ok(ServiceEvent::Registered(reference)) if self.filter.matches(&reference) => {
                    if let Some(service) = self.registry.get::<T>(reference.id()) {
                        return Ok(service);
                    }
                    // Unregistered again before we looked it up.
                    trace!(id = %reference.id(), "Matched service already gone");
                },
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => {
                    warn!(filter = %self.filter, skipped, "Service tracker lagged; rescanning registry");
                    if let Some(service) = self.registry.find(&self.filter) {
                        return Ok(service);
                    }
                },
                Err(RecvError::Closed) => {
                    return Err(ServiceError::Closed {
                        message: "registry dropped while waiting".into(),
                        context: Some(self.filter.to_string().into()),
                    });
                },
            }
        }
    }
}

impl<T: ?Sized> fmt::Debug for ServiceTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTracker").field("filter", &self.filter).finish_non_exhaustive()
    }
}
