//! # Services
//!
//! In-process service registry used to bind configured projects to live services.
//!
//! ## Overview
//!
//! * [`ServiceRegistry`] stores services under a capability type (usually a trait object)
//!   together with a property bag, and broadcasts [`ServiceEvent`]s to trackers.
//! * [`ServiceFilter`] selects services by capability plus property equality.
//! * [`ServiceTracker`] waits, with a deadline, for the first matching registration.
//! * [`FactoryConfigStore`] is the default [`ManagedConfigSink`]: an idempotent store of
//!   factory configurations keyed by pid.
//!
//! # Example
//!
//! ```rust
//! use conduit_services::{ServiceError, ServiceFilter, ServiceRegistry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! trait Clock: Send + Sync { fn now(&self) -> u64; }
//! struct Fixed;
//! impl Clock for Fixed { fn now(&self) -> u64 { 7 } }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServiceError> {
//!     let registry = ServiceRegistry::new();
//!     let waiter = {
//!         let registry = registry.clone();
//!         tokio::spawn(async move {
//!             registry.wait_for(ServiceFilter::<dyn Clock>::capability(), Duration::from_secs(1)).await
//!         })
//!     };
//!
//!     registry.register::<dyn Clock>(Arc::new(Fixed), Default::default());
//!     let clock = waiter.await.unwrap()?;
//!     assert_eq!(clock.now(), 7);
//!     Ok(())
//! }
//! ```

mod error;
mod factory;
mod filter;
mod registry;
mod tracker;

pub use error::{ServiceError, ServiceErrorExt};
pub use factory::{FactoryConfigEvent, FactoryConfigStore, FactoryUpdate, ManagedConfigSink};
pub use filter::ServiceFilter;
pub use registry::{ServiceEvent, ServiceId, ServiceReference, ServiceRegistry};
pub use tracker::ServiceTracker;
