//! # Projects
//!
//! Assembles connector/exporter pairs ("projects") from the flat configuration space
//! and binds each half to a live service.
//!
//! ## Flow
//!
//! 1.  **Assembly ([`assembler`]):** reads `project.projects`, decodes
//!     `project.<name>.connector.*` and `project.<name>.exporter.*`. A project missing
//!     either block is dropped silently; a malformed `pid` aborts the whole batch.
//! 2.  **Binding ([`binder`]):** registers each descriptor as a factory configuration,
//!     then waits for a service whose identity property matches. Failures are logged and
//!     leave that half unbound.
//! 3.  **Registry ([`registry`]):** the result is frozen into a [`ProjectRegistry`] that
//!     can be installed process-wide.
//!
//! [`ProjectService`] drives the three steps with explicitly supplied collaborators.

pub mod assembler;
pub mod binder;
pub mod registry;
mod service;

pub use assembler::{AssemblyError, AssemblyErrorExt};
pub use binder::{BindError, BindErrorExt, BindOutcome, Bindable, ServiceBinder};
pub use registry::{ProjectRegistry, RegistryError, RegistryErrorExt};
pub use service::{ProjectService, ProjectServiceBuilder, StartupError, StartupErrorExt, StartupReport};
