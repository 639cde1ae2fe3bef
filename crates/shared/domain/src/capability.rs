//! Service capabilities a project binds to.
//!
//! Only the identification surface lives here; what a source extracts or an exporter
//! writes is up to the implementing service.

/// A service that supplies requirements to a project (a connector).
pub trait RequirementsSource: Send + Sync {
    /// Identifier of the backing source instance.
    fn source_id(&self) -> &str;
}

/// A service that exports project artifacts to an external system.
pub trait ExportService: Send + Sync {
    /// Identifier of the export target instance.
    fn exporter_id(&self) -> &str;
}
