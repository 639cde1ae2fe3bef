//! Read-side seam for assembled projects.

use crate::project::Project;
use std::sync::Arc;

/// Looks up assembled projects by name.
///
/// Unknown names yield `None`; a dropped or misconfigured project is indistinguishable
/// from one that was never configured.
pub trait ProjectLookup: Send + Sync {
    fn project(&self, name: &str) -> Option<Arc<Project>>;
}
