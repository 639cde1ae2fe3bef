use conduit_domain::project::Project;
use conduit_domain::registry::ProjectLookup;
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use tracing::info;

static GLOBAL: OnceLock<ProjectRegistry> = OnceLock::new();

#[conduit_derive::conduit_error]
pub enum RegistryError {
    #[error("Project registry is already installed{}", format_context(.context))]
    AlreadyInstalled { context: Option<Cow<'static, str>> },
}

/// Immutable name → project table produced by startup.
///
/// Clones share the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Arc<FxHashMap<String, Arc<Project>>>,
    names: Arc<[String]>,
}

impl ProjectRegistry {
    /// Builds the table; a later project with an already seen name replaces the earlier one.
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let mut table = FxHashMap::default();
        let mut names = Vec::new();
        for project in projects {
            let name = project.name().to_owned();
            if table.insert(name.clone(), Arc::new(project)).is_none() {
                names.push(name);
            }
        }
        Self { projects: Arc::new(table), names: names.into() }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<Project>> {
        self.projects.get(name).cloned()
    }

    /// Project names in configuration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Projects in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Project>> {
        self.names.iter().filter_map(|name| self.projects.get(name))
    }

    /// Publishes this registry process-wide.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyInstalled`] if a registry was installed before.
    pub fn install(self) -> Result<&'static Self, RegistryError> {
        let count = self.len();
        GLOBAL.set(self).map_err(|rejected| RegistryError::AlreadyInstalled {
            context: Some(format!("{} projects rejected", rejected.len()).into()),
        })?;
        info!(projects = count, "Project registry installed");
        GLOBAL.get().ok_or_else(|| RegistryError::AlreadyInstalled { context: None })
    }

    /// The installed registry, if any.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}

impl ProjectLookup for ProjectRegistry {
    fn project(&self, name: &str) -> Option<Arc<Project>> {
        self.lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_domain::project::{Configurable, Connector, Exporter};

    fn project(name: &str) -> Project {
        Project::new(
            name,
            Connector::new(Configurable::default()),
            Exporter::new(Configurable::default()),
        )
    }

    #[test]
    fn lookup_and_order() {
        let registry = ProjectRegistry::from_projects([project("b"), project("a"), project("b")]);

        assert_eq!(registry.names(), ["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("c").is_none());
        assert_eq!(registry.iter().map(|p| p.name().to_owned()).collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn lookup_through_trait() {
        let registry = ProjectRegistry::from_projects([project("a")]);
        let lookup: &dyn ProjectLookup = &registry;
        assert_eq!(lookup.project("a").unwrap().name(), "a");
    }
}
