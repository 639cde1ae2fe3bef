use conduit_domain::constants::{PROJECTS_KEY, project_prefix};
use conduit_domain::project::{Configurable, Connector, Exporter, Project, Role};
use conduit_kernel::config::ConfigSource;
use conduit_kernel::decoder::{DecodeError, decode};
use fxhash::FxHashMap;
use std::borrow::Cow;
use tracing::{debug, warn};

#[conduit_derive::conduit_error]
pub enum AssemblyError {
    /// A descriptor of the batch could not be decoded; nothing is bound.
    #[error("Project assembly failed{}: {source}", format_context(.context))]
    Decode { source: DecodeError, context: Option<Cow<'static, str>> },
}

/// Assembles every project listed under `project.projects`.
///
/// An absent list yields no projects.
///
/// # Errors
/// Returns [`AssemblyError::Decode`] when any descriptor carries a malformed identity.
pub fn assemble(source: &dyn ConfigSource) -> Result<Vec<Project>, AssemblyError> {
    let Some(names) = source.get_array(PROJECTS_KEY) else {
        debug!(key = PROJECTS_KEY, "No projects configured");
        return Ok(Vec::new());
    };
    assemble_names(&names, source)
}

/// Assembles the named projects, in order. A repeated name keeps its position of first
/// appearance and the descriptors read for its last appearance.
///
/// # Errors
/// See [`assemble`].
pub fn assemble_names<S: AsRef<str>>(
    names: &[S],
    source: &dyn ConfigSource,
) -> Result<Vec<Project>, AssemblyError> {
    let mut projects: Vec<Project> = Vec::with_capacity(names.len());
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();

    for name in names.iter().map(AsRef::as_ref) {
        let Some(project) = assemble_one(name, source)? else {
            continue;
        };
        match positions.get(name) {
            Some(&index) => {
                warn!(project = name, "Project listed more than once; the last entry wins");
                projects[index] = project;
            },
            None => {
                positions.insert(name.to_owned(), projects.len());
                projects.push(project);
            },
        }
    }

    Ok(projects)
}

fn assemble_one(name: &str, source: &dyn ConfigSource) -> Result<Option<Project>, AssemblyError> {
    let prefix = project_prefix(name);

    let Some(connector) = read_descriptor(source, &prefix, name, Role::Connector)? else {
        return Ok(None);
    };
    let Some(exporter) = read_descriptor(source, &prefix, name, Role::Exporter)? else {
        return Ok(None);
    };

    debug!(project = name, "Project assembled");
    Ok(Some(Project::new(name, Connector::new(connector), Exporter::new(exporter))))
}

fn read_descriptor(
    source: &dyn ConfigSource,
    project_prefix: &str,
    name: &str,
    role: Role,
) -> Result<Option<Configurable>, AssemblyError> {
    let prefix = format!("{project_prefix}.{role}");
    let entries = source.properties_under(&prefix);
    if entries.is_empty() {
        debug!(project = name, %role, "Descriptor missing; skipping project");
        return Ok(None);
    }

    decode(entries, &prefix).map(Some).map_err(|source| AssemblyError::Decode {
        source,
        context: Some(format!("project '{name}' {role}").into()),
    })
}
