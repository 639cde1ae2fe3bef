use conduit_domain::constants::{
    CONNECTOR, DEFAULT_SERVICE_WAIT_MS, EXPORTER, PID_KEY, PROJECTS_KEY, project_prefix,
};

#[test]
fn constants_match_config_keys() {
    assert_eq!(PROJECTS_KEY, "project.projects");
    assert_eq!(CONNECTOR, "connector");
    assert_eq!(EXPORTER, "exporter");
    assert_eq!(PID_KEY, "pid");
    assert_eq!(DEFAULT_SERVICE_WAIT_MS, 5000);
}

#[test]
fn project_prefix_is_dotted() {
    assert_eq!(project_prefix("alpha"), "project.alpha");
}
