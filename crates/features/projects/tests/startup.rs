pub mod fixtures;

use conduit_domain::binding::BindingState;
use conduit_domain::config::BindingConfig;
use conduit_kernel::config::FlatConfig;
use conduit_projects::*;
use conduit_services::{FactoryConfigStore, ServiceRegistry};
use fixtures::*;
use std::time::Duration;

fn settings() -> BindingConfig {
    BindingConfig { timeout_ms: 200, ..BindingConfig::default() }
}

fn service(source: FlatConfig, store: &FactoryConfigStore, registry: &ServiceRegistry) -> ProjectService {
    ProjectService::builder()
        .config_source(source)
        .sink(store.clone())
        .registry(registry.clone())
        .settings(settings())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_both_services_available_binds_project() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    register_source(&registry, "X");
    register_exporter(&registry, "Y");

    let report = service(single_project(), &store, &registry).start().await.unwrap();

    let project = report.registry.lookup("a").unwrap();
    assert_eq!(project.connector().service().unwrap().source_id(), "X");
    assert_eq!(project.exporter().service().unwrap().exporter_id(), "Y");
    assert!(project.binding_state().is_complete());
    assert_eq!((report.assembled, report.bound, report.failed), (1, 2, 0));
    assert_eq!(store.pids().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_missing_exporter_service_leaves_half_bound_project() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    register_source(&registry, "X");

    let report = service(single_project(), &store, &registry).start().await.unwrap();

    let project = report.registry.lookup("a").unwrap();
    assert_eq!(project.binding_state(), BindingState::CONNECTOR);
    assert!(project.exporter().service().is_none());
    assert_eq!((report.bound, report.failed), (1, 1));

    assert_eq!(logs.count("Service binding failed"), 1);
    let contents = logs.contents();
    assert!(contents.contains("role=exporter"));
    assert!(contents.contains("E1"));
    // The factory configuration is kept even though no service appeared.
    assert!(store.get("E1").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_project_without_exporter_is_absent() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    let source = config(
        &["a", "b"],
        &[
            ("project.a.connector.pid", "C1"),
            ("project.b.connector.pid", "C2"),
            ("project.b.exporter.pid", "E2"),
        ],
    );

    let report = service(source, &store, &registry).start().await.unwrap();

    assert!(report.registry.lookup("a").is_none());
    let b = report.registry.lookup("b").unwrap();
    // No identity property configured, so neither half can be resolved.
    assert_eq!(b.binding_state(), BindingState::empty());
    assert_eq!(report.failed, 2);
    assert!(store.get("C1").is_none());
    assert!(store.get("C2").is_some());
}

#[tokio::test]
async fn test_absent_project_list_yields_empty_registry() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    let source = unlisted(&[("project.a.connector.pid", "C1")]);

    let report = service(source, &store, &registry).start().await.unwrap();

    assert!(report.registry.is_empty());
    assert_eq!((report.assembled, report.bound, report.failed), (0, 0, 0));
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_name_order_does_not_change_outcomes() {
    let entries = [
        ("project.a.connector.pid", "C1"),
        ("project.a.connector.type", "X"),
        ("project.a.exporter.pid", "E1"),
        ("project.a.exporter.type", "Y"),
        ("project.b.connector.pid", "C2"),
        ("project.c.connector.pid", "C3"),
        ("project.c.connector.type", "X"),
        ("project.c.exporter.pid", "E3"),
        ("project.c.exporter.type", "Y"),
    ];

    let mut outcomes = Vec::new();
    for order in [["a", "b", "c"], ["c", "b", "a"], ["b", "a", "c"]] {
        let store = FactoryConfigStore::new();
        let registry = ServiceRegistry::new();
        register_source(&registry, "X");
        register_exporter(&registry, "Y");

        let report = service(config(&order, &entries), &store, &registry).start().await.unwrap();
        let mut names: Vec<String> = report.registry.names().to_vec();
        names.sort();
        let states: Vec<BindingState> =
            names.iter().map(|n| report.registry.lookup(n).unwrap().binding_state()).collect();
        outcomes.push((names, states));
    }

    assert_eq!(outcomes[0].0, ["a", "c"]);
    assert!(outcomes.iter().all(|o| o == &outcomes[0]));
}

#[tokio::test]
async fn test_late_service_registration_is_bound() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    register_source(&registry, "X");

    let late = registry.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        register_exporter(&late, "Y");
    });

    let report = service(single_project(), &store, &registry).start().await.unwrap();
    assert!(report.registry.lookup("a").unwrap().binding_state().is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_identity_mismatch_is_not_bound() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    register_source(&registry, "X");
    register_exporter(&registry, "Z");

    let report = service(single_project(), &store, &registry).start().await.unwrap();
    let project = report.registry.lookup("a").unwrap();
    assert_eq!(project.binding_state(), BindingState::CONNECTOR);
}

#[tokio::test]
async fn test_malformed_pid_aborts_before_any_registration() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    let mut source = config(
        &["a", "b"],
        &[
            ("project.a.connector.pid", "C1"),
            ("project.a.exporter.pid", "E1"),
            ("project.b.exporter.pid", "E2"),
        ],
    );
    source.insert("project.b.connector.pid", 42_i64);

    let err = service(source, &store, &registry).start().await.unwrap_err();
    assert!(matches!(err, StartupError::Assembly { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_builder_requires_collaborators() {
    let err = ProjectService::builder().sink(FactoryConfigStore::new()).build().unwrap_err();
    assert!(matches!(err, StartupError::MissingCollaborator { .. }));
}

#[test]
fn test_start_blocking_outside_runtime() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();
    register_source(&registry, "X");
    register_exporter(&registry, "Y");

    let report = service(single_project(), &store, &registry).start_blocking().unwrap();
    assert_eq!(report.bound, 2);
}

#[tokio::test]
async fn test_start_blocking_inside_runtime_is_rejected() {
    let store = FactoryConfigStore::new();
    let registry = ServiceRegistry::new();

    let err = service(FlatConfig::new(), &store, &registry).start_blocking().unwrap_err();
    assert_eq!(err.kind(), "Runtime");
}
