use conduit_kernel::config::{ConfigSource, load_settings};
use conduit_kernel::domain::property::PropertyValue;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const CONDUIT_TOML: &str = r#"
[logging]
level = "debug"

[binding]
timeout_ms = 250
connector_id_key = "kind"

[project]
projects = ["alpha"]

[project.alpha.connector]
pid = "C1"
kind = "jira"

[project.alpha.exporter]
pid = "E1"
type = "csv"
"#;

fn write_config() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(CONDUIT_TOML.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn loads_typed_sections_and_flat_space() {
    let file = write_config();
    let loaded = load_settings(Some(file.path())).unwrap();

    assert_eq!(loaded.config.logging.level, "debug");
    assert_eq!(loaded.config.binding.timeout_ms, 250);
    assert_eq!(loaded.config.binding.connector_id_key, "kind");
    assert_eq!(loaded.config.binding.exporter_id_key, "type");

    assert_eq!(loaded.space.get_array("project.projects"), Some(vec!["alpha".to_owned()]));
    assert_eq!(loaded.space.get("project.alpha.exporter.type"), Some(&PropertyValue::from("csv")));
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_settings(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("Failed to build config"));
}
