use folio_domain::config::ApiConfig;
use folio_kernel::config::{ConfigError, ConfigLoader, load_config};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

const SERVER_TOML: &str = r#"
[server]
port = 9000

[content]
page_size = 20

[[content.groups]]
uid = "somegroup"

[content.groups.attributes.name]
type = "string"

[[content.content_types]]
uid = "withgroup"

[content.content_types.attributes.field]
type = "group"
group = "somegroup"
"#;

#[test]
#[serial]
fn loads_models_from_file() {
    let file = write_config(SERVER_TOML);

    let cfg: ApiConfig = load_config(Some(file.path())).expect("config loads");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.content.page_size, 20);
    assert_eq!(cfg.content.groups[0].uid, "somegroup");
    assert_eq!(cfg.content.content_types[0].attributes["field"].group.as_deref(), Some("somegroup"));
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let err = load_config::<ApiConfig>(Some("/definitely/not/here/server.toml"))
        .expect_err("missing file must fail");
    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"));
}

#[test]
#[serial]
fn optional_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cfg: ApiConfig = ConfigLoader::new()
        .path(dir.path().join("absent"))
        .optional()
        .env_prefix("FOLIO_CONFIG_LOADING_TEST")
        .load()
        .expect("defaults load");

    assert_eq!(cfg.server.port, 4583);
    assert_eq!(cfg.content.default_limit, 100);
    assert!(cfg.content.groups.is_empty());
}
