//! Config file loading tests.

use std::fs;
use std::path::Path;

use skiff_config::{Config, ConfigError};
use tempfile::TempDir;

const TWO_TARGET_CONFIG: &str = r#"
[targets.index]
manifest = "Cargo.toml"
out_dir = "dist/js"

[targets.why-ui]
manifest = "why-ui/Cargo.toml"
out_dir = "dist/why-ui"
sourcemaps = false

[[targets.why-ui.copy]]
from = "static"
to = "assets"

[dev]
port = 3000
open = false
"#;

#[test]
fn loads_two_target_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("skiff.toml"), TWO_TARGET_CONFIG).unwrap();

    let config = Config::load(temp.path(), None).unwrap();

    assert_eq!(config.targets.len(), 2);

    let index = config.target("index").unwrap();
    assert!(index.sourcemaps);
    assert_eq!(index.manifest, temp.path().join("Cargo.toml"));
    assert_eq!(index.out_dir, temp.path().join("dist/js"));
    assert!(index.copy.is_empty());

    let ui = config.target("why-ui").unwrap();
    assert!(!ui.sourcemaps);
    assert_eq!(ui.copy.len(), 1);
    assert_eq!(ui.copy[0].from, "static");
    assert_eq!(ui.copy[0].to, "assets");

    assert_eq!(config.dev.port, 3000);
    assert!(!config.dev.open);
}

#[test]
fn missing_default_file_yields_empty_target_set() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(temp.path(), None).unwrap();
    assert!(config.targets.is_empty());
    assert_eq!(config.dev.port, 8080);
}

#[test]
fn explicit_missing_path_is_an_error() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path(), Some(Path::new("nope.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn target_without_manifest_is_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("skiff.toml"),
        "[targets.index]\nout_dir = \"dist\"\n",
    )
    .unwrap();

    let err = Config::load(temp.path(), None).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("targets.index.manifest"), "got: {msg}");
}

#[test]
fn env_overrides_dev_settings() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("skiff.toml", TWO_TARGET_CONFIG)?;
        jail.set_env("SKIFF_DEV_PORT", "4000");

        let config = Config::load(jail.directory(), None).expect("config loads");
        assert_eq!(config.dev.port, 4000);
        Ok(())
    });
}
