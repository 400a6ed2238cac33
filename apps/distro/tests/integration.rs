//! Integration tests for the distro CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "[paths]\ncatalog_path = {:?}\n\n[cleanup]\ntemp_dir = {:?}\n",
        dir.path().join("catalog.json"),
        dir.path().join("artifacts"),
    );
    std::fs::write(dir.path().join("config.toml"), config).unwrap();
    dir
}

fn distro(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_distro"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(args)
        .env_remove("DISTRO_MAX_CONCURRENT")
        .env_remove("DISTRO_TEMP_DIR")
        .env_remove("DISTRO_CONNECT_TIMEOUT")
        .output()
        .expect("Failed to execute distro")
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_distro"))
        .arg("--version")
        .output()
        .expect("Failed to execute distro");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("distro"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_distro"))
        .arg("--help")
        .output()
        .expect("Failed to execute distro");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["download", "quick-link", "uninstall", "import", "export", "list", "clean"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

#[test]
fn test_download_without_ids_fails() {
    let dir = workspace();
    let output = distro(dir.path(), &["download", "--version", "1.0.0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ops.no_targets_selected"));
}

#[test]
fn test_import_list_export() {
    let dir = workspace();
    let import = dir.path().join("import.json");
    std::fs::write(
        &import,
        r#"{"version":"1","apps":[
            {"name":"Alpha","urlPattern":"https://dl.test/alpha-{version}.apk","packageName":"com.alpha"},
            {"name":"Bravo","urlPattern":"https://dl.test/bravo-{version}.apk"}
        ]}"#,
    )
    .unwrap();

    let output = distro(dir.path(), &["--json", "import", import.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let imported: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(imported["data"]["count"], 2);

    let output = distro(dir.path(), &["--json", "list"]);
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Alpha", "Bravo"]);

    let export = dir.path().join("export.json");
    let output = distro(dir.path(), &["--json", "export", export.to_str().unwrap()]);
    assert!(output.status.success());
    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(exported["apps"][0]["packageName"], "com.alpha");
}

#[test]
fn test_quick_link_miss_is_not_an_error() {
    let dir = workspace();
    let import = dir.path().join("import.json");
    std::fs::write(
        &import,
        r#"{"version":"1","apps":[{"name":"Alpha","urlPattern":"https://dl.test/{version}.apk"}]}"#,
    )
    .unwrap();
    assert!(distro(dir.path(), &["import", import.to_str().unwrap()]).status.success());

    let output = distro(dir.path(), &["--json", "quick-link", "--name", "beta", "1", "--no-wait"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["data"]["state"]["total"], 0);
}
