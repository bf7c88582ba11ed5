//! `vmwiz` binary tests.

use super::catalog_server;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VALID_SETTINGS: &str = r#"
subscription = "sub-1"
region = "eastus"
vm_name = "sqlvm01"
admin_username = "sqladmin"
admin_password = "Str0ng!Passw0rd"
confirm_password = "Str0ng!Passw0rd"
image = "sql2019-ws2019"
image_sku = "enterprise"
image_version = "15.0.220510"
vm_size = "Standard_D2s_v3"
"#;

fn vmwiz(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vmwiz").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG").env("VMWIZ_ACCESS_TOKEN", "test-token");
    cmd
}

fn write_config(dir: &Path, endpoint: &str, scope: bool) -> std::path::PathBuf {
    let mut content = format!("[catalog]\nendpoint = \"{endpoint}\"\ntimeout_secs = 5\n");
    if scope {
        content.push_str("\n[scope]\nsubscription = \"sub-1\"\nregion = \"eastus\"\n");
    }
    let path = dir.join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_validate_accepts_valid_settings() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9", false);
    let settings = temp.path().join("settings.toml");
    fs::write(&settings, VALID_SETTINGS).unwrap();

    vmwiz(&config)
        .arg("validate")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_reports_every_problem_and_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9", false);
    let settings = temp.path().join("settings.toml");
    let invalid = VALID_SETTINGS
        .replace("sqlvm01", "averyveryverylongname")
        .replace("confirm_password = \"Str0ng!Passw0rd\"", "confirm_password = \"Other!Passw0rd1\"")
        .replace("vm_size = \"Standard_D2s_v3\"", "vm_size = \"\"");
    fs::write(&settings, invalid).unwrap();

    vmwiz(&config)
        .arg("validate")
        .arg(&settings)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Virtual machine name must be between 1 and 15 characters long.",
        ))
        .stdout(predicate::str::contains("Password and confirm password must match."))
        .stdout(predicate::str::contains("Select a virtual machine size."))
        .stderr(predicate::str::contains("Settings are not valid (3 problem(s))"));
}

#[test]
fn test_validate_json_output() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9", false);
    let settings = temp.path().join("settings.toml");
    fs::write(&settings, VALID_SETTINGS.replace("vm_size = \"Standard_D2s_v3\"", "")).unwrap();

    let output = vmwiz(&config)
        .args(["validate", "--format", "json"])
        .arg(&settings)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0]["field"], "vm_size");
    assert_eq!(report["errors"][0]["message"], "Select a virtual machine size.");
}

#[test]
fn test_validate_rejects_unknown_keys() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9", false);
    let settings = temp.path().join("settings.toml");
    fs::write(&settings, "vm_nmae = \"sqlvm01\"\n").unwrap();

    vmwiz(&config)
        .arg("validate")
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field 'vm_nmae'"));
}

#[test]
fn test_options_requires_scope() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9", false);

    vmwiz(&config)
        .arg("options")
        .assert()
        .failure()
        .stderr(predicate::str::contains("subscription and region"));
}

#[test]
fn test_options_resolves_against_catalog() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &catalog_server::start(), true);

    vmwiz(&config)
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("SQL Server 2019 on Windows Server 2019"))
        .stdout(predicate::str::contains("SQL Server 2017 on Windows Server 2016"))
        .stdout(predicate::str::contains("byol").not())
        .stdout(predicate::str::contains("15.0.220510"))
        .stdout(predicate::str::contains("Standard_D2s_v3"))
        .stdout(predicate::str::contains("Premium_LRS").not());
}

#[test]
fn test_options_json_with_selection() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &catalog_server::start(), true);

    let output = vmwiz(&config)
        .args(["options", "--image", "sql2017-ws2016", "--sku", "standard", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fields: Vec<&str> =
        report.as_array().unwrap().iter().map(|f| f["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["image", "image_sku", "image_version", "vm_size"]);
    assert_eq!(report[0]["selected_id"], "sql2017-ws2016");
    assert_eq!(report[1]["selected_id"], "standard");
    assert_eq!(report[2]["selected_id"], "15.0.220510");
    assert_eq!(report[3]["selected_id"], "Standard_D2s_v3");
}

#[test]
fn test_options_rejects_unknown_image() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &catalog_server::start(), true);

    vmwiz(&config)
        .args(["options", "--image", "sql2008-ws2008"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'sql2008-ws2008' is not an available option for 'Image'",
        ));
}
