//! Tests for the stickerpack binary

use super::common::{stickerpack_command, write_pack_dir};
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

fn run(home: &Path, args: &[&str]) -> Output {
    stickerpack_command()
        .args(args)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("HOME", home)
        .output()
        .unwrap()
}

/// Point the config at `<home>/base` and an unreachable hub.
fn write_config(home: &Path) -> std::path::PathBuf {
    let base = home.join("base");
    let config_dir = home.join("config").join("stickerpack");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.yaml"),
        format!(
            "hub_url: http://127.0.0.1:9\nbase_dir: {}\nrequest_timeout_secs: 2\n",
            base.display()
        ),
    )
    .unwrap();
    base
}

#[test]
fn test_help() {
    let output = stickerpack_command().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("install"));
    assert!(stdout.contains("watch"));

    let output = stickerpack_command()
        .args(["update", "--help"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("--check"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_path_and_default_file() {
    let temp = TempDir::new().unwrap();

    let output = run(temp.path(), &["config", "path"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("stickerpack/config.yaml"));

    let output = run(temp.path(), &["config", "show"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("hub_url"));
    assert!(temp
        .path()
        .join("config/stickerpack/config.yaml")
        .is_file());
}

#[cfg(target_os = "linux")]
#[test]
fn test_list_and_toggle_installed_packs() {
    let temp = TempDir::new().unwrap();
    let base = write_config(temp.path());
    write_pack_dir(&base.join("packs"), "cats", "1.0.0");

    let output = run(temp.path(), &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cats 1.0.0"));

    let output = run(temp.path(), &["disable", "cats"]);
    assert!(output.status.success());
    let output = run(temp.path(), &["list"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("(disabled)"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_remove_unknown_pack_fails() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = run(temp.path(), &["remove", "ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_update_check_unknown_pack_fails() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = run(temp.path(), &["update", "--check", "ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ghost"));
}
