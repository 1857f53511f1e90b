use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn tether_cmd() -> Command {
    Command::cargo_bin("tether").unwrap()
}

const UNIVERSE: &str = r#"
[[module]]
name = "app"
version = "1.0.0"
import = [{ package = "p" }, { package = "q" }]
dynamic-import = [{ package = "plugins.*" }]

[[module]]
name = "c"
version = "1.0.0"
export = [{ package = "p", uses = ["q"] }]
import = [{ package = "q", attributes = { vendor = "b" } }]

[[module]]
name = "x"
version = "1.0.0"
export = [{ package = "q" }]

[[module]]
name = "b"
version = "1.0.0"
export = [{ package = "q", attributes = { vendor = "b" } }]

[[module]]
name = "plugin"
version = "1.0.0"
export = [{ package = "plugins.web" }]

[[module]]
name = "lonely"
version = "1.0.0"
import = [{ package = "nowhere" }]
"#;

/// A temp dir holding `universe.toml` and an empty `config.toml`.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("universe.toml"), UNIVERSE).unwrap();
    fs::write(tmp.path().join("config.toml"), "").unwrap();
    tmp
}

fn cmd_in(tmp: &TempDir) -> Command {
    let mut cmd = tether_cmd();
    cmd.current_dir(tmp.path()).args(["--config", "config.toml"]);
    cmd
}

#[test]
fn test_resolve_prints_wires() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["resolve", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package p -> c"))
        .stdout(predicate::str::contains("package q -> b"))
        .stdout(predicate::str::contains("package q -> x").not())
        .stderr(predicate::str::contains("Resolved"))
        .stderr(predicate::str::contains("1 rotation(s)"));
}

#[test]
fn test_resolve_lists_conflicts() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["resolve", "app", "--conflicts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uses conflicts (1):"))
        .stdout(predicate::str::contains("app: sees"));
}

#[test]
fn test_resolve_json() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["resolve", "app", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"root\": \"app\""))
        .stdout(predicate::str::contains("\"rotations\": 1"));
}

#[test]
fn test_resolve_unsatisfied_fails() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["resolve", "lonely"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to resolve."))
        .stderr(predicate::str::contains("import nowhere"));
}

#[test]
fn test_resolve_unknown_module_fails() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["resolve", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown module: ghost"));
}

#[test]
fn test_missing_universe_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "").unwrap();
    cmd_in(&tmp)
        .args(["resolve", "app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find universe.toml"));
}

#[test]
fn test_universe_flag_selects_file() {
    let tmp = project();
    fs::rename(tmp.path().join("universe.toml"), tmp.path().join("other.toml")).unwrap();
    cmd_in(&tmp)
        .args(["--universe", "other.toml", "resolve", "plugin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin"));
}

#[test]
fn test_tree_and_why() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["tree", "app"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("app v1.0.0"))
        .stdout(predicate::str::contains("c v1.0.0 [package p]"));

    cmd_in(&tmp)
        .args(["tree", "app", "--why", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path to b:"));
}

#[test]
fn test_import_wires_plugin() {
    let tmp = project();
    cmd_in(&tmp)
        .args(["import", "app", "plugins.web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app -> plugin (package plugins.web)"));

    cmd_in(&tmp)
        .args(["import", "app", "other.pkg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No provider of other.pkg"));
}
