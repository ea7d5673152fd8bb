use assert_cmd::Command;
use predicates::prelude::*;

fn ai_scripts(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ai-scripts").unwrap();
    cmd.current_dir(dir)
        .env_remove("SANDRUN_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env("SANDRUN_QUIET", "1")
        .env("SANDRUN_SCRIPT_DIR", dir.join("scripts"));
    cmd
}

#[test]
fn missing_api_key_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();

    ai_scripts(dir.path())
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"))
        .stdout(predicate::str::contains("Generating").not());

    assert!(!dir.path().join("scripts").exists());
}

#[test]
fn zero_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    ai_scripts(dir.path())
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("COUNT"));
}

#[test]
fn run_rejects_unknown_workload_type() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();

    Command::cargo_bin("sandrun")
        .unwrap()
        .current_dir(dir.path())
        .env("SANDRUN_QUIET", "1")
        .env("SANDRUN_TMP_DIR", dir.path().join("tmp"))
        .env("SANDRUN_LOG_DIR", dir.path().join("logs"))
        .arg("run")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not determine workload type"));
}

#[test]
fn clear_registry_removes_cache_dir() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("registry");
    std::fs::create_dir_all(registry.join("bin")).unwrap();
    std::fs::write(registry.join("bin").join("qjs"), b"guest").unwrap();

    Command::cargo_bin("sandrun")
        .unwrap()
        .current_dir(dir.path())
        .env("SANDRUN_QUIET", "1")
        .env("SANDRUN_REGISTRY_DIR", &registry)
        .arg("clear-registry")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared"));

    assert!(!registry.exists());
}
