//! End-to-end CLI tests driving the compiled binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const PASSWORD: &str = "Cli-Test-Pw-1!";
const WRONG_PASSWORD: &str = "Wrong-Pw-2@";

fn passkeep(vault_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("passkeep").unwrap();
    cmd.arg("--vault-dir").arg(vault_dir);
    // Isolate from the developer's environment.
    cmd.env_remove("PASSKEEP_PASSWORD");
    cmd.env_remove("PASSKEEP_NEW_PASSWORD");
    cmd
}

fn init_vault(vault_dir: &Path) {
    passkeep(vault_dir)
        .args(["--password", PASSWORD, "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault initialized"));
}

#[test]
fn init_creates_the_vault_files() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    assert!(dir.path().join("salt.bin").exists());
    assert!(dir.path().join("master.key").exists());
    assert!(dir.path().join("passwords.json").exists());
}

#[test]
fn init_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args(["--password", PASSWORD, "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn weak_password_is_rejected_with_its_own_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    passkeep(dir.path())
        .args(["--password", "weak", "init"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn commands_require_initialization() {
    let dir = tempfile::tempdir().unwrap();
    passkeep(dir.path())
        .args(["--password", PASSWORD, "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn wrong_password_fails_with_auth_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args(["--password", WRONG_PASSWORD, "list"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn add_list_show_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args([
            "--password",
            PASSWORD,
            "add",
            "mail",
            "--username",
            "alice",
            "--entry-password",
            "hunter2",
            "--url",
            "https://mail.example.org",
            "--group",
            "work",
        ])
        .assert()
        .success();

    passkeep(dir.path())
        .args(["--password", PASSWORD, "list", "--group", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mail").and(predicate::str::contains("alice")));

    // Password is masked unless revealed.
    passkeep(dir.path())
        .args(["--password", PASSWORD, "show", "mail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********").and(predicate::str::contains("hunter2").not()));

    passkeep(dir.path())
        .args(["--password", PASSWORD, "show", "mail", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));
}

#[test]
fn edit_and_rm_use_group_display_indices() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    for (title, group) in [("personal", "default"), ("jira", "work"), ("github", "work")] {
        passkeep(dir.path())
            .args([
                "--password",
                PASSWORD,
                "add",
                title,
                "--entry-password",
                "pw",
                "--group",
                group,
            ])
            .assert()
            .success();
    }

    // "github" is display index 1 within the work group.
    passkeep(dir.path())
        .args([
            "--password",
            PASSWORD,
            "edit",
            "1",
            "--group",
            "work",
            "--username",
            "alice",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'github'"));

    passkeep(dir.path())
        .args(["--password", PASSWORD, "rm", "0", "--group", "work", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'jira'"));

    passkeep(dir.path())
        .args(["--password", PASSWORD, "search", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github"));
}

#[test]
fn groups_are_derived_from_entries() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args([
            "--password",
            PASSWORD,
            "add",
            "vpn",
            "--entry-password",
            "pw",
            "--group",
            "work",
        ])
        .assert()
        .success();

    passkeep(dir.path())
        .args(["--password", PASSWORD, "groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default (0)").and(predicate::str::contains("work (1)")));
}

#[test]
fn export_then_import_into_a_fresh_vault() {
    let src = tempfile::tempdir().unwrap();
    init_vault(src.path());

    passkeep(src.path())
        .args([
            "--password",
            PASSWORD,
            "add",
            "mail",
            "--username",
            "alice",
            "--entry-password",
            "hunter2",
        ])
        .assert()
        .success();

    let archive = src.path().join("backup.json");
    passkeep(src.path())
        .args(["--password", PASSWORD, "export"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported vault"));

    let dst = tempfile::tempdir().unwrap();
    passkeep(dst.path())
        .args(["--password", PASSWORD, "import", "--yes"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 credential"));

    passkeep(dst.path())
        .args(["--password", PASSWORD, "show", "mail", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));
}

#[test]
fn import_with_wrong_password_changes_nothing() {
    let src = tempfile::tempdir().unwrap();
    init_vault(src.path());
    let archive = src.path().join("backup.json");
    passkeep(src.path())
        .args(["--password", PASSWORD, "export"])
        .arg(&archive)
        .assert()
        .success();

    let dst = tempfile::tempdir().unwrap();
    init_vault(dst.path());
    let salt_before = std::fs::read(dst.path().join("salt.bin")).unwrap();
    let key_before = std::fs::read(dst.path().join("master.key")).unwrap();

    passkeep(dst.path())
        .args(["--password", WRONG_PASSWORD, "import", "--yes"])
        .arg(&archive)
        .assert()
        .failure()
        .code(2);

    assert_eq!(std::fs::read(dst.path().join("salt.bin")).unwrap(), salt_before);
    assert_eq!(std::fs::read(dst.path().join("master.key")).unwrap(), key_before);
}

#[test]
fn export_with_wrong_password_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args(["--password", WRONG_PASSWORD, "export"])
        .arg(dir.path().join("backup.json"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn passwd_rotates_and_resaves_the_vault() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args([
            "--password",
            PASSWORD,
            "add",
            "mail",
            "--entry-password",
            "hunter2",
        ])
        .assert()
        .success();

    const NEW_PASSWORD: &str = "Rotated-Pw-3#";
    passkeep(dir.path())
        .args(["--password", PASSWORD, "passwd"])
        .env("PASSKEEP_NEW_PASSWORD", NEW_PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::contains("Master password changed"));

    // Old password no longer unlocks.
    passkeep(dir.path())
        .args(["--password", PASSWORD, "list"])
        .assert()
        .failure()
        .code(2);

    // New password unlocks and the vault decrypted under the new key.
    passkeep(dir.path())
        .args(["--password", NEW_PASSWORD, "show", "mail", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));
}

#[test]
fn password_stdin_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    init_vault(dir.path());

    passkeep(dir.path())
        .args(["--password-stdin", "list"])
        .write_stdin(format!("{PASSWORD}\n"))
        .assert()
        .success();
}
