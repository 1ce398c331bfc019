use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

// A command isolated in its own data and book directories
fn kompanion(root: &Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("kompanion")?;
    cmd.env_remove("KOMPANION_CONFIG")
        .env_remove("KOMPANION_SESSION")
        .env_remove("RUST_LOG")
        .env("KOMPANION_APP_DATA_PATH", root.join("data"))
        .env("KOMPANION_BOOK_STORAGE_TYPE", "local")
        .env("KOMPANION_BOOK_STORAGE_PATH", root.join("books"))
        .env("KOMPANION_AUTH_BCRYPT_COST", "4")
        .env("KOMPANION_LOG_LEVEL", "error");
    Ok(cmd)
}

fn stdout_of(cmd: &mut Command) -> Result<String, Box<dyn std::error::Error>> {
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(String::from_utf8(output)?.trim().to_string())
}

// Register alice and return a session key
fn login(root: &TempDir) -> Result<String, Box<dyn std::error::Error>> {
    kompanion(root.path())?
        .args(["user", "register", "alice", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered user 'alice'"));
    stdout_of(kompanion(root.path())?.args(["user", "login", "alice", "--password", "secret"]))
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("kompanion")?;
    cmd.arg("--ping");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pong"));
    Ok(())
}

#[test]
fn test_no_command_fails() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    kompanion(root.path())?
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No command given"));
    Ok(())
}

#[test]
fn test_config_show_reflects_environment() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    kompanion(root.path())?
        .env("KOMPANION_APP_NAME", "Shelf")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Shelf\""))
        .stdout(predicate::str::contains("\"bcrypt_cost\": 4"));
    Ok(())
}

#[test]
fn test_invalid_configuration_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    kompanion(root.path())?
        .env("KOMPANION_BOOK_STORAGE_TYPE", "s3")
        .args(["config", "show"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load configuration"));
    Ok(())
}

#[test]
fn test_session_survives_between_invocations() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let session = login(&root)?;
    assert_eq!(session.len(), 32);

    kompanion(root.path())?
        .args(["user", "whoami", "--session", &session])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("alice ("));

    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["user", "logout"])
        .assert()
        .success();

    kompanion(root.path())?
        .args(["user", "whoami", "--session", &session])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Session not found"));
    Ok(())
}

#[test]
fn test_wrong_password_fails() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    login(&root)?;
    kompanion(root.path())?
        .args(["user", "login", "alice", "--password", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid username or password"));
    Ok(())
}

#[test]
fn test_device_commands() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let session = login(&root)?;

    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["device", "add", "kobo", "--password", "password"])
        .assert()
        .success();
    kompanion(root.path())?
        .args(["device", "verify", "kobo", "--password", "5f4dcc3b5aa765d61d8327deb882cf99", "--hashed"])
        .assert()
        .success()
        .stdout(predicate::str::diff("valid\n"));
    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kobo\t"));
    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["device", "remove", "kobo"])
        .assert()
        .success();
    kompanion(root.path())?
        .args(["device", "verify", "kobo", "--password", "password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Device 'kobo' not found"));
    Ok(())
}

#[test]
fn test_book_progress_and_stats_flow() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let session = login(&root)?;
    let upload = root.path().join("Frank Herbert - Dune.epub");
    fs::write(&upload, b"not really an epub")?;

    let added = stdout_of(
        kompanion(root.path())?
            .env("KOMPANION_SESSION", &session)
            .arg("book")
            .arg("add")
            .arg(&upload),
    )?;
    let book: serde_json::Value = serde_json::from_str(&added)?;
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["author"], "Frank Herbert");
    assert_eq!(book["format"], "epub");
    let book_id = book["id"].as_str().ok_or("missing id")?.to_string();
    let document_id = book["document_id"].as_str().ok_or("missing document_id")?.to_string();

    kompanion(root.path())?
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 book(s) in library"))
        .stdout(predicate::str::contains(book_id.as_str()));

    let out_dir = root.path().join("downloads");
    fs::create_dir_all(&out_dir)?;
    kompanion(root.path())?
        .args(["book", "download", &book_id, "--output"])
        .arg(&out_dir)
        .assert()
        .success();
    let downloaded = fs::read(out_dir.join(format!("{}.epub", document_id)))?;
    assert_eq!(downloaded, b"not really an epub");

    for (pct, ts) in [("0.5", "1700000000"), ("0.97", "1700001800")] {
        kompanion(root.path())?
            .env("KOMPANION_SESSION", &session)
            .args(["progress", "push", &book_id, pct, "--device", "kobo", "--timestamp", ts])
            .assert()
            .success();
    }
    let latest = stdout_of(
        kompanion(root.path())?
            .env("KOMPANION_SESSION", &session)
            .args(["progress", "get", &book_id]),
    )?;
    let latest: serde_json::Value = serde_json::from_str(&latest)?;
    assert_eq!(latest["percentage"], 0.97);

    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["stats", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_books_finished\": 1"));
    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["stats", "activity", "--period", "year"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2023\t1\n"));
    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["stats", "activity", "--period", "week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown activity period 'week'"));

    kompanion(root.path())?
        .env("KOMPANION_SESSION", &session)
        .args(["book", "remove", &book_id])
        .assert()
        .success();
    kompanion(root.path())?
        .args(["book", "show", &book_id])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_progress_of_two_users_on_one_document() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let alice = login(&root)?;
    kompanion(root.path())?
        .args(["user", "register", "bob", "--password", "hunter2"])
        .assert()
        .success();
    let bob = stdout_of(kompanion(root.path())?.args(["user", "login", "bob", "--password", "hunter2"]))?;

    let document = "6f1c2a7e-9b4d-4c8e-a1f0-3d2b5e6c7a81";
    for (session, pct, device, ts) in [
        (&alice, "0.4", "kindle", "1700000000"),
        (&bob, "0.1", "kobo", "1700000100"),
    ] {
        kompanion(root.path())?
            .env("KOMPANION_SESSION", session)
            .args(["progress", "push", document, pct, "--device", device, "--timestamp", ts])
            .assert()
            .success();
    }

    for (session, expected) in [(&alice, 0.4), (&bob, 0.1)] {
        let latest = stdout_of(
            kompanion(root.path())?
                .env("KOMPANION_SESSION", session)
                .args(["progress", "get", document]),
        )?;
        let latest: serde_json::Value = serde_json::from_str(&latest)?;
        assert_eq!(latest["percentage"], expected);
    }
    Ok(())
}
