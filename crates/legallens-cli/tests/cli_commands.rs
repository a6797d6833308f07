use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn base_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("legallens"));
    cmd.env("HOME", home).env_remove("LEGALLENS_ADDR");
    cmd
}

fn credentials_path(home: &Path) -> PathBuf {
    home.join(".legallens").join("credentials.json")
}

fn write_credentials(home: &Path, access: &str, refresh: &str) {
    let path = credentials_path(home);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(
        path,
        json!({"access_token": access, "refresh_token": refresh}).to_string(),
    )
    .expect("write credentials");
}

fn read_credentials(home: &Path) -> Option<serde_json::Value> {
    let contents = fs::read_to_string(credentials_path(home)).ok()?;
    Some(serde_json::from_str(&contents).expect("credentials json"))
}

fn profile_body() -> String {
    json!({
        "id": 7,
        "email": "user@example.com",
        "created_at": "2024-01-01T00:00:00Z",
        "last_login": null
    })
    .to_string()
}

#[test]
fn login_stores_credentials() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();

    server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(
            json!({"email": "user@example.com", "password": "secret"}),
        ))
        .with_status(200)
        .with_body(
            json!({"access_token": "A1", "refresh_token": "R1", "token_type": "bearer"})
                .to_string(),
        )
        .create();
    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(profile_body())
        .create();

    base_cmd(home_dir.path())
        .args([
            "--addr",
            &server.url(),
            "login",
            "--email",
            "user@example.com",
            "--password",
            "secret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as user@example.com"));

    let stored = read_credentials(home_dir.path()).expect("stored");
    assert_eq!(stored["access_token"], "A1");
    assert_eq!(stored["refresh_token"], "R1");
}

#[test]
fn login_failure_shows_server_detail() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();

    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(json!({"detail": "Incorrect email or password"}).to_string())
        .create();

    base_cmd(home_dir.path())
        .args([
            "--addr",
            &server.url(),
            "login",
            "--email",
            "user@example.com",
            "--password",
            "wrong",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect email or password"))
        .stderr(predicate::str::contains("session has expired").not());

    assert!(read_credentials(home_dir.path()).is_none());
}

#[test]
fn register_does_not_log_in() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();

    server
        .mock("POST", "/auth/register")
        .with_status(201)
        .with_body(json!({"id": 8, "email": "new@example.com"}).to_string())
        .create();

    base_cmd(home_dir.path())
        .args([
            "--addr",
            &server.url(),
            "register",
            "--email",
            "new@example.com",
            "--password",
            "secret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account created for new@example.com"));

    assert!(read_credentials(home_dir.path()).is_none());
}

#[test]
fn whoami_prints_profile() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(profile_body())
        .create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user@example.com"));
}

#[test]
fn whoami_without_credentials_fails() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    let profile = server.mock("GET", "/users/me").expect(0).create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));

    profile.assert();
}

#[test]
fn expired_access_token_is_renewed_transparently() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create();
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::Json(json!({"refresh_token": "R1"})))
        .with_status(200)
        .with_body(json!({"access_token": "A2", "refresh_token": "R2"}).to_string())
        .expect(1)
        .create();
    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(profile_body())
        .create();
    server
        .mock("GET", "/documents")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(
            json!([{
                "id": 1,
                "title": "Lease agreement",
                "summary": "Residential lease",
                "created_at": "2024-02-01T12:00:00Z"
            }])
            .to_string(),
        )
        .create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lease agreement"))
        .stderr(predicate::str::contains("session has expired").not());

    refresh.assert();
    let stored = read_credentials(home_dir.path()).expect("stored");
    assert_eq!(stored["access_token"], "A2");
    assert_eq!(stored["refresh_token"], "R2");
}

#[test]
fn failed_renewal_ends_session() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create();
    server
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .with_body(json!({"detail": "Invalid refresh token"}).to_string())
        .expect(1)
        .create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Your session has expired. Please log in again.",
        ))
        .stderr(predicate::str::contains("not logged in"));

    assert!(read_credentials(home_dir.path()).is_none());
}

#[test]
fn logout_removes_credentials() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");

    base_cmd(home_dir.path())
        .args(["logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out."));

    assert!(read_credentials(home_dir.path()).is_none());
}

#[test]
fn document_get_and_delete() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(profile_body())
        .expect(2)
        .create();
    server
        .mock("GET", "/document/5")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(
            json!({
                "id": 5,
                "title": "Employment contract",
                "summary": "Full-time role",
                "content": "...",
                "clauses": [{"title": "Non-compete", "content": "Two years, worldwide."}],
                "red_flags": ["Broad non-compete"]
            })
            .to_string(),
        )
        .create();
    let delete = server
        .mock("DELETE", "/document/5")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(json!({"message": "Document deleted successfully"}).to_string())
        .expect(1)
        .create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "get", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Employment contract"))
        .stdout(predicate::str::contains("Broad non-compete"));

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "delete", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted document 5"));

    delete.assert();
}

#[test]
fn document_not_found_reports_detail() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .with_status(200)
        .with_body(profile_body())
        .create();
    server
        .mock("GET", "/document/99")
        .with_status(404)
        .with_body(json!({"detail": "Document not found"}).to_string())
        .create();
    let refresh = server.mock("POST", "/auth/refresh").expect(0).create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "get", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document not found"));

    refresh.assert();
    assert!(read_credentials(home_dir.path()).is_some());
}

#[test]
fn document_upload_sends_file() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let lease = home_dir.path().join("lease.pdf");
    fs::write(&lease, b"%PDF-1.4 lease terms").expect("write lease");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(profile_body())
        .create();
    let upload = server
        .mock("POST", "/document/upload")
        .match_header("authorization", "Bearer A1")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::Regex(
            r#"(?s)name="file"; filename="lease\.pdf".*%PDF-1\.4 lease terms"#.to_string(),
        ))
        .with_status(200)
        .with_body(
            json!({
                "id": 12,
                "summary": "Residential lease",
                "clauses": [],
                "red_flags": ["Automatic renewal"],
                "filename": "lease.pdf"
            })
            .to_string(),
        )
        .expect(1)
        .create();

    base_cmd(home_dir.path())
        .args(["--addr", &server.url(), "documents", "upload"])
        .arg(&lease)
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded lease.pdf as document #12"))
        .stdout(predicate::str::contains("Automatic renewal"));

    upload.assert();
}

#[test]
fn chat_posts_question() {
    let home_dir = tempdir().expect("tempdir");
    write_credentials(home_dir.path(), "A1", "R1");
    let mut server = Server::new();

    server
        .mock("GET", "/users/me")
        .with_status(200)
        .with_body(profile_body())
        .create();
    server
        .mock("POST", "/ai/chat")
        .match_header("authorization", "Bearer A1")
        .match_body(Matcher::Json(
            json!({"document_id": 5, "message": "Is the non-compete enforceable?"}),
        ))
        .with_status(200)
        .with_body(json!({"response": "It depends on the jurisdiction."}).to_string())
        .create();

    base_cmd(home_dir.path())
        .args([
            "--addr",
            &server.url(),
            "chat",
            "5",
            "Is the non-compete enforceable?",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("It depends on the jurisdiction."));
}

#[test]
fn config_set_addr_is_used_by_later_commands() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    write_credentials(home_dir.path(), "A1", "R1");

    server
        .mock("GET", "/users/me")
        .with_status(200)
        .with_body(profile_body())
        .create();

    base_cmd(home_dir.path())
        .args(["config", "set-addr", &server.url()])
        .assert()
        .success();

    base_cmd(home_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(server.url()));

    base_cmd(home_dir.path())
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as user@example.com"));
}
