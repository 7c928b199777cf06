use assert_cmd::Command;
use mockito::{Server, ServerGuard};
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn rolodex(server: &ServerGuard, session_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rolodex-web").unwrap();
    cmd.env("ROLODEX_API_URL", server.url())
        .env("ROLODEX_SESSION_FILE", session_file)
        .env_remove("ROLODEX_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn health(server: &mut ServerGuard) -> Vec<mockito::Mock> {
    let accepted = server
        .mock("GET", "/api/health")
        .match_header("authorization", "Basic YWxpY2U6c2VjcmV0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"healthy"}"#)
        .create();
    let rejected = server
        .mock("GET", "/api/health")
        .match_header("authorization", "Basic YWxpY2U6d3Jvbmc=")
        .with_status(401)
        .with_body(r#"{"message":"Authentication required"}"#)
        .create();

    vec![accepted, rejected]
}

#[test]
fn wrong_password_is_rejected() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    assert!(!session_file.exists());

    rolodex(&server, &session_file)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn password_can_come_from_stdin() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice"])
        .write_stdin("secret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in successfully"));

    assert!(session_file.exists());
}

#[test]
fn managing_contacts_within_a_session() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let _list = server
        .mock("GET", "/api/contacts")
        .match_header("authorization", "Basic YWxpY2U6c2VjcmV0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id":"c-1","fullName":"Alan Turing","email":"alan@bletchley.uk","organization":"GC&CS"},
                {"id":"c-2","fullName":"Ada Lovelace","phone":"+441234567890"}
            ]"#,
        )
        .create();
    let _create = server
        .mock("POST", "/api/contacts")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"c-3","fullName":"Grace Hopper"}"#)
        .create();
    let update = server
        .mock("PUT", "/api/contacts/c-1")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "fullName": "Alan Turing",
            "email": "alan@bletchley.uk",
            "organization": "GC&CS",
            "title": "Cryptanalyst"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"c-1","fullName":"Alan Turing","title":"Cryptanalyst"}"#)
        .create();
    let delete = server
        .mock("DELETE", "/api/contacts/c-2")
        .with_status(200)
        .with_body(r#"{"message":"Contact deleted successfully"}"#)
        .expect(1)
        .create();

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in successfully"));

    rolodex(&server, &session_file)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in, session expires at"));

    rolodex(&server, &session_file)
        .args(["list", "--sort", "name"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)1\. Ada Lovelace.*2\. Alan Turing").unwrap());

    rolodex(&server, &session_file)
        .args(["list", "--query", "bletchley"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alan Turing"))
        .stdout(predicate::str::contains("Ada Lovelace").not());

    rolodex(&server, &session_file)
        .args(["show", "--id", "c-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phone: +441234567890"));

    rolodex(&server, &session_file)
        .args(["add", "--name", "Grace Hopper", "--email", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact added successfully [c-3]"));

    rolodex(&server, &session_file)
        .args(["edit", "--id", "c-1", "--title", "Cryptanalyst"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact updated successfully"));
    update.assert();

    rolodex(&server, &session_file)
        .args(["delete", "--id", "c-2"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete cancelled"));

    rolodex(&server, &session_file)
        .args(["delete", "--id", "c-2", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact deleted successfully"));
    delete.assert();

    rolodex(&server, &session_file)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    rolodex(&server, &session_file)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn server_rejection_mid_session_forces_login() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let _list = server
        .mock("GET", "/api/contacts")
        .with_status(401)
        .with_body(r#"{"message":"Authentication required"}"#)
        .create();

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice", "--password", "secret"])
        .assert()
        .success();
    assert!(session_file.exists());

    rolodex(&server, &session_file)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired, please log in again"));

    assert!(!session_file.exists());
}

#[test]
fn deleting_an_unknown_contact_fails() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let _gone = server
        .mock("DELETE", "/api/contacts/ghost")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Contact not found"}"#)
        .create();

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice", "--password", "secret"])
        .assert()
        .success();

    rolodex(&server, &session_file)
        .args(["delete", "--id", "ghost", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to delete contact: server responded with 404 Not Found: Contact not found",
        ));

    // Still logged in; only the delete failed.
    rolodex(&server, &session_file)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in"));
}

#[test]
fn add_against_a_server_that_only_acknowledges() {
    let mut server = Server::new();
    let _health = health(&mut server);
    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let _create = server
        .mock("POST", "/api/contacts")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Contact created successfully"}"#)
        .create();
    let _list = server
        .mock("GET", "/api/contacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"c-1","fullName":"Alan Turing"},{"id":"c-7","fullName":"Grace Hopper"}]"#)
        .create();

    rolodex(&server, &session_file)
        .args(["login", "--username", "alice", "--password", "secret"])
        .assert()
        .success();

    rolodex(&server, &session_file)
        .args(["add", "--name", "Grace Hopper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact added successfully [c-7]"));
}
