use chrono::Duration;
use mockito::{Matcher, Server, ServerGuard};
use rolodex_web::prelude::*;
use serde_json::json;

const ALICE: &str = "Basic YWxpY2U6c2VjcmV0";

/// App with a live session for alice against `server`, without going
/// through the login probe.
fn logged_in(server: &ServerGuard) -> Result<App, AppError> {
    let config = Config::default().with_api_url(server.url());
    let credential = Credential::basic("alice", "secret", Duration::hours(2))?;
    let store = MemorySessionStore::with_credential(credential);

    let mut app = App::with_store(&config, Box::new(store))?;
    assert_eq!(app.start()?, Restore::Restored);
    Ok(app)
}

#[test]
fn created_contact_shows_up_once_in_the_listing() -> Result<(), AppError> {
    let mut server = Server::new();
    let draft = ContactDraft::new("Grace Hopper")
        .with_email("grace@navy.mil")
        .with_organization("US Navy");

    let _create = server
        .mock("POST", "/api/contacts")
        .match_header("authorization", ALICE)
        .match_body(Matcher::Json(serde_json::to_value(&draft)?))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "c-42",
                "fullName": "Grace Hopper",
                "email": "grace@navy.mil",
                "organization": "US Navy",
                "lastModified": "\"e42\""
            })
            .to_string(),
        )
        .create();

    let _list = server
        .mock("GET", "/api/contacts")
        .match_header("authorization", ALICE)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "c-1", "fullName": "Alan Turing" },
                {
                    "id": "c-42",
                    "fullName": "Grace Hopper",
                    "email": "grace@navy.mil",
                    "organization": "US Navy",
                    "lastModified": "\"e42\""
                }
            ])
            .to_string(),
        )
        .create();

    let mut app = logged_in(&server)?;
    let created = app.create_contact(&draft, &CancelToken::new())?;
    assert_eq!(created.id, "c-42");

    let listed = app.refresh(&CancelToken::new())?;
    let matching: Vec<&Contact> = listed.iter().filter(|c| c.draft() == draft).collect();

    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
    Ok(())
}

#[test]
fn unauthorized_listing_tears_the_session_down() -> Result<(), AppError> {
    let mut server = Server::new();
    let ok = server
        .mock("GET", "/api/contacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": "c-1", "fullName": "Alan Turing" }]).to_string())
        .create();

    let mut app = logged_in(&server)?;
    app.refresh(&CancelToken::new())?;
    assert_eq!(app.contacts().len(), 1);
    ok.remove();

    let _rejected = server
        .mock("GET", "/api/contacts")
        .with_status(401)
        .with_body(r#"{"message":"Authentication required"}"#)
        .create();

    let err = app.refresh(&CancelToken::new()).unwrap_err();

    assert!(matches!(err, AppError::SessionExpired));
    assert_eq!(app.view(), View::Login);
    assert!(!app.session().is_authenticated());
    assert!(app.contacts().is_empty());
    assert_eq!(app.session().store().load()?, None);
    Ok(())
}

#[test]
fn unauthorized_delete_also_tears_down() -> Result<(), AppError> {
    let mut server = Server::new();
    let _m = server
        .mock("DELETE", "/api/contacts/c-1")
        .with_status(401)
        .create();

    let mut app = logged_in(&server)?;
    let err = app.delete_contact("c-1", &CancelToken::new()).unwrap_err();

    assert!(matches!(err, AppError::SessionExpired));
    assert_eq!(app.view(), View::Login);
    assert!(app.session().credential().is_none());
    Ok(())
}

#[test]
fn contact_calls_without_a_session_go_to_login() -> Result<(), AppError> {
    let mut server = Server::new();
    let untouched = server.mock("GET", "/api/contacts").expect(0).create();
    let config = Config::default().with_api_url(server.url());

    let mut app = App::with_store(&config, Box::new(MemorySessionStore::new()))?;
    app.start()?;

    let err = app.refresh(&CancelToken::new()).unwrap_err();

    assert!(matches!(err, AppError::NotAuthenticated));
    assert_eq!(app.view(), View::Login);
    untouched.assert();
    Ok(())
}

#[test]
fn failed_save_is_reported_and_not_applied() -> Result<(), AppError> {
    let mut server = Server::new();
    let _list = server
        .mock("GET", "/api/contacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": "c-1", "fullName": "Alan Turing" }]).to_string())
        .create();
    let _create = server
        .mock("POST", "/api/contacts")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"No address books found"}"#)
        .create();

    let mut app = logged_in(&server)?;
    app.refresh(&CancelToken::new())?;

    let err = app
        .create_contact(&ContactDraft::new("Grace Hopper"), &CancelToken::new())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to save contact: server responded with 500 Internal Server Error: No address books found"
    );
    assert_eq!(app.contacts().len(), 1);
    // A plain failure keeps the user where they are.
    assert_eq!(app.view(), View::Contacts);
    assert!(app.session().is_authenticated());
    Ok(())
}

#[test]
fn closing_the_form_discards_a_late_update() -> Result<(), AppError> {
    let mut server = Server::new();
    let _list = server
        .mock("GET", "/api/contacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": "c-1", "fullName": "Alan Turing" }]).to_string())
        .create();
    let put = server
        .mock("PUT", "/api/contacts/c-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "c-1", "fullName": "Alan M. Turing" }).to_string())
        .create();

    let mut app = logged_in(&server)?;
    app.refresh(&CancelToken::new())?;

    let form = CancelToken::new().drop_guard();
    let cancel = form.token();
    drop(form);

    let err = app
        .update_contact("c-1", &ContactDraft::new("Alan M. Turing"), &cancel)
        .unwrap_err();

    put.assert();
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(app.contacts().get("c-1").map(|c| c.full_name.as_str()), Some("Alan Turing"));
    Ok(())
}

#[test]
fn logout_drops_cached_contacts() -> Result<(), AppError> {
    let mut server = Server::new();
    let _list = server
        .mock("GET", "/api/contacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": "c-1", "fullName": "Alan Turing" }]).to_string())
        .create();

    let mut app = logged_in(&server)?;
    app.refresh(&CancelToken::new())?;

    app.logout()?;

    assert!(app.contacts().is_empty());
    assert_eq!(app.view(), View::Login);
    Ok(())
}
