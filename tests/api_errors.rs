mod common;

use std::sync::Arc;

use predictpool_client::api::ApiError;
use predictpool_client::clock::Clock;
use predictpool_client::models::UserProfile;
use predictpool_client::profile_fetch;
use predictpool_client::state::{AppState, Route, ToastKind};
use predictpool_client::transport::Method;
use serde_json::json;

use common::{ScriptedTransport, error_body, frozen_clock, test_client};

fn profile_json() -> serde_json::Value {
    json!({"id": 7, "username": "jo", "email": "jo@example.com", "role": "USER"})
}

#[test]
fn envelope_data_is_unwrapped() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(Method::Get, "/users/profile", profile_json());
    let client = test_client(Arc::clone(&transport), frozen_clock());

    let profile: UserProfile = client.get("/users/profile", &[]).unwrap();
    assert_eq!(profile.username, "jo");
}

#[test]
fn four_xx_surfaces_the_server_message() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        Method::Post,
        "/predictions",
        422,
        error_body("Deadline has passed for this fixture"),
    );
    let client = test_client(Arc::clone(&transport), frozen_clock());

    let err = client
        .post::<serde_json::Value>("/predictions", &json!({"fixtureId": 1}))
        .unwrap_err();
    match &err {
        ApiError::Http { status, message, .. } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "Deadline has passed for this fixture");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert!(err.is_client_error());
    assert_eq!(err.user_message(), "Deadline has passed for this fixture");
}

#[test]
fn five_xx_gets_a_generic_user_message() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, "/users/profile", 500, error_body("stack trace"));
    let client = test_client(Arc::clone(&transport), frozen_clock());

    let err = client.get::<UserProfile>("/users/profile", &[]).unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(
        err.user_message(),
        "Something went wrong on the server. Try again."
    );
}

#[test]
fn error_envelope_on_2xx_is_still_an_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, "/users/profile", 200, error_body("not allowed"));
    let client = test_client(Arc::clone(&transport), frozen_clock());

    let err = client.get::<UserProfile>("/users/profile", &[]).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 200, .. }));
}

#[test]
fn non_envelope_body_is_a_decode_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, "/users/profile", 200, "<html>gateway</html>".to_string());
    let client = test_client(Arc::clone(&transport), frozen_clock());

    let err = client.get::<UserProfile>("/users/profile", &[]).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn unauthorized_clears_the_token_and_forces_login() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, "/users/profile", 401, error_body("expired"));
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    client.session().set_token("stale-token");

    let mut state = AppState::new();
    state.route = Route::Home;
    profile_fetch::fetch_profile(&client, &mut state, &clock);

    assert!(client.session().token().is_none());
    assert_eq!(state.route, Route::Login);
    assert!(state.session_user.is_none());
    assert_eq!(state.toasts.len(), 1);
    assert_eq!(state.toasts[0].kind, ToastKind::Error);
    assert_eq!(
        state.toasts[0].message,
        "Your session has expired. Please log in again."
    );
}

#[test]
fn container_failure_resets_slice_and_toasts() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(Method::Get, "/users/profile", 503, error_body("down"));
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());

    let mut state = AppState::new();
    state.profile = Some(UserProfile {
        id: 7,
        username: "jo".to_string(),
        email: "jo@example.com".to_string(),
        role: "USER".to_string(),
    });
    profile_fetch::fetch_profile(&client, &mut state, &clock);

    assert!(state.profile.is_none());
    assert!(state.profile_error.is_some());
    assert_eq!(state.toasts.len(), 1);
    assert_eq!(state.toasts[0].kind, ToastKind::Error);
}

#[test]
fn bearer_token_is_attached_when_present() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(Method::Get, "/users/profile", profile_json());
    let client = test_client(Arc::clone(&transport), frozen_clock());
    client.session().set_token("tok-123");

    let _: UserProfile = client.get("/users/profile", &[]).unwrap();
    assert!(transport.hit_urls()[0].ends_with("/users/profile"));
    assert_eq!(transport.seen_bearers(), vec![Some("tok-123".to_string())]);
}

#[test]
fn clock_type_is_threadsafe_for_shared_clients() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Clock>();
    assert_send_sync::<predictpool_client::api::ApiClient>();
}
