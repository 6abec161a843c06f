use serde_json::Value;

use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::{
    AuthSession, AuthStatus, LoginRequest, OauthCompleteRequest, OauthRedirect, RegisterRequest,
    UsernameCheck,
};
use crate::state::{AppState, Delta, Slice, Toast, apply_delta, surface_api_error};

pub fn login(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    username: &str,
    password: &str,
) {
    let payload = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    match client.post::<AuthSession>("/auth/login", &payload) {
        Ok(session) => {
            let name = session.user.username.clone();
            establish_session(client, state, session);
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("Welcome back, {name}!"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Auth, &err, clock.now()),
    }
}

pub fn register(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    username: &str,
    email: &str,
    password: &str,
) {
    let payload = RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    match client.post::<AuthSession>("/auth/register", &payload) {
        Ok(session) => {
            let name = session.user.username.clone();
            establish_session(client, state, session);
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("Account created. Welcome, {name}!"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Auth, &err, clock.now()),
    }
}

/// Best-effort server-side logout, then local teardown either way.
pub fn logout(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    let _ = client.post_empty::<Value>("/auth/logout");
    client.session().clear();
    apply_delta(state, Delta::ForceLogout);
    apply_delta(
        state,
        Delta::PushToast(Toast::info("Signed out", clock.now())),
    );
}

pub fn check_status(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<AuthStatus>("/auth/status", &[]) {
        Ok(status) => {
            let user = if status.authenticated { status.user } else { None };
            apply_delta(state, Delta::SessionChecked(user));
        }
        Err(err) => surface_api_error(state, Slice::Auth, &err, clock.now()),
    }
}

/// The client-side expiry gate: the token's `exp` claim is checked before
/// any authenticated render. Returns false (and drops to the login route)
/// when there is no usable session.
pub fn ensure_session(client: &ApiClient, state: &mut AppState, clock: &Clock) -> bool {
    if !client.session().is_expired() {
        return true;
    }
    client.session().clear();
    if state.is_logged_in() || state.route != crate::state::Route::Login {
        apply_delta(state, Delta::ForceLogout);
        apply_delta(
            state,
            Delta::PushToast(Toast::error(
                "Your session has expired. Please log in again.",
                clock.now(),
            )),
        );
    }
    false
}

/// URL the view should open to start the Google OAuth dance; the redirect
/// itself happens outside this crate.
pub fn oauth_login_url(client: &ApiClient, state: &mut AppState, clock: &Clock) -> Option<String> {
    match client.get::<OauthRedirect>("/oauth/google/login", &[]) {
        Ok(redirect) => Some(redirect.url),
        Err(err) => {
            surface_api_error(state, Slice::Auth, &err, clock.now());
            None
        }
    }
}

/// Finishes an OAuth signup once the user has picked a username.
pub fn oauth_complete(client: &ApiClient, state: &mut AppState, clock: &Clock, username: &str) {
    let payload = OauthCompleteRequest {
        username: username.to_string(),
    };
    match client.post::<AuthSession>("/oauth/google/complete", &payload) {
        Ok(session) => {
            let name = session.user.username.clone();
            establish_session(client, state, session);
            apply_delta(
                state,
                Delta::PushToast(Toast::success(format!("Welcome, {name}!"), clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Auth, &err, clock.now()),
    }
}

pub fn check_username(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    username: &str,
) -> Option<bool> {
    let path = format!("/oauth/check-username/{username}");
    match client.get::<UsernameCheck>(&path, &[]) {
        Ok(check) => Some(check.available),
        Err(err) => {
            surface_api_error(state, Slice::Auth, &err, clock.now());
            None
        }
    }
}

fn establish_session(client: &ApiClient, state: &mut AppState, session: AuthSession) {
    client.session().set_token(&session.access_token);
    apply_delta(state, Delta::SessionEstablished(session.user));
}
