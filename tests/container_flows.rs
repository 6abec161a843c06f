mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use predictpool_client::models::{
    Group, MemberAction, PredictionInput, PredictionStatus,
};
use predictpool_client::state::{AppState, Route, ToastKind};
use predictpool_client::transport::Method;
use predictpool_client::{
    auth_fetch, group_fetch, league_fetch, match_fetch, prediction_fetch,
};
use serde_json::json;

use common::{ScriptedTransport, frozen_clock, test_client};

fn prediction_json(id: u64, fixture_id: u64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "fixtureId": fixture_id,
        "score1": 2,
        "score2": 1,
        "points": null,
        "predictionStatus": status
    })
}

#[test]
fn login_stores_the_token_and_routes_home() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Post,
        "/auth/login",
        json!({
            "accessToken": "tok-abc",
            "user": {"id": 7, "username": "jo", "email": "jo@example.com", "role": "USER"}
        }),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    auth_fetch::login(&client, &mut state, &clock, "jo", "hunter2");

    assert_eq!(client.session().token().as_deref(), Some("tok-abc"));
    assert_eq!(state.route, Route::Home);
    assert_eq!(state.toasts.len(), 1);
    assert_eq!(state.toasts[0].message, "Welcome back, jo!");
}

#[test]
fn failed_login_stays_on_login_with_an_error_toast() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        Method::Post,
        "/auth/login",
        400,
        common::error_body("Invalid username or password"),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    auth_fetch::login(&client, &mut state, &clock, "jo", "wrong");

    assert_eq!(state.route, Route::Login);
    assert!(client.session().token().is_none());
    assert_eq!(state.toasts[0].kind, ToastKind::Error);
    assert_eq!(state.toasts[0].message, "Invalid username or password");
    assert_eq!(
        state.auth_error.as_deref(),
        Some("Invalid username or password")
    );
}

#[test]
fn create_prediction_merges_without_refetching_the_list() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Get,
        "/predictions",
        json!([prediction_json(1, 10, "EDITABLE")]),
    );
    transport.on_success(
        Method::Post,
        "/predictions",
        prediction_json(2, 11, "SUBMITTED"),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    prediction_fetch::fetch_predictions(&client, &mut state, &clock);
    let input = PredictionInput {
        fixture_id: 11,
        score1: 2,
        score2: 1,
    };
    prediction_fetch::create_prediction(&client, &mut state, &clock, &input);

    // One GET, one POST; the mutation did not trigger a list refetch.
    assert_eq!(transport.call_count(), 2);
    assert_eq!(state.predictions.len(), 2);
    let created = state.prediction_for_fixture(11).unwrap();
    assert_eq!(created.prediction_status, PredictionStatus::Submitted);
    assert_eq!(state.toasts.last().unwrap().message, "Prediction saved");
}

#[test]
fn batch_submit_merges_every_returned_prediction() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Post,
        "/predictions/batch",
        json!([
            prediction_json(1, 10, "SUBMITTED"),
            prediction_json(2, 11, "SUBMITTED")
        ]),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    let inputs = vec![
        PredictionInput { fixture_id: 10, score1: 2, score2: 1 },
        PredictionInput { fixture_id: 11, score1: 0, score2: 0 },
    ];
    prediction_fetch::submit_batch(&client, &mut state, &clock, &inputs);

    assert_eq!(state.predictions.len(), 2);
    assert_eq!(
        state.toasts.last().unwrap().message,
        "2 predictions submitted"
    );
}

#[test]
fn member_approval_merges_the_updated_row() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Get,
        "/groups/1/members",
        json!([
            {"userId": 7, "username": "jo", "role": "ADMIN", "status": "APPROVED", "joinedAt": ""},
            {"userId": 8, "username": "sam", "role": "MEMBER", "status": "PENDING", "joinedAt": ""}
        ]),
    );
    transport.on_success(
        Method::Post,
        "/groups/1/members",
        json!({"userId": 8, "username": "sam", "role": "MEMBER", "status": "APPROVED", "joinedAt": ""}),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    group_fetch::fetch_members(&client, &mut state, &clock, 1);
    group_fetch::member_action(&client, &mut state, &clock, 1, 8, MemberAction::Approve);

    assert_eq!(state.members.len(), 2);
    let sam = state.members.iter().find(|m| m.user_id == 8).unwrap();
    assert_eq!(sam.status, predictpool_client::models::MemberStatus::Approved);
    assert_eq!(state.toasts.last().unwrap().message, "sam approved");
}

#[test]
fn leaderboard_gets_dense_ranks() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Get,
        "/predictions/leaderboard/5",
        json!([
            {"userId": 1, "username": "ana", "points": 10, "predictions": 6},
            {"userId": 2, "username": "ben", "points": 14, "predictions": 6},
            {"userId": 3, "username": "cal", "points": 10, "predictions": 5},
            {"userId": 4, "username": "dee", "points": 7, "predictions": 6}
        ]),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    league_fetch::fetch_leaderboard(&client, &mut state, &clock, 5);

    assert_eq!(state.leaderboard_group_id, Some(5));
    let ranks: Vec<(u32, &str)> = state
        .leaderboard
        .iter()
        .map(|e| (e.rank, e.username.as_str()))
        .collect();
    assert_eq!(ranks, vec![(1, "ben"), (2, "ana"), (2, "cal"), (3, "dee")]);
}

#[test]
fn fixture_fetch_reuses_the_container_window() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_success(
        Method::Get,
        "/matches/fixtures",
        json!([{
            "fixtureId": 10,
            "homeTeam": "Arsenal",
            "awayTeam": "Spurs",
            "date": "2025-10-04T15:00:00Z",
            "status": "NS"
        }]),
    );
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();

    match_fetch::fetch_fixtures(&client, &mut state, &clock, Some("EPL"), None);
    match_fetch::fetch_fixtures(&client, &mut state, &clock, Some("EPL"), None);

    assert_eq!(transport.call_count(), 1);
    assert_eq!(state.fixture_pages.len(), 1);

    // A different filter is its own page and its own fetch.
    match_fetch::fetch_fixtures(&client, &mut state, &clock, Some("LALIGA"), None);
    assert_eq!(transport.call_count(), 2);
    assert_eq!(state.fixture_pages.len(), 2);
}

#[test]
fn ensure_session_gates_on_the_embedded_expiry() {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let transport = Arc::new(ScriptedTransport::new());
    let clock = frozen_clock();
    let client = test_client(Arc::clone(&transport), clock.clone());
    let mut state = AppState::new();
    state.route = Route::Home;
    apply_test_user(&mut state);

    // Token expired an hour before the frozen clock.
    let exp = clock.now() - chrono::Duration::hours(1);
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": 7, "exp": exp.timestamp()}).to_string());
    client.session().set_token(&format!("{header}.{payload}.sig"));

    assert!(!auth_fetch::ensure_session(&client, &mut state, &clock));
    assert_eq!(state.route, Route::Login);
    assert!(client.session().token().is_none());
    // Nothing ever went over the wire.
    assert_eq!(transport.call_count(), 0);
}

fn apply_test_user(state: &mut AppState) {
    predictpool_client::state::apply_delta(
        state,
        predictpool_client::state::Delta::SessionEstablished(
            predictpool_client::models::UserProfile {
                id: 7,
                username: "jo".to_string(),
                email: "jo@example.com".to_string(),
                role: "USER".to_string(),
            },
        ),
    );
}

#[test]
fn group_features_unlock_after_the_activation_window() {
    let group = Group {
        id: 1,
        name: "The Lads".to_string(),
        league: "EPL".to_string(),
        admin_id: 7,
        invite_code: "ABC123".to_string(),
        member_count: 3,
        created_at: "2025-09-01T10:00:00Z".to_string(),
    };
    let now = Utc.with_ymd_and_hms(2025, 10, 3, 12, 0, 0).unwrap();

    // ~4.6 weeks old: unlocked at 4, still locked at 6.
    assert!(group_fetch::features_unlocked(&group, now, 4));
    assert!(!group_fetch::features_unlocked(&group, now, 6));
    assert!(group_fetch::features_unlocked(&group, now, 0));

    let no_date = Group {
        created_at: String::new(),
        ..group
    };
    assert!(!group_fetch::features_unlocked(&no_date, now, 4));
}
