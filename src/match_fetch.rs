use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::Fixture;
use crate::state::{AppState, Delta, Slice, apply_delta, fixture_params_key, surface_api_error};

pub fn fetch_live(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Fixture>>("/matches/live", &[]) {
        Ok(fixtures) => apply_delta(state, Delta::SetLiveMatches(fixtures)),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}

pub fn fetch_match(client: &ApiClient, state: &mut AppState, clock: &Clock, fixture_id: u64) {
    let path = format!("/matches/{fixture_id}");
    match client.get::<Fixture>(&path, &[]) {
        Ok(fixture) => apply_delta(state, Delta::SetMatchDetail(fixture)),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}

/// Fixture list for a league/date filter. On top of the shared response
/// cache, the container keeps its own per-parameter reuse window so a
/// remounting view does not refire an identical fetch.
pub fn fetch_fixtures(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    league: Option<&str>,
    date: Option<&str>,
) {
    let key = fixture_params_key(league, date);
    let now = clock.now();
    if let Some(fetched_at) = state.fixture_fetched_at.get(&key)
        && now - *fetched_at <= client.response_cache().ttl()
        && state.fixture_pages.contains_key(&key)
    {
        return;
    }

    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(league) = league.map(str::trim).filter(|s| !s.is_empty()) {
        query.push(("league", league));
    }
    if let Some(date) = date.map(str::trim).filter(|s| !s.is_empty()) {
        query.push(("date", date));
    }

    match client.get::<Vec<Fixture>>("/matches/fixtures", &query) {
        Ok(fixtures) => apply_delta(
            state,
            Delta::SetFixtures {
                params_key: key,
                fixtures,
                fetched_at: now,
            },
        ),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}

pub fn fetch_statuses(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<String>>("/matches/statuses", &[]) {
        Ok(statuses) => apply_delta(state, Delta::SetStatuses(statuses)),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}

pub fn fetch_upcoming(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Fixture>>("/matches/upcoming", &[]) {
        Ok(fixtures) => apply_delta(state, Delta::SetUpcoming(fixtures)),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}

/// Most-predicted fixtures of the week.
pub fn fetch_top(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Fixture>>("/matches/top", &[]) {
        Ok(fixtures) => apply_delta(state, Delta::SetTopFixtures(fixtures)),
        Err(err) => surface_api_error(state, Slice::Matches, &err, clock.now()),
    }
}
