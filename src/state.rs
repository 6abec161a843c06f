use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::api::ApiError;
use crate::models::{
    Fixture, Group, GroupAnalytics, GroupMember, LeaderboardEntry, Prediction, TeamEntry,
    UserProfile, UserStats,
};

const LOG_CAPACITY: usize = 200;
pub const TOAST_TIMEOUT_MS: u64 = 4_000;
pub const ERROR_TOAST_TIMEOUT_MS: u64 = 6_000;

/// Where the view should be. The crate never renders; it only records the
/// destination (the SPA's router did the rest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    Matches,
    Group,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub timeout_ms: u64,
}

impl Toast {
    pub fn success(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            kind: ToastKind::Success,
            message: message.into(),
            created_at: now,
            timeout_ms: TOAST_TIMEOUT_MS,
        }
    }

    pub fn error(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            kind: ToastKind::Error,
            message: message.into(),
            created_at: now,
            timeout_ms: ERROR_TOAST_TIMEOUT_MS,
        }
    }

    pub fn info(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            kind: ToastKind::Info,
            message: message.into(),
            created_at: now,
            timeout_ms: TOAST_TIMEOUT_MS,
        }
    }
}

/// One per state container; names the slice an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Auth,
    Profile,
    Matches,
    Predictions,
    Groups,
    Leaderboard,
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,

    // auth
    pub session_user: Option<UserProfile>,
    pub auth_checked: bool,
    pub auth_error: Option<String>,

    // user/profile
    pub profile: Option<UserProfile>,
    pub user_stats: Option<UserStats>,
    pub profile_error: Option<String>,

    // matches
    pub live_matches: Vec<Fixture>,
    pub upcoming: Vec<Fixture>,
    pub top_fixtures: Vec<Fixture>,
    pub match_statuses: Vec<String>,
    pub fixture_pages: HashMap<String, Vec<Fixture>>,
    pub fixture_fetched_at: HashMap<String, DateTime<Utc>>,
    pub match_detail: HashMap<u64, Fixture>,
    pub matches_error: Option<String>,

    // predictions
    pub predictions: Vec<Prediction>,
    pub prediction_stats: Option<UserStats>,
    pub predictions_error: Option<String>,

    // groups
    pub groups: Vec<Group>,
    pub current_group: Option<Group>,
    pub members: Vec<GroupMember>,
    pub group_analytics: Option<GroupAnalytics>,
    pub teams: Vec<TeamEntry>,
    pub groups_error: Option<String>,

    // leaderboard
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_group_id: Option<u64>,
    pub leaderboard_error: Option<String>,

    // client-local
    pub toasts: Vec<Toast>,
    pub next_toast_id: u64,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            route: Route::Login,
            session_user: None,
            auth_checked: false,
            auth_error: None,
            profile: None,
            user_stats: None,
            profile_error: None,
            live_matches: Vec::with_capacity(16),
            upcoming: Vec::with_capacity(32),
            top_fixtures: Vec::new(),
            match_statuses: Vec::new(),
            fixture_pages: HashMap::with_capacity(8),
            fixture_fetched_at: HashMap::with_capacity(8),
            match_detail: HashMap::with_capacity(16),
            matches_error: None,
            predictions: Vec::with_capacity(32),
            prediction_stats: None,
            predictions_error: None,
            groups: Vec::new(),
            current_group: None,
            members: Vec::new(),
            group_analytics: None,
            teams: Vec::new(),
            groups_error: None,
            leaderboard: Vec::new(),
            leaderboard_group_id: None,
            leaderboard_error: None,
            toasts: Vec::new(),
            next_toast_id: 1,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session_user.is_some()
    }

    pub fn prediction_for_fixture(&self, fixture_id: u64) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.fixture_id == fixture_id)
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetRoute(Route),

    SessionEstablished(UserProfile),
    SessionChecked(Option<UserProfile>),
    ForceLogout,

    SetProfile(UserProfile),
    SetUserStats(UserStats),

    SetLiveMatches(Vec<Fixture>),
    UpsertLiveMatch(Fixture),
    SetUpcoming(Vec<Fixture>),
    SetTopFixtures(Vec<Fixture>),
    SetStatuses(Vec<String>),
    SetFixtures {
        params_key: String,
        fixtures: Vec<Fixture>,
        fetched_at: DateTime<Utc>,
    },
    SetMatchDetail(Fixture),

    SetPredictions(Vec<Prediction>),
    UpsertPrediction(Prediction),
    SetPredictionStats(UserStats),

    SetGroups(Vec<Group>),
    SetCurrentGroup(Group),
    ClearCurrentGroup,
    RemoveGroup(u64),
    SetMembers(Vec<GroupMember>),
    UpsertMember(GroupMember),
    RemoveMember(u64),
    SetGroupAnalytics(GroupAnalytics),
    SetTeams(Vec<TeamEntry>),

    SetLeaderboard {
        group_id: u64,
        entries: Vec<LeaderboardEntry>,
    },

    PushToast(Toast),
    SetError {
        slice: Slice,
        message: Option<String>,
    },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetRoute(route) => state.route = route,

        Delta::SessionEstablished(user) => {
            state.session_user = Some(user);
            state.auth_checked = true;
            state.auth_error = None;
            state.route = Route::Home;
        }
        Delta::SessionChecked(user) => {
            state.auth_checked = true;
            state.auth_error = None;
            match user {
                Some(user) => state.session_user = Some(user),
                None => {
                    state.session_user = None;
                    state.route = Route::Login;
                }
            }
        }
        Delta::ForceLogout => {
            // Every remote slice dies with the session; toasts and logs are
            // client-local and survive so the user can see what happened.
            let toasts = std::mem::take(&mut state.toasts);
            let next_toast_id = state.next_toast_id;
            let logs = std::mem::take(&mut state.logs);
            *state = AppState::new();
            state.toasts = toasts;
            state.next_toast_id = next_toast_id;
            state.logs = logs;
            state.auth_checked = true;
            state.route = Route::Login;
        }

        Delta::SetProfile(profile) => {
            state.profile = Some(profile);
            state.profile_error = None;
        }
        Delta::SetUserStats(stats) => {
            state.user_stats = Some(stats);
            state.profile_error = None;
        }

        Delta::SetLiveMatches(matches) => {
            state.live_matches = matches;
            state.matches_error = None;
        }
        Delta::UpsertLiveMatch(fixture) => {
            match state
                .live_matches
                .iter_mut()
                .find(|m| m.fixture_id == fixture.fixture_id)
            {
                Some(existing) => *existing = fixture,
                None => state.live_matches.push(fixture),
            }
        }
        Delta::SetUpcoming(fixtures) => {
            state.upcoming = fixtures;
            state.matches_error = None;
        }
        Delta::SetTopFixtures(fixtures) => state.top_fixtures = fixtures,
        Delta::SetStatuses(statuses) => state.match_statuses = statuses,
        Delta::SetFixtures {
            params_key,
            fixtures,
            fetched_at,
        } => {
            state.fixture_fetched_at.insert(params_key.clone(), fetched_at);
            state.fixture_pages.insert(params_key, fixtures);
            state.matches_error = None;
        }
        Delta::SetMatchDetail(fixture) => {
            state.match_detail.insert(fixture.fixture_id, fixture);
        }

        Delta::SetPredictions(predictions) => {
            state.predictions = predictions;
            state.predictions_error = None;
        }
        Delta::UpsertPrediction(prediction) => {
            match state
                .predictions
                .iter_mut()
                .find(|p| p.id == prediction.id)
            {
                Some(existing) => *existing = prediction,
                None => state.predictions.push(prediction),
            }
            state.predictions_error = None;
        }
        Delta::SetPredictionStats(stats) => state.prediction_stats = Some(stats),

        Delta::SetGroups(groups) => {
            state.groups = groups;
            state.groups_error = None;
        }
        Delta::SetCurrentGroup(group) => {
            // One current group at a time; its per-group slices reset so a
            // stale member list never shows under a new group header.
            let changed = state
                .current_group
                .as_ref()
                .is_none_or(|current| current.id != group.id);
            if changed {
                state.members.clear();
                state.group_analytics = None;
                state.leaderboard.clear();
                state.leaderboard_group_id = None;
            }
            match state.groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => *existing = group.clone(),
                None => state.groups.push(group.clone()),
            }
            state.current_group = Some(group);
            state.groups_error = None;
        }
        Delta::ClearCurrentGroup => {
            state.current_group = None;
            state.members.clear();
            state.group_analytics = None;
        }
        Delta::RemoveGroup(group_id) => {
            state.groups.retain(|g| g.id != group_id);
            if state
                .current_group
                .as_ref()
                .is_some_and(|g| g.id == group_id)
            {
                state.current_group = None;
                state.members.clear();
                state.group_analytics = None;
                state.leaderboard.clear();
                state.leaderboard_group_id = None;
            }
        }
        Delta::SetMembers(members) => {
            state.members = members;
            state.groups_error = None;
        }
        Delta::UpsertMember(member) => {
            match state
                .members
                .iter_mut()
                .find(|m| m.user_id == member.user_id)
            {
                Some(existing) => *existing = member,
                None => state.members.push(member),
            }
        }
        Delta::RemoveMember(user_id) => {
            state.members.retain(|m| m.user_id != user_id);
            if let Some(group) = state.current_group.as_mut() {
                group.member_count = group.member_count.saturating_sub(1);
            }
        }
        Delta::SetGroupAnalytics(analytics) => state.group_analytics = Some(analytics),
        Delta::SetTeams(teams) => state.teams = teams,

        Delta::SetLeaderboard { group_id, entries } => {
            state.leaderboard = entries;
            state.leaderboard_group_id = Some(group_id);
            state.leaderboard_error = None;
        }

        Delta::PushToast(mut toast) => {
            toast.id = state.next_toast_id;
            state.next_toast_id += 1;
            state.toasts.push(toast);
        }
        Delta::SetError { slice, message } => set_slice_error(state, slice, message),
        Delta::Log(line) => {
            if state.logs.len() >= LOG_CAPACITY {
                state.logs.pop_front();
            }
            state.logs.push_back(line);
        }
    }
}

// Failure policy from the containers: record the message and drop the slice
// back to its default. The server remains the source of truth; the next
// successful fetch repopulates it.
fn set_slice_error(state: &mut AppState, slice: Slice, message: Option<String>) {
    match slice {
        Slice::Auth => state.auth_error = message,
        Slice::Profile => {
            if message.is_some() {
                state.profile = None;
                state.user_stats = None;
            }
            state.profile_error = message;
        }
        Slice::Matches => {
            if message.is_some() {
                state.live_matches.clear();
                state.upcoming.clear();
            }
            state.matches_error = message;
        }
        Slice::Predictions => {
            if message.is_some() {
                state.predictions.clear();
            }
            state.predictions_error = message;
        }
        Slice::Groups => {
            if message.is_some() {
                state.members.clear();
                state.group_analytics = None;
            }
            state.groups_error = message;
        }
        Slice::Leaderboard => {
            if message.is_some() {
                state.leaderboard.clear();
                state.leaderboard_group_id = None;
            }
            state.leaderboard_error = message;
        }
    }
}

/// Drops toasts whose timeout has elapsed.
pub fn expire_toasts(state: &mut AppState, now: DateTime<Utc>) {
    state.toasts.retain(|toast| {
        let age = now.signed_duration_since(toast.created_at);
        age.num_milliseconds() < toast.timeout_ms as i64
    });
}

/// Shared failure path for every container: toast the user, record the
/// slice error, and on an expired session drop back to the login route.
pub fn surface_api_error(
    state: &mut AppState,
    slice: Slice,
    err: &ApiError,
    now: DateTime<Utc>,
) {
    let message = err.user_message();
    if matches!(err, ApiError::SessionExpired) {
        apply_delta(state, Delta::ForceLogout);
        apply_delta(state, Delta::PushToast(Toast::error(message, now)));
        return;
    }
    apply_delta(state, Delta::PushToast(Toast::error(message.clone(), now)));
    apply_delta(
        state,
        Delta::SetError {
            slice,
            message: Some(message),
        },
    );
}

pub fn fixture_params_key(league: Option<&str>, date: Option<&str>) -> String {
    let league = league.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("all");
    let date = date.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("any");
    format!("league={league}&date={date}")
}
