use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::{Prediction, ProfileUpdate, UserProfile, UserStats};
use crate::state::{AppState, Delta, Slice, Toast, apply_delta, surface_api_error};

pub fn fetch_profile(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<UserProfile>("/users/profile", &[]) {
        Ok(profile) => apply_delta(state, Delta::SetProfile(profile)),
        Err(err) => surface_api_error(state, Slice::Profile, &err, clock.now()),
    }
}

pub fn update_profile(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    update: &ProfileUpdate,
) {
    match client.put::<UserProfile>("/users/profile", update) {
        Ok(profile) => {
            apply_delta(state, Delta::SetProfile(profile));
            apply_delta(
                state,
                Delta::PushToast(Toast::success("Profile updated", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Profile, &err, clock.now()),
    }
}

pub fn fetch_user_stats(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<UserStats>("/users/stats", &[]) {
        Ok(stats) => apply_delta(state, Delta::SetUserStats(stats)),
        Err(err) => surface_api_error(state, Slice::Profile, &err, clock.now()),
    }
}

/// The signed-in user's predictions across all groups.
pub fn fetch_user_predictions(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Prediction>>("/users/predictions", &[]) {
        Ok(predictions) => apply_delta(state, Delta::SetPredictions(predictions)),
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}
