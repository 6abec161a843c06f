use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::{Prediction, PredictionInput, UserStats};
use crate::state::{AppState, Delta, Slice, Toast, apply_delta, surface_api_error};

pub fn fetch_predictions(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<Vec<Prediction>>("/predictions", &[]) {
        Ok(predictions) => apply_delta(state, Delta::SetPredictions(predictions)),
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

pub fn fetch_prediction(client: &ApiClient, state: &mut AppState, clock: &Clock, id: u64) {
    let path = format!("/predictions/{id}");
    match client.get::<Prediction>(&path, &[]) {
        Ok(prediction) => apply_delta(state, Delta::UpsertPrediction(prediction)),
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

// Mutations merge the authoritative record the server returns instead of
// refetching the whole list.

pub fn create_prediction(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    input: &PredictionInput,
) {
    match client.post::<Prediction>("/predictions", input) {
        Ok(prediction) => {
            apply_delta(state, Delta::UpsertPrediction(prediction));
            apply_delta(
                state,
                Delta::PushToast(Toast::success("Prediction saved", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

pub fn update_prediction(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    id: u64,
    input: &PredictionInput,
) {
    let path = format!("/predictions/{id}");
    match client.put::<Prediction>(&path, input) {
        Ok(prediction) => {
            apply_delta(state, Delta::UpsertPrediction(prediction));
            apply_delta(
                state,
                Delta::PushToast(Toast::success("Prediction updated", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

/// Clears a prediction back to the editable default score.
pub fn reset_prediction(client: &ApiClient, state: &mut AppState, clock: &Clock, id: u64) {
    let path = format!("/predictions/reset/{id}");
    match client.post_empty::<Prediction>(&path) {
        Ok(prediction) => {
            apply_delta(state, Delta::UpsertPrediction(prediction));
            apply_delta(
                state,
                Delta::PushToast(Toast::success("Prediction reset", clock.now())),
            );
        }
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

/// Submits a whole matchday in one request; the server returns every
/// affected prediction.
pub fn submit_batch(
    client: &ApiClient,
    state: &mut AppState,
    clock: &Clock,
    inputs: &[PredictionInput],
) {
    if inputs.is_empty() {
        return;
    }
    match client.post::<Vec<Prediction>>("/predictions/batch", &inputs) {
        Ok(predictions) => {
            let count = predictions.len();
            for prediction in predictions {
                apply_delta(state, Delta::UpsertPrediction(prediction));
            }
            apply_delta(
                state,
                Delta::PushToast(Toast::success(
                    format!("{count} predictions submitted"),
                    clock.now(),
                )),
            );
        }
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}

pub fn fetch_prediction_stats(client: &ApiClient, state: &mut AppState, clock: &Clock) {
    match client.get::<UserStats>("/predictions/stats", &[]) {
        Ok(stats) => apply_delta(state, Delta::SetPredictionStats(stats)),
        Err(err) => surface_api_error(state, Slice::Predictions, &err, clock.now()),
    }
}
