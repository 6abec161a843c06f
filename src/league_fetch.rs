use crate::api::ApiClient;
use crate::clock::Clock;
use crate::models::LeaderboardEntry;
use crate::state::{AppState, Delta, Slice, apply_delta, surface_api_error};

pub fn fetch_leaderboard(client: &ApiClient, state: &mut AppState, clock: &Clock, group_id: u64) {
    let path = format!("/predictions/leaderboard/{group_id}");
    match client.get::<Vec<LeaderboardEntry>>(&path, &[]) {
        Ok(mut entries) => {
            rank_entries(&mut entries);
            apply_delta(state, Delta::SetLeaderboard { group_id, entries });
        }
        Err(err) => surface_api_error(state, Slice::Leaderboard, &err, clock.now()),
    }
}

/// Sorts by points (ties broken by name for a stable listing) and assigns
/// dense ranks: equal point totals share a rank.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.username.cmp(&b.username))
    });

    let mut rank = 0;
    let mut last_points = None;
    for entry in entries.iter_mut() {
        if last_points != Some(entry.points) {
            rank += 1;
            last_points = Some(entry.points);
        }
        entry.rank = rank;
    }
}
