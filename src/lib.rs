//! Client data layer for the predictpool football score-prediction product:
//! typed REST client, per-domain state containers, weekly statistics and
//! kickoff/deadline formatting. The view layer lives elsewhere.

pub mod api;
pub mod auth_fetch;
pub mod backoff;
pub mod clock;
pub mod config;
pub mod group_fetch;
pub mod http_cache;
pub mod http_client;
pub mod league_fetch;
pub mod live_feed;
pub mod match_fetch;
pub mod models;
pub mod prediction_fetch;
pub mod profile_fetch;
pub mod session;
pub mod state;
pub mod time_format;
pub mod transport;
pub mod weekly_stats;
