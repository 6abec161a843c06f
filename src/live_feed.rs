use std::collections::HashSet;
use std::env;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::models::Fixture;
use crate::state::Delta;

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    RefreshLive,
    FetchMatchDetail { fixture_id: u64 },
    Shutdown,
}

/// Background provider for live scores: polls `/matches/live` on a fixed
/// interval, fans per-match detail fetches across a small pool, and streams
/// results out as deltas. `ProviderCommand::Shutdown` is the unmount path.
pub fn spawn_live_provider(
    client: Arc<ApiClient>,
    config: &ClientConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    let live_interval = Duration::from_secs(config.live_poll_secs.max(30));

    thread::spawn(move || {
        let pool = build_fetch_pool();
        let inflight: Arc<Mutex<HashSet<u64>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut last_live_fetch = Instant::now() - live_interval;

        loop {
            let mut refresh_now = false;
            let mut shutdown = false;
            loop {
                match cmd_rx.try_recv() {
                    Ok(ProviderCommand::RefreshLive) => refresh_now = true,
                    Ok(ProviderCommand::FetchMatchDetail { fixture_id }) => {
                        fetch_details(&client, &tx, &pool, &inflight, &[fixture_id]);
                    }
                    Ok(ProviderCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                        shutdown = true;
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }
            if shutdown {
                break;
            }

            if refresh_now || last_live_fetch.elapsed() >= live_interval {
                last_live_fetch = Instant::now();
                match refresh_live(&client, &tx) {
                    Ok(live_ids) => {
                        fetch_details(&client, &tx, &pool, &inflight, &live_ids);
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Live fetch error: {err}")));
                    }
                }
            }

            thread::sleep(Duration::from_millis(500));
        }
    })
}

fn refresh_live(client: &ApiClient, tx: &Sender<Delta>) -> Result<Vec<u64>, ApiError> {
    let fixtures: Vec<Fixture> = client.get("/matches/live", &[])?;
    let ids = fixtures.iter().map(|f| f.fixture_id).collect();
    let _ = tx.send(Delta::SetLiveMatches(fixtures));
    Ok(ids)
}

// Per-match refresh, deduplicated: an id already in flight is skipped, the
// rest fan out across the pool.
fn fetch_details(
    client: &ApiClient,
    tx: &Sender<Delta>,
    pool: &Option<rayon::ThreadPool>,
    inflight: &Arc<Mutex<HashSet<u64>>>,
    fixture_ids: &[u64],
) {
    let fresh: Vec<u64> = {
        let mut guard = inflight.lock().expect("inflight lock poisoned");
        fixture_ids
            .iter()
            .copied()
            .filter(|id| guard.insert(*id))
            .collect()
    };
    if fresh.is_empty() {
        return;
    }

    let results: Vec<(u64, Result<Fixture, ApiError>)> = with_fetch_pool(pool, || {
        fresh
            .par_iter()
            .map(|id| {
                let path = format!("/matches/{id}");
                (*id, client.get::<Fixture>(&path, &[]))
            })
            .collect()
    });

    {
        let mut guard = inflight.lock().expect("inflight lock poisoned");
        for id in &fresh {
            guard.remove(id);
        }
    }

    for (id, result) in results {
        match result {
            Ok(fixture) => {
                let _ = tx.send(Delta::SetMatchDetail(fixture.clone()));
                let _ = tx.send(Delta::UpsertLiveMatch(fixture));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Match {id} fetch error: {err}")));
            }
        }
    }
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .build()
        .ok()
}

fn with_fetch_pool<T: Send>(
    pool: &Option<rayon::ThreadPool>,
    action: impl FnOnce() -> T + Send,
) -> T {
    match pool {
        Some(pool) => pool.install(action),
        None => action(),
    }
}

fn fetch_parallelism() -> usize {
    env::var("DETAILS_INFLIGHT_MAX")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 16)
}
