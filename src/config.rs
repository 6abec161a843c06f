use std::env;

const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub live_poll_secs: u64,
    pub activation_weeks: u32,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let api_base = env::var("PREDICTPOOL_API_BASE")
            .ok()
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            api_base,
            request_timeout_secs: env_u64("REQUEST_TIMEOUT_SECS", 10).clamp(1, 60),
            cache_ttl_secs: env_u64("RESPONSE_CACHE_TTL_SECS", 300).clamp(5, 3600),
            live_poll_secs: env_u64("LIVE_POLL_SECS", 120).clamp(30, 900),
            activation_weeks: env_u64("ACTIVATION_WEEKS", 4).clamp(0, 38) as u32,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 10,
            cache_ttl_secs: 300,
            live_poll_secs: 120,
            activation_weeks: 4,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}
