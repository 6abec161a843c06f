use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

const SESSION_DIR: &str = "predictpool";
const SESSION_FILE: &str = "session.json";

/// Where the bearer token lives between calls. The browser kept it in local
/// storage; here it is either memory or a small JSON file.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    token: Mutex<Option<String>>,
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.token.lock().expect("token lock poisoned").clone()
    }

    fn store(&self, token: &str) {
        let mut guard = self.token.lock().expect("token lock poisoned");
        *guard = Some(token.to_string());
    }

    fn clear(&self) {
        let mut guard = self.token.lock().expect("token lock poisoned");
        *guard = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SessionFile {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Option<PathBuf> {
        if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
            if !base.trim().is_empty() {
                return Some(PathBuf::from(base).join(SESSION_DIR).join(SESSION_FILE));
            }
        }
        let home = std::env::var("HOME").ok()?;
        if home.trim().is_empty() {
            return None;
        }
        Some(
            PathBuf::from(home)
                .join(".cache")
                .join(SESSION_DIR)
                .join(SESSION_FILE),
        )
    }

    fn read_file(&self) -> SessionFile {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return SessionFile::default();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn write_file(&self, file: &SessionFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(file).context("serialize session")?;
        fs::write(&tmp, json).context("write session")?;
        fs::rename(&tmp, &self.path).context("swap session")?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> Option<String> {
        self.read_file().access_token
    }

    fn store(&self, token: &str) {
        let file = SessionFile {
            access_token: Some(token.to_string()),
        };
        let _ = self.write_file(&file);
    }

    fn clear(&self) {
        let _ = self.write_file(&SessionFile::default());
    }
}

// The claim set we care about; the signature is the server's problem.
#[derive(Debug, Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

/// Expiry embedded in the token, if the payload decodes. No signature check
/// happens client-side.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&decoded).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    clock: Clock,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>, clock: Clock) -> Self {
        Self { storage, clock }
    }

    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Arc::new(MemoryStorage::default()), clock)
    }

    pub fn token(&self) -> Option<String> {
        self.storage.load()
    }

    pub fn set_token(&self, token: &str) {
        self.storage.store(token);
    }

    pub fn clear(&self) {
        self.storage.clear();
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token().as_deref().and_then(token_expiry)
    }

    /// A missing token counts as expired; a token without a readable `exp`
    /// claim does not (the server will reject it if it is stale).
    pub fn is_expired(&self) -> bool {
        let Some(token) = self.token() else {
            return true;
        };
        match token_expiry(&token) {
            Some(exp) => exp <= self.clock.now(),
            None => false,
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
