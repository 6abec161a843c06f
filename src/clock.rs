use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Time source shared by the cache, session store and formatters. Tests pin
/// it with `Clock::fixed` and move it with `advance`.
#[derive(Debug, Clone)]
pub enum Clock {
    System,
    Fixed(Arc<Mutex<DateTime<Utc>>>),
}

impl Clock {
    pub fn system() -> Self {
        Clock::System
    }

    pub fn fixed(at: DateTime<Utc>) -> Self {
        Clock::Fixed(Arc::new(Mutex::new(at)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at.lock().expect("clock lock poisoned"),
        }
    }

    /// No-op on the system clock.
    pub fn advance(&self, by: Duration) {
        if let Clock::Fixed(at) = self {
            let mut guard = at.lock().expect("clock lock poisoned");
            *guard += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Clock::Fixed(at) = self {
            let mut guard = at.lock().expect("clock lock poisoned");
            *guard = to;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
