//! Login throttling
//!
//! Failed logins are counted per username inside a fixed window. Reaching the
//! limit locks the username out until a full window has passed since the
//! locking failure. State is per process and lost on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failures allowed inside one window before the lockout starts
    pub max_failures: u32,
    /// Counting window, also used as the lockout length
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct Failures {
    count: u32,
    since: Instant,
    locked_until: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: ThrottleConfig,
    failures: Arc<Mutex<HashMap<String, Failures>>>,
}

impl LoginThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `username` is currently locked out
    pub async fn is_locked(&self, username: &str) -> bool {
        let mut failures = self.failures.lock().await;
        let now = Instant::now();
        self.evict_stale(&mut failures, now);

        failures
            .get(username)
            .and_then(|f| f.locked_until)
            .is_some_and(|until| now < until)
    }

    pub async fn record_failure(&self, username: &str) {
        let mut failures = self.failures.lock().await;
        let now = Instant::now();
        self.evict_stale(&mut failures, now);

        let entry = failures.entry(username.to_string()).or_insert(Failures {
            count: 0,
            since: now,
            locked_until: None,
        });

        if now.duration_since(entry.since) >= self.config.window {
            entry.count = 0;
            entry.since = now;
        }
        entry.count += 1;

        if entry.count >= self.config.max_failures && entry.locked_until.is_none() {
            entry.locked_until = Some(now + self.config.window);
            warn!(
                username,
                failures = entry.count,
                lockout_secs = self.config.window.as_secs(),
                "Username locked out after repeated login failures"
            );
        }
    }

    /// Forget the failures of `username`, e.g. after a successful login
    pub async fn clear(&self, username: &str) {
        self.failures.lock().await.remove(username);
    }

    /// Drop entries whose lockout has ended or whose window has passed
    /// without one, so the map only holds usernames failing right now.
    fn evict_stale(&self, failures: &mut HashMap<String, Failures>, now: Instant) {
        let window = self.config.window;
        failures.retain(|_, f| match f.locked_until {
            Some(until) => now < until,
            None => now.duration_since(f.since) < window,
        });
    }
}
