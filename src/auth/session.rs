use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::storage::UserId;

/// Longest session lifetime accepted (one year)
pub const MAX_SESSION_TIMEOUT_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Opaque bearer token: 32 random bytes, hex encoded
pub fn generate_session_token() -> String {
    let mut raw = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut raw);
    hex::encode(raw)
}

/// Session issued at login
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ActiveSession {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory registry of issued bearer tokens, keyed by token
#[derive(Clone)]
pub struct SessionManager {
    by_token: Arc<RwLock<HashMap<String, ActiveSession>>>,
    timeout_seconds: u64,
}

impl SessionManager {
    /// Sessions last `timeout_seconds`, capped at `MAX_SESSION_TIMEOUT_SECONDS`
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            by_token: Arc::default(),
            timeout_seconds: timeout_seconds.min(MAX_SESSION_TIMEOUT_SECONDS),
        }
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Issue a token for `user_id`, returning it with its expiry
    pub fn create_session(&self, user_id: UserId) -> (String, DateTime<Utc>) {
        let created_at = Utc::now();
        let expires_at = created_at + Duration::seconds(self.timeout_seconds as i64);

        let token = generate_session_token();
        self.by_token.write().insert(
            token.clone(),
            ActiveSession {
                session_id: Uuid::new_v4(),
                user_id,
                created_at,
                expires_at,
            },
        );

        (token, expires_at)
    }

    /// Session id and owner of a live token
    pub fn validate_token(&self, token: &str) -> Option<(Uuid, UserId)> {
        let now = Utc::now();
        self.by_token
            .read()
            .get(token)
            .filter(|session| session.is_live(now))
            .map(|session| (session.session_id, session.user_id))
    }

    pub fn revoke_session(&self, token: &str) -> bool {
        self.by_token.write().remove(token).is_some()
    }

    /// Drop expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut by_token = self.by_token.write();
        let total = by_token.len();
        by_token.retain(|_, session| session.is_live(now));
        total - by_token.len()
    }

    pub fn session_count(&self) -> usize {
        self.by_token.read().len()
    }
}

/// Sliding-window count of failed authentication attempts per client IP
#[derive(Clone)]
pub struct AuthRateLimiter {
    failures: Arc<RwLock<HashMap<IpAddr, VecDeque<DateTime<Utc>>>>>,
    max_attempts: u32,
    window: Duration,
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, window_seconds: i64) -> Self {
        Self {
            failures: Arc::default(),
            max_attempts,
            window: Duration::seconds(window_seconds.clamp(0, i64::from(u32::MAX))),
        }
    }

    /// Record a failed attempt. Returns true once the IP hits the limit
    pub fn record_failure(&self, ip: IpAddr) -> bool {
        let now = Utc::now();
        let mut failures = self.failures.write();
        let history = failures.entry(ip).or_default();

        prune(history, now - self.window);
        history.push_back(now);
        history.len() as u32 >= self.max_attempts
    }

    pub fn is_rate_limited(&self, ip: IpAddr) -> bool {
        let cutoff = Utc::now() - self.window;
        self.failures.read().get(&ip).is_some_and(|history| {
            history.iter().filter(|at| **at > cutoff).count() as u32 >= self.max_attempts
        })
    }

    /// Forget an IP's failures (called after a successful authentication)
    pub fn clear(&self, ip: IpAddr) {
        self.failures.write().remove(&ip);
    }

    /// Drop IPs whose failures all fell out of the window
    pub fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - self.window;
        let mut failures = self.failures.write();
        let tracked = failures.len();
        failures.retain(|_, history| {
            prune(history, cutoff);
            !history.is_empty()
        });
        tracked - failures.len()
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(10, 60)
    }
}

/// Timestamps are pushed in order, so stale ones sit at the front
fn prune(history: &mut VecDeque<DateTime<Utc>>, cutoff: DateTime<Utc>) {
    while history.front().is_some_and(|at| *at <= cutoff) {
        history.pop_front();
    }
}
