//! Server-side sessions.
//!
//! A session is created on login/signup and addressed by an opaque UUID that
//! travels in a cookie. Lifetime is fixed at creation; reads never extend it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// The principal a session vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub id: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    user: SessionUser,
    expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Arc<Self> {
        Arc::new(Self { sessions: DashMap::new(), ttl })
    }

    pub fn with_ttl_hours(hours: u64) -> Arc<Self> {
        // a century is plenty and keeps chrono's range checks happy
        let hours = hours.min(24 * 365 * 100) as i64;
        Self::new(Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for `user` and return its id.
    pub fn create(&self, user: SessionUser) -> Uuid {
        let id = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;
        debug!(session = %id, user_id = user.id, %expires_at, "session_created");
        self.sessions.insert(id, Entry { user, expires_at });
        id
    }

    /// The session's principal, or `None` if unknown or expired. Expired entries are dropped.
    pub fn get(&self, id: &Uuid) -> Option<SessionUser> {
        let now = Utc::now();
        let live = self.sessions.get(id).map(|e| (e.expires_at > now, e.user.clone()))?;
        match live {
            (true, user) => Some(user),
            (false, _) => {
                self.sessions.remove(id);
                None
            }
        }
    }

    /// Forget a session; unknown ids are fine.
    pub fn destroy(&self, id: &Uuid) {
        if self.sessions.remove(id).is_some() {
            debug!(session = %id, "session_destroyed");
        }
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
