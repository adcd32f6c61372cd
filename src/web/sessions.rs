use crate::state::rotation::RotationController;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;

/// Sessions not heard from for this long are dropped when a new one opens.
pub const SESSION_IDLE_HOURS: i64 = 6;

struct Session {
    rotation: RotationController,
    last_seen: DateTime<Utc>,
}

/// Browser sessions, each with its own rotation state.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn create(&mut self, rotation: RotationController, now: DateTime<Utc>) -> String {
        self.prune_idle(now);
        let id = self.unused_id();
        debug!("session {id} opened on view {}", rotation.current());
        self.sessions.insert(id.clone(), Session { rotation, last_seen: now });
        id
    }

    /// Runs `f` against the session's controller, or returns `None` for an
    /// unknown id.
    pub fn with_session<T>(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut RotationController) -> T,
    ) -> Option<T> {
        let session = self.sessions.get_mut(id)?;
        session.last_seen = now;
        Some(f(&mut session.rotation))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// 128 random bits, hex encoded. Ids cannot be guessed from one another.
    fn unused_id(&self) -> String {
        loop {
            let id = format!("{:032x}", rand::random::<u128>());
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }

    fn prune_idle(&mut self, now: DateTime<Utc>) {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.last_seen < Duration::hours(SESSION_IDLE_HOURS));
        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!("dropped {dropped} idle sessions");
        }
    }
}
