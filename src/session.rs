//! Per-session state. Each session owns its focus point; no session can see
//! or change another's. Sessions idle longer than the store's timeout are
//! dropped whenever a session is opened or its focus changes.

use crate::types::FocusPoint;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub focus: Option<FocusPoint>,
    pub last_seen: Instant,
}

impl SessionState {
    fn new(now: Instant) -> Self {
        Self { focus: None, last_seen: now }
    }

    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= timeout
    }
}

pub struct SessionStore {
    idle_timeout: Duration,
    sessions: DashMap<SessionId, SessionState>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self { idle_timeout, sessions: DashMap::new() }
    }

    pub fn open(&self, now: Instant) -> SessionId {
        self.evict_idle(now);
        let id = Uuid::new_v4();
        self.sessions.insert(id, SessionState::new(now));
        id
    }

    /// Focus of a live session; reading it counts as activity.
    pub fn focus(&self, id: &SessionId, now: Instant) -> Option<FocusPoint> {
        let mut state = self.sessions.get_mut(id)?;
        if state.is_idle(now, self.idle_timeout) {
            return None;
        }
        state.last_seen = now;
        state.focus
    }

    /// `false` when the session is unknown or has gone idle.
    pub fn set_focus(&self, id: &SessionId, focus: FocusPoint, now: Instant) -> bool {
        self.evict_idle(now);
        match self.sessions.get_mut(id) {
            Some(mut state) => {
                state.focus = Some(focus);
                state.last_seen = now;
                true
            }
            None => false,
        }
    }

    pub fn clear_focus(&self, id: &SessionId, now: Instant) -> bool {
        self.evict_idle(now);
        match self.sessions.get_mut(id) {
            Some(mut state) => {
                state.focus = None;
                state.last_seen = now;
                true
            }
            None => false,
        }
    }

    pub fn close(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drops sessions idle for at least the timeout; returns how many.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, state| !state.is_idle(now, self.idle_timeout));
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(60);

    #[test]
    fn sessions_do_not_share_focus() {
        let store = SessionStore::new(IDLE);
        let now = Instant::now();
        let a = store.open(now);
        let b = store.open(now);

        assert!(store.set_focus(&a, FocusPoint { latitude: -33.2, longitude: -70.6 }, now));
        assert_eq!(store.focus(&a, now), Some(FocusPoint { latitude: -33.2, longitude: -70.6 }));
        assert_eq!(store.focus(&b, now), None);
    }

    #[test]
    fn focus_is_overwritten_and_cleared() {
        let store = SessionStore::new(IDLE);
        let now = Instant::now();
        let id = store.open(now);
        store.set_focus(&id, FocusPoint { latitude: 1.0, longitude: 2.0 }, now);
        store.set_focus(&id, FocusPoint { latitude: 3.0, longitude: 4.0 }, now);
        assert_eq!(store.focus(&id, now).map(|f| f.latitude), Some(3.0));

        assert!(store.clear_focus(&id, now));
        assert_eq!(store.focus(&id, now), None);
    }

    #[test]
    fn unknown_session_is_not_created() {
        let store = SessionStore::new(IDLE);
        let now = Instant::now();
        let id = Uuid::new_v4();
        assert!(!store.set_focus(&id, FocusPoint { latitude: 1.0, longitude: 2.0 }, now));
        assert!(!store.clear_focus(&id, now));
        assert!(store.is_empty());
        assert_eq!(store.focus(&id, now), None);
    }

    #[test]
    fn idle_sessions_are_evicted_on_open() {
        let store = SessionStore::new(IDLE);
        let start = Instant::now();
        for _ in 0..1000 {
            store.open(start);
        }
        assert_eq!(store.len(), 1000);

        let later = start + IDLE;
        let fresh = store.open(later);
        assert_eq!(store.len(), 1);
        assert!(store.set_focus(&fresh, FocusPoint { latitude: 1.0, longitude: 2.0 }, later));
    }

    #[test]
    fn activity_keeps_a_session_alive() {
        let store = SessionStore::new(IDLE);
        let start = Instant::now();
        let busy = store.open(start);
        let quiet = store.open(start);

        let half = start + Duration::from_secs(40);
        store.set_focus(&busy, FocusPoint { latitude: 1.0, longitude: 2.0 }, half);

        let later = start + Duration::from_secs(70);
        assert_eq!(store.evict_idle(later), 1);
        assert!(store.focus(&busy, later).is_some());
        assert!(!store.set_focus(&quiet, FocusPoint { latitude: 1.0, longitude: 2.0 }, later));
    }

    #[test]
    fn idle_session_reads_as_unfocused_before_eviction() {
        let store = SessionStore::new(IDLE);
        let start = Instant::now();
        let id = store.open(start);
        store.set_focus(&id, FocusPoint { latitude: 1.0, longitude: 2.0 }, start);
        assert_eq!(store.focus(&id, start + IDLE), None);
    }

    #[test]
    fn closed_session_is_gone() {
        let store = SessionStore::new(IDLE);
        let id = store.open(Instant::now());
        assert!(store.close(&id));
        assert!(!store.close(&id));
    }
}
