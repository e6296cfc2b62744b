//! Form sessions
//!
//! A form session owns the six form fields and the optional prediction for
//! one client. Sessions live in memory only and are dropped when the client
//! ends them or when they sit idle past the configured TTL.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::inference::{ModelInference, PredictionSource};
use crate::models::{Field, FormInput, PredictionResult, Selection};

/// Render gate for a session.
///
/// A session starts `Initializing` and moves to `Ready` once the client
/// signals it; nothing is rendered before that. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Initializing,
    Ready,
}

/// Form controller state for one client.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    lifecycle: Lifecycle,
    form: FormInput,
    prediction: Option<PredictionResult>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    /// Marks the client as ready. Repeated calls are no-ops.
    pub fn mark_ready(&mut self) {
        self.lifecycle = Lifecycle::Ready;
    }

    pub fn update_field(&mut self, field: Field, value: String) {
        self.form.set(field, value);
    }

    pub fn select_field(&mut self, selection: Selection) {
        self.form.set(selection.field(), selection.id().to_string());
    }

    /// Replaces the prediction with a fresh one. The form is not consulted by
    /// the model, so repeated submits always yield the same record.
    pub fn submit(&mut self, model: &ModelInference) -> &PredictionResult {
        self.prediction
            .insert(model.predict(&self.form, PredictionSource::Session))
    }

    pub fn snapshot(&self, id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            id,
            lifecycle: self.lifecycle,
            form: self.form.clone(),
            prediction: self.prediction.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub lifecycle: Lifecycle,
    pub form: FormInput,
    pub prediction: Option<PredictionResult>,
}

struct Entry {
    session: FormSession,
    last_seen: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Idle sessions are swept once every this many creates, or whenever the
/// store is full.
const PURGE_EVERY: u64 = 64;

/// In-memory registry of live form sessions.
///
/// Each call holds the entry lock for one event, so events on the same
/// session never interleave.
pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
    ttl: Duration,
    max_sessions: usize,
    created: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            max_sessions,
            created: AtomicU64::new(0),
        }
    }

    /// Opens a new `Initializing` session.
    ///
    /// Returns `None` when the store is full of live sessions.
    pub fn create(&self) -> Option<SessionSnapshot> {
        let full = self.sessions.len() >= self.max_sessions;
        if full || self.created.load(Ordering::Relaxed) % PURGE_EVERY == 0 {
            self.purge_expired();
        }
        if self.sessions.len() >= self.max_sessions {
            warn!("Session limit of {} reached", self.max_sessions);
            return None;
        }

        let id = Uuid::new_v4();
        let session = FormSession::new();
        let snapshot = session.snapshot(id);
        self.sessions.insert(
            id,
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!("Session {} created", id);
        Some(snapshot)
    }

    /// Runs `f` against a live session, refreshing its idle timer.
    ///
    /// Returns `None` if the session is unknown or has expired.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut FormSession) -> R) -> Option<R> {
        {
            let mut entry = self.sessions.get_mut(&id)?;
            if !entry.is_expired(self.ttl) {
                entry.last_seen = Instant::now();
                return Some(f(&mut entry.session));
            }
        }
        self.sessions.remove(&id);
        debug!("Session {} expired", id);
        None
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.is_expired(self.ttl));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!("Purged {} idle sessions", purged);
        }
        purged
    }

    pub fn active(&self) -> usize {
        self.sessions.len()
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
