//! Isolated per-user sessions for embedding behind a request/response service.
//!
//! Each session sits behind its own mutex so two in-flight frames for the
//! same user are serialized, while different users never contend on or see
//! each other's state.

use crate::{
    correction::CorrectionEngine,
    landmarks::LandmarkSet,
    poses::PoseSequence,
    sequence::{FrameFeedback, SequenceSession, SessionThresholds},
    Error, Result,
};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Blueprint used to create new sessions
#[derive(Debug, Clone)]
pub struct SessionTemplate {
    pub sequence: PoseSequence,
    pub thresholds: SessionThresholds,
    pub corrections: CorrectionEngine,
    pub rule_overrides: bool,
}

impl Default for SessionTemplate {
    fn default() -> Self {
        Self {
            sequence: PoseSequence::default(),
            thresholds: SessionThresholds::default(),
            corrections: CorrectionEngine::default(),
            rule_overrides: true,
        }
    }
}

impl SessionTemplate {
    #[must_use]
    pub fn build(&self) -> SequenceSession {
        SequenceSession::new(self.sequence.clone(), self.thresholds, self.corrections.clone())
            .with_rule_overrides(self.rule_overrides)
    }
}

struct SessionEntry {
    session: Arc<Mutex<SequenceSession>>,
    last_seen: Instant,
}

/// Session id → independent sequence session
pub struct SessionRegistry {
    template: SessionTemplate,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(template: SessionTemplate, idle_timeout: Duration) -> Self {
        Self {
            template,
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEntry>>> {
        self.sessions
            .lock()
            .map_err(|_| Error::SessionError("Session table lock poisoned".to_string()))
    }

    /// Handle to the session for `id`, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the session table lock is poisoned
    pub fn session(&self, id: &str) -> Result<Arc<Mutex<SequenceSession>>> {
        let mut entries = self.entries()?;
        let entry = entries.entry(id.to_string()).or_insert_with(|| {
            info!("Creating session {}", id);
            SessionEntry {
                session: Arc::new(Mutex::new(self.template.build())),
                last_seen: Instant::now(),
            }
        });
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    /// Run one frame through the session for `id`
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned
    pub fn process_frame(&self, id: &str, raw_label: &str, landmarks: Option<&LandmarkSet>) -> Result<FrameFeedback> {
        let session = self.session(id)?;
        let mut session = session
            .lock()
            .map_err(|_| Error::SessionError(format!("Session {id} lock poisoned")))?;
        Ok(session.process_frame(raw_label, landmarks))
    }

    /// Discard a session; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the session table lock is poisoned
    pub fn end(&self, id: &str) -> Result<bool> {
        let removed = self.entries()?.remove(id).is_some();
        if removed {
            info!("Ended session {}", id);
        }
        Ok(removed)
    }

    /// Drop sessions idle for longer than the timeout; returns how many
    ///
    /// A session whose handle from [`Self::session`] is still held elsewhere
    /// is kept, so the holder never ends up with a session the registry no
    /// longer knows about.
    ///
    /// # Errors
    ///
    /// Returns an error if the session table lock is poisoned
    pub fn evict_idle(&self) -> Result<usize> {
        let now = Instant::now();
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|id, entry| {
            let keep = now.duration_since(entry.last_seen) <= self.idle_timeout
                || Arc::strong_count(&entry.session) > 1;
            if !keep {
                debug!("Evicting idle session {}", id);
            }
            keep
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        Ok(evicted)
    }

    /// Number of live sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the session table lock is poisoned
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    /// # Errors
    ///
    /// Returns an error if the session table lock is poisoned
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries()?.is_empty())
    }
}
