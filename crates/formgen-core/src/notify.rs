//! Auto-expiring error and success notices.
//!
//! At most one notice of each kind is live. A notice is released either when it
//! is dismissed or when its deadline passes, whichever comes first; the owner's
//! event loop calls [`Notices::expire`] at [`Notices::next_expiry`].

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// What the user is currently being told. When both notices are live the error wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    None,
    Error(String),
    Success(String),
}

#[derive(Debug, Clone)]
pub struct Notices {
    ttl: Duration,
    error: Option<Notice>,
    success: Option<Notice>,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            error: None,
            success: None,
        }
    }

    fn slot(&mut self, kind: NoticeKind) -> &mut Option<Notice> {
        match kind {
            NoticeKind::Error => &mut self.error,
            NoticeKind::Success => &mut self.success,
        }
    }

    /// Shows `message`, replacing any live notice of the same kind and restarting its timer.
    pub fn raise(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let expires_at = Instant::now() + self.ttl;
        *self.slot(kind) = Some(Notice {
            kind,
            message: message.into(),
            expires_at,
        });
    }

    /// Returns whether a notice was live.
    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.slot(kind).take().is_some()
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Releases every notice whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<NoticeKind> {
        let mut released = Vec::new();
        for kind in [NoticeKind::Error, NoticeKind::Success] {
            let slot = self.slot(kind);
            if slot.as_ref().is_some_and(|n| n.expires_at <= now) {
                *slot = None;
                released.push(kind);
            }
        }
        released
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        [&self.error, &self.success]
            .into_iter()
            .flatten()
            .map(|n| n.expires_at)
            .min()
    }

    pub fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn success(&self) -> Option<&Notice> {
        self.success.as_ref()
    }

    pub fn outcome(&self) -> Outcome {
        match (&self.error, &self.success) {
            (Some(e), _) => Outcome::Error(e.message.clone()),
            (None, Some(s)) => Outcome::Success(s.message.clone()),
            (None, None) => Outcome::None,
        }
    }
}
