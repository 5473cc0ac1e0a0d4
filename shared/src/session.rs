//! Client session state
//!
//! Screen state is a plain value transformed by [`reduce`]. Generation is
//! exclusive, completion writes disable their control until they resolve,
//! and every successful write marks the data stale so the client re-fetches
//! instead of patching percentages locally.
//!
//! The reducer never reads the clock: every action that can raise a
//! notification carries the instant it happened.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// How long a notification stays visible
pub const NOTIFICATION_TTL_SECS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub mounted: bool,
    pub generating: bool,
    pub pending_items: HashSet<Uuid>,
    pub stale: bool,
    pub notification: Option<Notification>,
}

/// Serialized as `{ "type": "...", "payload": ... }` for the browser bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    Mounted,
    Unmounted,
    GenerationRequested,
    GenerationSucceeded,
    GenerationFailed {
        message: String,
        now: DateTime<Utc>,
    },
    CompletionRequested(Uuid),
    CompletionSucceeded(Uuid),
    CompletionRejected {
        item: Uuid,
        message: String,
        now: DateTime<Utc>,
    },
    DataRefreshed,
    Tick(DateTime<Utc>),
    Notify {
        kind: NotificationKind,
        message: String,
        now: DateTime<Utc>,
    },
}

impl SessionState {
    pub fn mounted() -> Self {
        Self {
            mounted: true,
            ..Self::default()
        }
    }

    /// Whether the control for `item` accepts input
    pub fn can_complete(&self, item: Uuid) -> bool {
        self.mounted && !self.generating && !self.pending_items.contains(&item)
    }

    pub fn can_generate(&self) -> bool {
        self.mounted && !self.generating
    }
}

fn notification(kind: NotificationKind, message: String, now: DateTime<Utc>) -> Notification {
    Notification {
        kind,
        message,
        expires_at: now + Duration::seconds(NOTIFICATION_TTL_SECS),
    }
}

/// Apply one action.
///
/// Results arriving after [`Action::Unmounted`] are discarded. Requests that
/// are not allowed in the current state leave it unchanged.
pub fn reduce(state: &SessionState, action: Action) -> SessionState {
    let mut next = state.clone();

    match action {
        Action::Mounted => next.mounted = true,
        Action::Unmounted => {
            next = SessionState::default();
        }
        _ if !state.mounted => {}
        Action::GenerationRequested => {
            if state.can_generate() {
                next.generating = true;
            }
        }
        Action::GenerationSucceeded => {
            next.generating = false;
            next.stale = true;
        }
        Action::GenerationFailed { message, now } => {
            next.generating = false;
            next.notification = Some(notification(NotificationKind::Error, message, now));
        }
        Action::CompletionRequested(item) => {
            if state.can_complete(item) {
                next.pending_items.insert(item);
            }
        }
        Action::CompletionSucceeded(item) => {
            next.pending_items.remove(&item);
            next.stale = true;
        }
        Action::CompletionRejected { item, message, now } => {
            next.pending_items.remove(&item);
            next.notification = Some(notification(NotificationKind::Error, message, now));
        }
        Action::DataRefreshed => next.stale = false,
        Action::Tick(now) => {
            if next.notification.as_ref().is_some_and(|n| n.expires_at <= now) {
                next.notification = None;
            }
        }
        Action::Notify { kind, message, now } => {
            next.notification = Some(notification(kind, message, now));
        }
    }
    next
}
