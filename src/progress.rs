//! Progress notifications for long-running passes.
//!
//! Collaborators (scrapers, downloaders, the CLI) report progress through
//! a [`ProgressSink`]; an observer drains the paired receiver. Delivery is
//! one-directional, ordered, and fire-and-forget: a closed or absent
//! receiver never affects the pass. The normalization and layout core
//! neither emits nor consumes these events.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Events emitted while a pass runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A human-readable progress message.
    Message(String),

    /// The pass finished (successfully or not); no further events follow.
    Finished,
}

impl ProgressEvent {
    /// Get the message text, if this is a message event.
    pub fn message(&self) -> Option<&str> {
        match self {
            ProgressEvent::Message(text) => Some(text),
            ProgressEvent::Finished => None,
        }
    }
}

/// Sending half of a progress channel. Cheap to clone; sends never block
/// and never fail visibly.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Option<Sender<ProgressEvent>>,
}

impl ProgressSink {
    /// Create a connected sink/receiver pair.
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    /// Create a sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Report a progress message.
    pub fn message(&self, text: impl Into<String>) {
        self.emit(ProgressEvent::Message(text.into()));
    }

    /// Report completion.
    pub fn finished(&self) {
        self.emit(ProgressEvent::Finished);
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // Fire-and-forget: a dropped receiver is not our problem.
            let _ = tx.send(event);
        }
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::disabled()
    }
}
