#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in distro
//!
//! Library crates never print. Everything observable about a batch, the
//! install queue or the cleanup sweeper goes through this channel and the
//! front-end decides how to render or log it.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: grouped by functional domain (Download, Batch, Install, ...)
//! - **`EventEmitter` trait**: one API for raw senders and structs holding one
//! - **Metadata envelope**: every event travels with an [`EventMeta`]

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, BatchEvent, CleanupEvent, DownloadEvent, FailureContext, GeneralEvent,
    InstallEvent, SweepMode, UninstallEvent,
};

use tokio::sync::mpsc::UnboundedSender;

/// Event plus the metadata attached at emission time
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event with freshly generated metadata
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.meta = self.meta.with_correlation_id(correlation_id);
        self
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout distro
///
/// Works the same for a raw `EventSender` and for any struct that holds one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation id stamped on every event from this emitter
    fn correlation_id(&self) -> Option<String> {
        None
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let mut message = EventMessage::new(event);
            if let Some(correlation) = self.correlation_id() {
                message = message.with_correlation_id(correlation);
            }
            // Receiver may be gone; the operation itself carries on
            let _ = sender.send(message);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Report an operation that gave up with `error`
    fn emit_failure<E>(&self, operation: impl Into<String>, error: &E)
    where
        E: distro_errors::UserFacingError + ?Sized,
    {
        self.emit(AppEvent::General(GeneralEvent::Failed {
            operation: operation.into(),
            failure: FailureContext::from_error(error),
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// A sender bound to a correlation id (typically a batch id)
#[derive(Debug, Clone)]
pub struct CorrelatedSender {
    sender: EventSender,
    correlation_id: String,
}

impl CorrelatedSender {
    #[must_use]
    pub fn new(sender: EventSender, correlation_id: impl Into<String>) -> Self {
        Self {
            sender,
            correlation_id: correlation_id.into(),
        }
    }
}

impl EventEmitter for CorrelatedSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.sender)
    }

    fn correlation_id(&self) -> Option<String> {
        Some(self.correlation_id.clone())
    }
}
