//! Notifier seam for lifecycle events
//!
//! The engine emits one event per successful transition. Delivery is the
//! collaborator's concern; an emit failure is logged by the engine and never
//! rolls back or blocks the committed state change.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::booking::events::BookingEvent;
use crate::config::Config;

/// Notifier errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Event channel closed")]
    ChannelClosed,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Receives lifecycle events for external dispatch.
///
/// Implementations must not block: the engine calls `emit` inline on the
/// request path.
pub trait Notifier: Send + Sync {
    fn emit(&self, event: &BookingEvent) -> Result<(), NotifyError>;
}

/// Default notifier: structured-log delivery, addressed to the configured
/// admin recipient when one is set
#[derive(Debug, Default)]
pub struct TracingNotifier {
    recipient: Option<String>,
}

impl TracingNotifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recipient: config.notification_email.clone(),
        }
    }
}

impl Notifier for TracingNotifier {
    fn emit(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let snapshot = event.snapshot();
        tracing::info!(
            kind = event.kind(),
            booking_id = %snapshot.booking_id,
            accommodation = %snapshot.accommodation_name,
            guest = %snapshot.guest_name,
            check_in = %snapshot.check_in_date,
            check_out = %snapshot.check_out_date,
            recipient = self.recipient.as_deref().unwrap_or("<unset>"),
            "Booking lifecycle event"
        );
        Ok(())
    }
}

/// Forwards events over an unbounded channel; the consuming side drives
/// delivery (email worker, test assertions).
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<BookingEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BookingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn emit(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        self.tx
            .send(event.clone())
            .map_err(|_| NotifyError::ChannelClosed)
    }
}
