use std::{future::Future, time::Duration};

use abi::{NotifyConfig, ReservationConfirmation, ReservationId};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

/// outbound guest notifications, delivery is never guaranteed
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, booking: &ReservationConfirmation) -> Result<()>;
    async fn reservation_cancelled(&self, reservation: &ReservationConfirmation) -> Result<()>;
}

/// records outgoing mail in the log instead of sending it
#[derive(Debug, Clone)]
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(&self, booking: &ReservationConfirmation) -> Result<()> {
        info!(
            from = %self.from,
            to = %booking.client.email,
            reservation = booking.id,
            room = %booking.room.number,
            start = %booking.start_date,
            end = %booking.end_date,
            "booking confirmation sent"
        );
        Ok(())
    }

    async fn reservation_cancelled(&self, reservation: &ReservationConfirmation) -> Result<()> {
        info!(
            from = %self.from,
            to = %reservation.client.email,
            reservation = reservation.id,
            "cancellation notice sent"
        );
        Ok(())
    }
}

/// outcome reported to the caller next to the booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub sent: bool,
    /// where the guest can still see the confirmation when no mail went out
    pub fallback: Option<String>,
}

impl Notification {
    pub fn new(sent: bool, id: ReservationId) -> Self {
        Self {
            sent,
            fallback: (!sent).then(|| format!("/api/reservations/{}", id)),
        }
    }
}

/// run a notification with the configured timeout; failures are logged and swallowed
pub async fn deliver(config: &NotifyConfig, send: impl Future<Output = Result<()>>) -> bool {
    if !config.enabled {
        return false;
    }
    match tokio::time::timeout(Duration::from_millis(config.timeout_ms), send).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("notification failed: {:#}", e);
            false
        }
        Err(_) => {
            warn!(timeout_ms = config.timeout_ms, "notification timed out");
            false
        }
    }
}
