use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Confirmation details handed to the notification gateway.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentConfirmation {
    pub recipient_email: String,
    pub recipient_name: String,
    pub doctor_name: String,
    pub starts_at: DateTime<Utc>,
}

pub struct NotificationClient {
    client: Client,
    base_url: String,
}

impl NotificationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    pub async fn send_appointment_confirmation(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<()> {
        let url = format!("{}/v1/notifications/appointment-confirmation", self.base_url);
        debug!(
            "Sending appointment confirmation to {} for appointment with {} at {}",
            confirmation.recipient_email, confirmation.doctor_name, confirmation.starts_at
        );

        let response = self.client.post(&url).json(confirmation).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Notification gateway error ({}): {}",
                status,
                error_text
            ));
        }

        Ok(())
    }
}

/// Fire-and-forget confirmation dispatch.
///
/// Notices are queued onto a channel and delivered by a detached worker
/// after the booking transaction has committed and released the doctor's
/// lock. Delivery failures and queue overflow are logged and dropped; they
/// never roll back or fail a booking.
pub struct NotificationDispatcher {
    tx: mpsc::Sender<AppointmentConfirmation>,
}

impl NotificationDispatcher {
    pub fn spawn(client: NotificationClient, queue_size: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AppointmentConfirmation>(queue_size.max(1));

        tokio::spawn(async move {
            while let Some(confirmation) = rx.recv().await {
                match client.send_appointment_confirmation(&confirmation).await {
                    Ok(()) => {
                        info!(
                            "Appointment confirmation sent to {} successfully",
                            confirmation.recipient_email
                        );
                    }
                    Err(e) => {
                        warn!(
                            "Failed to send appointment confirmation to {}: {}",
                            confirmation.recipient_email, e
                        );
                    }
                }
            }
            debug!("Notification worker stopped");
        });

        Self { tx }
    }

    pub fn dispatch(&self, confirmation: AppointmentConfirmation) {
        if self.tx.try_send(confirmation).is_err() {
            warn!("Notification queue full, dropping appointment confirmation");
        }
    }
}
