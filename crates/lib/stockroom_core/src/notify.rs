//! Expiring-item owner notifications.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::MailConfig;
use crate::inventory::InventoryError;
use crate::inventory::items::expiring_items;
use crate::inventory::status::Horizon;
use crate::models::inventory::Item;

const SUBJECT: &str = "Expiring Products";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to load expiring items: {0}")]
    Fetch(#[from] InventoryError),

    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {0}")]
    Rejected(u16),
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Delivers mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError>;
}

/// Posts each message as JSON to a mail relay.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(relay_url: impl Into<String>, api_key: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("stockroom/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            relay_url: relay_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.relay_url).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        debug!(to = %message.to, "mail relayed");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        info!(to = %message.to, subject = %message.subject, body = %message.text, "mail (no relay configured)");
        Ok(())
    }
}

/// Pick the mailer for the configured relay.
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, NotifyError> {
    Ok(match &config.relay_url {
        Some(url) => Arc::new(HttpMailer::new(url.clone(), config.api_key.clone())?),
        None => Arc::new(LogMailer),
    })
}

/// Result of a notification sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub sent: usize,
    /// Recipients whose message could not be delivered.
    pub failed: Vec<String>,
}

/// Build the reminder for one item's owner.
pub fn expiring_message(item: &Item, from: &str) -> MailMessage {
    let expires = item
        .expiration_date
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "no date".into());
    MailMessage {
        from: from.to_owned(),
        to: item.owner_email.clone(),
        subject: SUBJECT.into(),
        text: format!(
            "Good day! This is an auto-generated email to inform you that {} is expiring on {}. \
             Please renew the product before it expires.",
            item.name, expires
        ),
    }
}

/// Send every message concurrently and tally the outcome.
pub async fn send_all(mailer: &dyn Mailer, messages: &[MailMessage]) -> NotificationReport {
    let results = join_all(messages.iter().map(|m| mailer.send(m))).await;

    let mut report = NotificationReport::default();
    for (message, result) in messages.iter().zip(results) {
        match result {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!(to = %message.to, error = %e, "notification failed");
                report.failed.push(message.to.clone());
            }
        }
    }
    report
}

/// Notify the owner of every item expiring within 30 days (or already expired).
pub async fn notify_expiring(
    pool: &PgPool,
    mailer: &dyn Mailer,
    from: &str,
    now: DateTime<Utc>,
) -> Result<NotificationReport, NotifyError> {
    let items = expiring_items(pool, now, Horizon::Month).await?;
    let messages: Vec<MailMessage> = items.iter().map(|i| expiring_message(i, from)).collect();
    let report = send_all(mailer, &messages).await;
    info!(sent = report.sent, failed = report.failed.len(), "expiring-item sweep done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::ItemType;
    use chrono::TimeZone;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<MailMessage>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
            if self.reject.as_deref() == Some(message.to.as_str()) {
                return Err(NotifyError::Rejected(550));
            }
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }

    fn item(name: &str, email: &str) -> Item {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        Item {
            id: 1,
            name: name.into(),
            description: String::new(),
            owner: "Ops".into(),
            owner_email: email.into(),
            item_type: ItemType::Software,
            purchase_date: None,
            subscription_date: None,
            expiration_date: Some(Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap()),
            archived: false,
            attachment: String::new(),
            requisition_number: None,
            number_of_licenses: None,
            vendor_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn message_names_item_and_date() {
        let msg = expiring_message(&item("Figma", "owner@example.com"), "stockroom@localhost");
        assert_eq!(msg.to, "owner@example.com");
        assert_eq!(msg.subject, "Expiring Products");
        assert!(msg.text.contains("Figma is expiring on 2025-03-20"));
    }

    #[tokio::test]
    async fn send_all_reports_failures_per_recipient() {
        let mailer = RecordingMailer {
            reject: Some("bad@example.com".into()),
            ..Default::default()
        };
        let messages = vec![
            expiring_message(&item("A", "a@example.com"), "x"),
            expiring_message(&item("B", "bad@example.com"), "x"),
            expiring_message(&item("C", "c@example.com"), "x"),
        ];

        let report = send_all(&mailer, &messages).await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, vec!["bad@example.com".to_string()]);
        assert_eq!(mailer.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn empty_sweep_sends_nothing() {
        let report = send_all(&LogMailer, &[]).await;
        assert_eq!(report, NotificationReport::default());
    }

    #[test]
    fn missing_relay_falls_back_to_log_mailer() {
        let config = MailConfig {
            relay_url: None,
            api_key: None,
            from: "stockroom@localhost".into(),
        };
        assert!(mailer_from_config(&config).is_ok());
    }
}
