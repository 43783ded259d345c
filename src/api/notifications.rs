use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{NotificationId, ReferenceId};

const NOTIFICATIONS: &str = "notifications";
const ALL: &str = "notifications/all";
const UNREAD: &str = "notifications/unread";
const STATS: &str = "notifications/stats";
const MARK_ALL_READ: &str = "notifications/mark-all-read";
const CLEAR_ALL: &str = "notifications/clear-all";
const CREATE: &str = "notifications/create";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum NotificationKind {
    Transaction,
    Payment,
    BillPayment,
    Card,
    Security,
    Promotional,
    #[serde(other)]
    System,
}

impl NotificationKind {
    /// Path segment used by `notifications/type/{type}`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "TRANSACTION",
            Self::Payment => "PAYMENT",
            Self::BillPayment => "BILL_PAYMENT",
            Self::Card => "CARD",
            Self::Security => "SECURITY",
            Self::Promotional => "PROMOTIONAL",
            Self::System => "SYSTEM",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Notification {
    pub notification_id: NotificationId,
    #[serde(rename = "notificationType", default = "system")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Id of the record this notification is about, e.g. a transaction.
    #[serde(default)]
    pub reference_id: Option<ReferenceId>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(with = "crate::api::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub read_at: Option<OffsetDateTime>,
}

fn system() -> NotificationKind {
    NotificationKind::System
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NotificationStats {
    #[serde(default)]
    pub total_notifications: u64,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub read_count: u64,
}

/// A notification raised by the client itself, mainly for testing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewNotification {
    #[serde(rename = "notificationType")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl NewNotification {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title or message is blank.
    pub fn new(kind: NotificationKind, title: &str, message: &str) -> Result<Self, Error> {
        let (title, message) = (title.trim(), message.trim());
        if title.is_empty() || message.is_empty() {
            return Err(Error::validation("Title and message are required"));
        }
        Ok(Self {
            kind,
            title: title.to_owned(),
            message: message.to_owned(),
            priority: None,
        })
    }

    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

#[derive(Serialize)]
struct EmptyBody {}

/// In-app notifications.
pub struct Notifications<'a> {
    http: Authed<'a>,
}

impl<'a> Notifications<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn list(&self) -> Result<Vec<Notification>, Error> {
        self.http.get(ALL).await
    }

    pub async fn unread(&self) -> Result<Vec<Notification>, Error> {
        self.http.get(UNREAD).await
    }

    pub async fn by_kind(&self, kind: NotificationKind) -> Result<Vec<Notification>, Error> {
        self.http
            .get(&format!("{NOTIFICATIONS}/type/{}", kind.as_str()))
            .await
    }

    /// Counters for the badge.
    pub async fn stats(&self) -> Result<NotificationStats, Error> {
        self.http.get(STATS).await
    }

    pub async fn get(&self, id: &NotificationId) -> Result<Notification, Error> {
        self.http.get(&format!("{NOTIFICATIONS}/{id}")).await
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<(), Error> {
        let _: IgnoredAny = self
            .http
            .put(&format!("{NOTIFICATIONS}/{id}/read"), &EmptyBody {})
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<(), Error> {
        let _: IgnoredAny = self.http.put(MARK_ALL_READ, &EmptyBody {}).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &NotificationId) -> Result<(), Error> {
        let _: IgnoredAny = self.http.delete(&format!("{NOTIFICATIONS}/{id}")).await?;
        Ok(())
    }

    /// Delete every notification.
    pub async fn clear_all(&self) -> Result<(), Error> {
        let _: IgnoredAny = self.http.delete(CLEAR_ALL).await?;
        Ok(())
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification, Error> {
        self.http.post(CREATE, notification).await
    }
}
