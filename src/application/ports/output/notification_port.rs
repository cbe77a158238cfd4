/*
Notification Ports

Output port for the notification system. The application layer hands finished
events to a `Notifier` without knowing which chat service (if any) is behind it.

Notifications are advisory. `Notifier::notify` has no error channel: adapters catch
and log their own delivery failures so the request that produced the event always
completes. `NotificationPortError` exists for the adapters' internal plumbing.
*/

use async_trait::async_trait;

pub use crate::core::platform::container::notification::{
    NotificationEvent, NotificationKind, NotificationPayload,
};

/// Result type for notification port operations
pub type NotificationPortResult<T> = Result<T, NotificationPortError>;

/// Errors that can occur while delivering a notification
#[derive(Debug, thiserror::Error)]
pub enum NotificationPortError {
    #[error("Notifier not configured")]
    NotConfigured,

    #[error("Connection error: {0}")]
    ConnectionError(#[from] reqwest::Error),

    #[error("API error: status {status}: {body}")]
    ApiError { status: u16, body: String },
}

/// Best-effort, at-most-once notification delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Format and deliver `event`. Failures are logged, never returned.
    async fn notify(&self, event: &NotificationEvent);
}
