/*
Notification Container Module

A notification event is a transient record describing something worth telling the
operators about: an approved allowance, a completed transfer, a website visit, or a
free-form message. Events are formatted and handed to a Notifier immediately; they
are never stored.

The payload is a loose key/value map because each kind carries a different field
set. Missing fields are tolerated everywhere downstream.
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Key/value data carried by a notification event
pub type NotificationPayload = HashMap<String, Value>;

/// The closed set of notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AllowanceApproved,
    TransferSuccess,
    WebsiteVisit,
    #[serde(other)]
    Generic,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::AllowanceApproved,
        NotificationKind::TransferSuccess,
        NotificationKind::WebsiteVisit,
        NotificationKind::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowanceApproved => "allowance_approved",
            Self::TransferSuccess => "transfer_success",
            Self::WebsiteVisit => "website_visit",
            Self::Generic => "generic",
        }
    }

    /// Resolve a kind by name. Unrecognized names resolve to `Generic`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "allowance_approved" => Self::AllowanceApproved,
            "transfer_success" => Self::TransferSuccess,
            "website_visit" => Self::WebsiteVisit,
            _ => Self::Generic,
        }
    }

    /// Header line that opens every message of this kind
    pub fn header(&self) -> &'static str {
        match self {
            Self::AllowanceApproved => "🎯 **ALLOWANCE APPROVED**",
            Self::TransferSuccess => "💰 **TRANSFER COMPLETED**",
            Self::WebsiteVisit => "🌐 **WEBSITE VISITOR**",
            Self::Generic => "📢 **NOTIFICATION**",
        }
    }

    /// Payload fields the template for this kind reads
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::AllowanceApproved => &["accountId", "targetWallet", "allowanceAmount", "transactionId"],
            Self::TransferSuccess => &["fromAccount", "toAccount", "amount", "transactionId"],
            Self::WebsiteVisit => &[
                "ip", "city", "region", "country", "isp", "timezone", "lat", "lon",
            ],
            Self::Generic => &[],
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification waiting to be formatted and delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Selects the message template
    pub kind: NotificationKind,
    /// Template data; field sets vary by kind
    #[serde(default)]
    pub payload: NotificationPayload,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            payload: NotificationPayload::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Free-form message rendered with the generic template
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Generic).with_field("message", message.into())
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}
