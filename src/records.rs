use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Account record. Names are case-sensitive and act as the primary key;
/// accounts are never updated or deleted after sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ComplaintStatus::Pending),
            "in-progress" => Some(ComplaintStatus::InProgress),
            "resolved" => Some(ComplaintStatus::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in-progress",
            ComplaintStatus::Resolved => "resolved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    /// Badge class hook for the stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "status-pending",
            ComplaintStatus::InProgress => "status-in-progress",
            ComplaintStatus::Resolved => "status-resolved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: i64,
    /// Submitter, equal to the account name.
    pub name: String,
    pub building_code: String,
    pub category: String,
    pub complaint: String,
    pub status: ComplaintStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub response: Option<String>,
}

impl Complaint {
    /// The short reference shown to users ("ID #493021").
    pub fn short_id(&self) -> String {
        short_id(self.id)
    }

    pub fn created_date(&self) -> String {
        self.created_at.date().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Admin,
}

impl Sender {
    pub fn is_user(&self) -> bool {
        matches!(self, Sender::User)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub complaint_id: i64,
    pub sender: Sender,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub sender_name: String,
    /// Admin-side soft flag; older stored records may omit it.
    #[serde(default)]
    pub read: bool,
}

impl Message {
    pub fn timestamp_display(&self) -> String {
        format!(
            "{} {:02}:{:02}",
            self.timestamp.date(),
            self.timestamp.hour(),
            self.timestamp.minute()
        )
    }
}

/// Record ids are the creation instant in milliseconds. Collisions are only
/// possible for sub-millisecond concurrent writes and are not guarded
/// against.
pub fn record_id(now: OffsetDateTime) -> i64 {
    (now.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn short_id(id: i64) -> String {
    let digits = id.to_string();
    let start = digits.len().saturating_sub(6);
    digits[start..].to_string()
}
