//! Member Model

use super::Club;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Member ID type ("member:<usn>")
pub type MemberId = RecordId;

/// Registered club member, keyed by USN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<MemberId>,
    pub usn: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub club: Club,
    /// Creation time (Unix millis)
    #[serde(default)]
    pub created_at: i64,
}

/// Create member payload (club comes from the admin's token, not the body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub usn: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}
