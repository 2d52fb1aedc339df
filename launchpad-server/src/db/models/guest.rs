//! Guest Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Guest ID type
pub type GuestId = RecordId;

/// Walk-in visitor without a member registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guest {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<GuestId>,
    /// The USN the visitor typed at the kiosk (kept for reference, not a key)
    pub usn: String,
    pub full_name: String,
    pub phone_number: String,
    pub purpose: String,
    /// Creation time (Unix millis)
    #[serde(default)]
    pub created_at: i64,
}

/// Guest self-registration payload; every field is required
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestRegister {
    pub usn: String,
    pub full_name: String,
    pub phone_number: String,
    pub purpose: String,
}
