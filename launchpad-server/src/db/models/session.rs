//! Session Model
//!
//! 签到会话：自助终端签到成功后拿到 session id，状态页、签退和提醒开关
//! 都凭它找回对应的考勤记录。替代浏览器本地存储，服务端是唯一事实来源。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::AttendanceKind;
use super::serde_helpers;

/// Session ID type
pub type SessionId = RecordId;

/// Lifecycle of a check-in session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Active or closed kiosk session, one per open attendance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SessionId>,
    /// The attendance record this session controls
    #[serde(with = "serde_helpers::record_id")]
    pub attendance_id: RecordId,
    /// Same key as the attendance record: USN or "guest:<id>"
    pub user_id: String,
    pub kind: AttendanceKind,
    /// Name shown on the status page (member name or guest full name)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Check-in time (Unix millis), denormalized for the status page
    pub check_in: i64,
    pub status: SessionStatus,
    /// Whether the periodic checkout reminder is armed for this session
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Data for opening a new session
///
/// Status starts as `active` with the reminder disarmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub attendance_id: RecordId,
    pub user_id: String,
    pub kind: AttendanceKind,
    pub display_name: Option<String>,
    pub check_in: i64,
}
