//! Attendance Model
//!
//! 考勤记录是整个系统的核心事实表：签到写入一条 check_out 为空的记录，
//! 签退把 check_out 填上。user_id 对成员是 USN，对访客是 guest 记录键。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Attendance ID type
pub type AttendanceId = RecordId;

/// Whether a record belongs to a registered member or a walk-in guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    Member,
    Guest,
}

impl AttendanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceKind::Member => "member",
            AttendanceKind::Guest => "guest",
        }
    }
}

impl std::fmt::Display for AttendanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One visit: open while `check_out` is null, closed once it is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AttendanceId>,
    /// Trimmed USN for members, guest record key ("guest:<id>") for guests
    pub user_id: String,
    pub kind: AttendanceKind,
    /// Check-in time (Unix millis)
    pub check_in: i64,
    /// Check-out time (Unix millis); null while the visit is open
    #[serde(default)]
    pub check_out: Option<i64>,
}

impl AttendanceRecord {
    /// An open record has no check-out yet
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}
