//! Database Models

// Serde helpers
pub mod serde_helpers;

// Tenancy
pub mod club;

// People
pub mod guest;
pub mod member;

// Attendance
pub mod attendance;
pub mod session;

// Auth
pub mod admin;

// Re-exports
pub use admin::{Admin, AdminCreate, AdminId};
pub use attendance::{AttendanceId, AttendanceKind, AttendanceRecord};
pub use club::Club;
pub use guest::{Guest, GuestId, GuestRegister};
pub use member::{Member, MemberCreate, MemberId};
pub use session::{Session, SessionCreate, SessionId, SessionStatus};
