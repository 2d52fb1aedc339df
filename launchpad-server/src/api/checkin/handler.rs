//! Check-in Handlers (kiosk flows)

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{AttendanceKind, GuestRegister, Session, SessionCreate, SessionStatus};
use crate::db::repository::{
    AttendanceRepository, GuestRepository, MemberRepository, SessionRepository,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PURPOSE_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use crate::utils::time;

/// Session view returned to the kiosk
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub user_id: String,
    pub kind: AttendanceKind,
    pub display_name: Option<String>,
    pub check_in: i64,
    pub status: SessionStatus,
    pub reminder_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reminder_at: Option<i64>,
}

impl SessionView {
    fn from_session(session: &Session, last_reminder_at: Option<i64>) -> Self {
        Self {
            id: session
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            user_id: session.user_id.clone(),
            kind: session.kind,
            display_name: session.display_name.clone(),
            check_in: session.check_in,
            status: session.status,
            reminder_enabled: session.reminder_enabled,
            last_reminder_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub usn: String,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    /// false 表示查无此 USN，终端应跳转访客注册
    pub member_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

/// POST /api/checkin - 成员签到
///
/// USN 去掉首尾空白后查成员表；查到就开考勤记录 + 会话，
/// 查不到只回 `member_found: false`，不落任何数据。
pub async fn check_in(
    State(state): State<ServerState>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<CheckInResponse>> {
    let usn = payload.usn.trim().to_string();
    validate_required_text(&usn, "usn", MAX_SHORT_TEXT_LEN)?;

    let member_repo = MemberRepository::new(state.db.clone());
    let Some(member) = member_repo.find_by_usn(&usn).await? else {
        return Ok(Json(CheckInResponse {
            member_found: false,
            session: None,
        }));
    };

    let now = time::now_millis();
    let attendance = AttendanceRepository::new(state.db.clone())
        .open(&usn, AttendanceKind::Member, now)
        .await?;
    let attendance_id = attendance
        .id
        .clone()
        .ok_or_else(|| AppError::Internal("Attendance record created without id".to_string()))?;

    let session = SessionRepository::new(state.db.clone())
        .create(SessionCreate {
            attendance_id,
            user_id: usn.clone(),
            kind: AttendanceKind::Member,
            display_name: Some(member.name.clone()),
            check_in: now,
        })
        .await?;

    tracing::info!(usn = %usn, club = %member.club, "Member checked in");

    Ok(Json(CheckInResponse {
        member_found: true,
        session: Some(SessionView::from_session(&session, None)),
    }))
}

#[derive(Debug, Serialize)]
pub struct GuestCheckInResponse {
    pub session: SessionView,
}

/// POST /api/checkin/guest - 访客登记 + 签到
///
/// 四个字段全部必填。访客记录和考勤记录之间没有事务，
/// 中间失败会留下一条没有考勤的访客记录。
pub async fn register_guest(
    State(state): State<ServerState>,
    Json(payload): Json<GuestRegister>,
) -> AppResult<Json<GuestCheckInResponse>> {
    validate_required_text(&payload.usn, "usn", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone_number, "phone_number", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.purpose, "purpose", MAX_PURPOSE_LEN)?;

    let guest = GuestRepository::new(state.db.clone()).create(payload).await?;
    let guest_key = guest
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::Internal("Guest record created without id".to_string()))?;

    let now = time::now_millis();
    let attendance = AttendanceRepository::new(state.db.clone())
        .open(&guest_key, AttendanceKind::Guest, now)
        .await?;
    let attendance_id = attendance
        .id
        .clone()
        .ok_or_else(|| AppError::Internal("Attendance record created without id".to_string()))?;

    let session = SessionRepository::new(state.db.clone())
        .create(SessionCreate {
            attendance_id,
            user_id: guest_key.clone(),
            kind: AttendanceKind::Guest,
            display_name: Some(guest.full_name.clone()),
            check_in: now,
        })
        .await?;

    tracing::info!(guest = %guest_key, name = %guest.full_name, "Guest checked in");

    Ok(Json(GuestCheckInResponse {
        session: SessionView::from_session(&session, None),
    }))
}

/// GET /api/checkin/session/{id} - 会话状态
///
/// 终端恢复页面状态用；`last_reminder_at` 来自调度器注册表。
pub async fn session_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SessionView>> {
    let session = SessionRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

    let last_reminder_at = state.reminders.last_reminder_at(&id);
    Ok(Json(SessionView::from_session(&session, last_reminder_at)))
}

#[derive(Debug, Deserialize)]
pub struct CheckOutRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckOutResponse {
    pub session_id: String,
    pub duration_minutes: i64,
}

/// POST /api/checkin/checkout - 签退
///
/// 先关考勤记录再关会话：考勤写入失败时会话保持 active，
/// 终端可以重试。重复签退返回 409。
pub async fn check_out(
    State(state): State<ServerState>,
    Json(payload): Json<CheckOutRequest>,
) -> AppResult<Json<CheckOutResponse>> {
    let session_repo = SessionRepository::new(state.db.clone());
    let session = session_repo
        .find_by_id(&payload.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", payload.session_id)))?;

    if !session.is_active() {
        return Err(AppError::Conflict(format!(
            "Session {} is already checked out",
            payload.session_id
        )));
    }

    let now = time::now_millis();
    AttendanceRepository::new(state.db.clone())
        .close(&session.attendance_id, now)
        .await?;
    session_repo.close(&payload.session_id).await?;
    state.reminders.disarm(&payload.session_id);

    let duration_minutes = (now - session.check_in) / time::MILLIS_PER_MINUTE;
    tracing::info!(
        session_id = %payload.session_id,
        kind = %session.kind,
        duration_minutes,
        "Checked out"
    );

    Ok(Json(CheckOutResponse {
        session_id: payload.session_id,
        duration_minutes,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub session_id: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub session_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_reminder_at: Option<i64>,
}

/// POST /api/checkin/reminder - 签退提醒开关
///
/// 全局开关关闭时拒绝开启；只对 active 会话生效。
/// 开关状态持久化在会话上，重启后调度器恢复武装。
pub async fn set_reminder(
    State(state): State<ServerState>,
    Json(payload): Json<ReminderRequest>,
) -> AppResult<Json<ReminderResponse>> {
    if payload.enabled && !state.config.enable_checkout_reminders {
        return Err(AppError::BusinessRule(
            "Checkout reminders are disabled on this server".to_string(),
        ));
    }

    let session = SessionRepository::new(state.db.clone())
        .set_reminder(&payload.session_id, payload.enabled)
        .await?;

    let next_reminder_at = if payload.enabled {
        Some(state.reminders.arm(&payload.session_id, session.check_in))
    } else {
        state.reminders.disarm(&payload.session_id);
        None
    };

    tracing::info!(
        session_id = %payload.session_id,
        enabled = payload.enabled,
        "Checkout reminder toggled"
    );

    Ok(Json(ReminderResponse {
        session_id: payload.session_id,
        enabled: payload.enabled,
        next_reminder_at,
    }))
}
