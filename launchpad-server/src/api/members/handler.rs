//! Member Handlers

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Serialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::db::models::{AttendanceKind, Member, MemberCreate};
use crate::db::repository::{AttendanceRepository, MemberRepository};
use crate::reporting::{self, MemberRollup};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// 取成员并校验社团归属
async fn find_scoped_member(
    repo: &MemberRepository,
    admin: &CurrentAdmin,
    usn: &str,
) -> AppResult<Member> {
    let member = repo
        .find_by_usn(usn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member '{usn}' not found")))?;
    if member.club != admin.club {
        return Err(AppError::Forbidden(format!(
            "Member '{usn}' belongs to another club"
        )));
    }
    Ok(member)
}

/// GET /api/members - 本社团成员列表，带逐人出勤汇总
pub async fn list(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> AppResult<Json<Vec<MemberRollup>>> {
    let members = MemberRepository::new(state.db.clone())
        .find_by_club(admin.club)
        .await?;
    let usns: Vec<String> = members.iter().map(|m| m.usn.clone()).collect();
    let records = AttendanceRepository::new(state.db.clone())
        .find_by_users_batched(&usns, AttendanceKind::Member, state.config.attendance_batch_size)
        .await?;

    Ok(Json(reporting::member_rollups(&members, &records)))
}

/// POST /api/members - 添加成员
///
/// 社团取自管理员令牌；USN 冲突返回 409。
pub async fn create(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<Member>> {
    validate_required_text(&payload.usn, "usn", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if !payload.email.trim().is_empty() {
        validate_email(payload.email.trim())?;
    }
    if payload.phone.len() > MAX_SHORT_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "phone is too long ({} chars, max {MAX_SHORT_TEXT_LEN})",
            payload.phone.len()
        )));
    }

    let member = MemberRepository::new(state.db.clone())
        .create(admin.club, payload)
        .await?;

    tracing::info!(usn = %member.usn, club = %member.club, admin = %admin.email, "Member added");
    Ok(Json(member))
}

/// DELETE /api/members/{usn} - 删除成员
///
/// 出勤历史保留，删除后统计里不再计入该成员。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(usn): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = MemberRepository::new(state.db.clone());
    find_scoped_member(&repo, &admin, &usn).await?;

    let deleted = repo.delete(&usn).await?;
    tracing::info!(usn = %usn, club = %admin.club, admin = %admin.email, "Member removed");
    Ok(Json(deleted))
}

#[derive(Debug, Serialize)]
pub struct AttendanceDetail {
    pub id: String,
    pub check_in: i64,
    pub check_out: Option<i64>,
    /// "2h 30m"，未签退显示 "Active"
    pub duration: String,
}

/// GET /api/members/{usn}/attendance - 成员出勤历史，按签到时间倒序
pub async fn attendance_history(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(usn): Path<String>,
) -> AppResult<Json<Vec<AttendanceDetail>>> {
    let repo = MemberRepository::new(state.db.clone());
    find_scoped_member(&repo, &admin, &usn).await?;

    let records = AttendanceRepository::new(state.db.clone())
        .find_by_user(&usn, AttendanceKind::Member)
        .await?;

    let details = records
        .iter()
        .map(|record| AttendanceDetail {
            id: record
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            check_in: record.check_in,
            check_out: record.check_out,
            duration: reporting::member_duration_label(record),
        })
        .collect();

    Ok(Json(details))
}
