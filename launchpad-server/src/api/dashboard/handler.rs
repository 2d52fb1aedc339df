//! Dashboard Handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Extension, State};
use serde::Serialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::db::models::{AttendanceKind, AttendanceRecord};
use crate::db::repository::{AttendanceRepository, GuestRepository, MemberRepository};
use crate::utils::AppResult;
use crate::utils::time;

/// 活动流条数
const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_members: i32,
    pub today_check_ins: i32,
    pub active_now: i32,
    pub total_guests: i64,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub name: String,
    pub kind: AttendanceKind,
    pub check_in: i64,
    pub action: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityEntry>,
}

/// GET /api/dashboard - 管理员首页概览
///
/// 成员数和签到数只算本社团；访客数是全局的。
/// 这里的 active_now 只看今天的记录，统计页的同名字段覆盖全部历史。
pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> AppResult<Json<DashboardResponse>> {
    let attendance_repo = AttendanceRepository::new(state.db.clone());

    let members = MemberRepository::new(state.db.clone())
        .find_by_club(admin.club)
        .await?;
    let usns: Vec<String> = members.iter().map(|m| m.usn.clone()).collect();

    let day_start = time::current_day_start_millis(state.config.timezone);
    let today = attendance_repo
        .find_by_users_since_batched(
            &usns,
            AttendanceKind::Member,
            day_start,
            state.config.attendance_batch_size,
        )
        .await?;
    let active_now = today.iter().filter(|r| r.is_open()).count();

    let total_guests = GuestRepository::new(state.db.clone()).count().await?;

    let recent = attendance_repo.find_recent(RECENT_ACTIVITY_LIMIT).await?;
    let recent_activity = resolve_activity(&state, recent).await?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            total_members: members.len() as i32,
            today_check_ins: today.len() as i32,
            active_now: active_now as i32,
            total_guests,
        },
        recent_activity,
    }))
}

/// 把活动流里的 user_id 解析成显示名
///
/// 成员按 USN 查名字，访客按记录键查全名，查不到的保留原始 ID。
async fn resolve_activity(
    state: &ServerState,
    records: Vec<AttendanceRecord>,
) -> AppResult<Vec<ActivityEntry>> {
    let member_ids: Vec<String> = records
        .iter()
        .filter(|r| r.kind == AttendanceKind::Member)
        .map(|r| r.user_id.clone())
        .collect();
    let guest_keys: Vec<String> = records
        .iter()
        .filter(|r| r.kind == AttendanceKind::Guest)
        .map(|r| r.user_id.clone())
        .collect();

    let members = MemberRepository::new(state.db.clone())
        .find_by_usns(member_ids)
        .await?;
    let guests = GuestRepository::new(state.db.clone())
        .find_by_keys(guest_keys)
        .await?;

    let member_names: HashMap<&str, &str> = members
        .iter()
        .map(|m| (m.usn.as_str(), m.name.as_str()))
        .collect();
    let guest_names: HashMap<String, &str> = guests
        .iter()
        .filter_map(|g| g.id.as_ref().map(|id| (id.to_string(), g.full_name.as_str())))
        .collect();

    let entries = records
        .into_iter()
        .map(|record| {
            let name = match record.kind {
                AttendanceKind::Member => member_names.get(record.user_id.as_str()).copied(),
                AttendanceKind::Guest => guest_names.get(&record.user_id).copied(),
            }
            .unwrap_or(record.user_id.as_str())
            .to_string();

            ActivityEntry {
                id: record
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                name,
                kind: record.kind,
                check_in: record.check_in,
                action: if record.is_open() {
                    "Checked In"
                } else {
                    "Checked Out"
                },
            }
        })
        .collect();

    Ok(entries)
}
