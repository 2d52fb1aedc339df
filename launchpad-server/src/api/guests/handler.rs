//! Guest Handlers

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{AttendanceKind, AttendanceRecord};
use crate::db::repository::{AttendanceRepository, GuestRepository};
use crate::reporting;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct GuestRow {
    pub id: String,
    pub usn: String,
    pub full_name: String,
    pub phone_number: String,
    pub purpose: String,
    pub created_at: i64,
    pub check_in: Option<i64>,
    pub check_out: Option<i64>,
    /// "2h 30m" / "Still here"，没有考勤记录时 "-"
    pub duration: String,
}

/// GET /api/guests - 访客列表，按登记时间倒序
///
/// 每个访客只展示最近一次到访；记录按签到时间倒序返回，
/// 每个访客第一条命中的就是最近的。
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<GuestRow>>> {
    let guests = GuestRepository::new(state.db.clone()).find_all().await?;
    let records = AttendanceRepository::new(state.db.clone())
        .find_by_kind_ordered(AttendanceKind::Guest)
        .await?;

    let mut latest: HashMap<&str, &AttendanceRecord> = HashMap::new();
    for record in &records {
        latest.entry(record.user_id.as_str()).or_insert(record);
    }

    let rows = guests
        .iter()
        .map(|guest| {
            let key = guest
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            let visit = latest.get(key.as_str()).copied();
            GuestRow {
                id: key,
                usn: guest.usn.clone(),
                full_name: guest.full_name.clone(),
                phone_number: guest.phone_number.clone(),
                purpose: guest.purpose.clone(),
                created_at: guest.created_at,
                check_in: visit.map(|r| r.check_in),
                check_out: visit.and_then(|r| r.check_out),
                duration: visit
                    .map(|r| reporting::guest_visit_label(r.check_in, r.check_out))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect();

    Ok(Json(rows))
}
