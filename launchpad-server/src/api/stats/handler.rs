//! Statistics Handlers

use axum::extract::{Extension, State};
use axum::Json;
use serde::Serialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::db::models::{AttendanceKind, Club};
use crate::db::repository::{AttendanceRepository, MemberRepository};
use crate::reporting::{self, ClubReport, ReportTotals};
use crate::utils::AppResult;
use crate::utils::time;

/// 拉取一个社团的成员和考勤记录并聚合
async fn build_club_report(state: &ServerState, club: Club) -> AppResult<ClubReport> {
    let members = MemberRepository::new(state.db.clone())
        .find_by_club(club)
        .await?;
    let usns: Vec<String> = members.iter().map(|m| m.usn.clone()).collect();
    let records = AttendanceRepository::new(state.db.clone())
        .find_by_users_batched(&usns, AttendanceKind::Member, state.config.attendance_batch_size)
        .await?;

    let day_start = time::current_day_start_millis(state.config.timezone);
    Ok(reporting::club_report(club, &members, &records, day_start))
}

/// GET /api/stats - 本社团出勤报表
pub async fn club_stats(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> AppResult<Json<ClubReport>> {
    let report = build_club_report(&state, admin.club).await?;
    tracing::debug!(
        club = %admin.club,
        members = report.total_members,
        check_ins = report.total_check_ins,
        "Built club report"
    );
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct AllClubsReport {
    pub clubs: Vec<ClubReport>,
    pub totals: ReportTotals,
}

/// GET /api/stats/all - 全部社团报表 (路由中间件限制为 SOSC 管理员)
pub async fn all_club_stats(
    State(state): State<ServerState>,
) -> AppResult<Json<AllClubsReport>> {
    let mut clubs = Vec::with_capacity(Club::ALL.len());
    for club in Club::ALL {
        clubs.push(build_club_report(&state, club).await?);
    }
    let totals = reporting::report_totals(&clubs);

    Ok(Json(AllClubsReport { clubs, totals }))
}
