//! 出勤统计聚合引擎
//!
//! 纯函数层：输入成员列表 + 考勤记录，输出社团报表。
//! 数据获取 (分批查询) 在 repository 层，时区边界在 handler 层，
//! 这里只做计数和小时数累加，方便单元测试。
//!
//! 口径：
//! - 小时数只统计已签退的记录，按原始值累加、最后一次性四舍五入到一位小数
//! - 人均小时数用未舍入的总数除以全部成员数 (不是只有记录的成员)
//! - 排行榜按签到次数降序取前 5，次数相同保持成员列表顺序 (稳定排序)

use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::{AttendanceRecord, Club, Member};
use crate::utils::time::{format_duration_millis, hours_between, round_hours};

/// 排行榜长度
pub const TOP_MEMBERS_LIMIT: usize = 5;

/// 排行榜条目
#[derive(Debug, Clone, Serialize)]
pub struct TopMember {
    pub usn: String,
    pub name: String,
    pub check_ins: i32,
    /// 已签退时长合计 (小时，一位小数)
    pub hours: f64,
}

/// 单个社团的出勤报表
#[derive(Debug, Clone, Serialize)]
pub struct ClubReport {
    pub club: Club,
    pub total_members: i32,
    pub total_check_ins: i32,
    /// 当天零点之后的签到数 (业务时区)
    pub active_today: i32,
    /// 未签退的记录数 (不限日期)
    pub active_now: i32,
    /// 小时数合计 (一位小数)
    pub total_hours: f64,
    /// 人均小时数 (一位小数，分母是全部成员)
    pub avg_hours_per_member: f64,
    pub top_members: Vec<TopMember>,
}

/// 跨社团汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTotals {
    pub members: i32,
    pub check_ins: i32,
    pub active_now: i32,
    pub hours: f64,
}

/// 成员列表视图的逐人汇总
#[derive(Debug, Clone, Serialize)]
pub struct MemberRollup {
    pub usn: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub club: Club,
    pub total_check_ins: i32,
    pub total_hours: f64,
    pub last_check_in: Option<i64>,
    pub is_active: bool,
}

#[derive(Default)]
struct Tally {
    check_ins: i32,
    hours: f64,
    last_check_in: Option<i64>,
    is_active: bool,
}

fn tally_records(members: &[Member], records: &[AttendanceRecord]) -> Vec<Tally> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        index.insert(member.usn.as_str(), i);
    }

    let mut tallies: Vec<Tally> = (0..members.len()).map(|_| Tally::default()).collect();
    for record in records {
        let Some(&i) = index.get(record.user_id.as_str()) else {
            continue;
        };
        let tally = &mut tallies[i];
        tally.check_ins += 1;
        if let Some(check_out) = record.check_out {
            tally.hours += hours_between(record.check_in, check_out);
        } else {
            tally.is_active = true;
        }
        if tally.last_check_in.is_none_or(|last| record.check_in > last) {
            tally.last_check_in = Some(record.check_in);
        }
    }
    tallies
}

/// 聚合一个社团的报表
///
/// `records` 必须是该社团成员的考勤记录 (repository 层按成员 ID 分批拉取)，
/// `day_start` 是业务时区的当天零点。
pub fn club_report(
    club: Club,
    members: &[Member],
    records: &[AttendanceRecord],
    day_start: i64,
) -> ClubReport {
    let tallies = tally_records(members, records);

    let mut total_check_ins = 0;
    let mut active_today = 0;
    let mut active_now = 0;
    let mut total_hours = 0.0;
    for record in records {
        total_check_ins += 1;
        if let Some(check_out) = record.check_out {
            total_hours += hours_between(record.check_in, check_out);
        } else {
            active_now += 1;
        }
        if record.check_in >= day_start {
            active_today += 1;
        }
    }

    // 排序是稳定的：次数相同的成员保持在 members 里的顺序
    let mut order: Vec<usize> = (0..members.len())
        .filter(|&i| tallies[i].check_ins > 0)
        .collect();
    order.sort_by(|&a, &b| tallies[b].check_ins.cmp(&tallies[a].check_ins));

    let top_members = order
        .into_iter()
        .take(TOP_MEMBERS_LIMIT)
        .map(|i| TopMember {
            usn: members[i].usn.clone(),
            name: members[i].name.clone(),
            check_ins: tallies[i].check_ins,
            hours: round_hours(tallies[i].hours),
        })
        .collect();

    let avg_hours_per_member = if members.is_empty() {
        0.0
    } else {
        round_hours(total_hours / members.len() as f64)
    };

    ClubReport {
        club,
        total_members: members.len() as i32,
        total_check_ins,
        active_today,
        active_now,
        total_hours: round_hours(total_hours),
        avg_hours_per_member,
        top_members,
    }
}

/// 跨社团汇总行
pub fn report_totals(reports: &[ClubReport]) -> ReportTotals {
    let mut totals = ReportTotals::default();
    for report in reports {
        totals.members += report.total_members;
        totals.check_ins += report.total_check_ins;
        totals.active_now += report.active_now;
        totals.hours += report.total_hours;
    }
    totals.hours = round_hours(totals.hours);
    totals
}

/// 成员列表视图：逐人汇总，按姓名排序
pub fn member_rollups(members: &[Member], records: &[AttendanceRecord]) -> Vec<MemberRollup> {
    let tallies = tally_records(members, records);

    let mut rollups: Vec<MemberRollup> = members
        .iter()
        .zip(tallies)
        .map(|(member, tally)| MemberRollup {
            usn: member.usn.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            club: member.club,
            total_check_ins: tally.check_ins,
            total_hours: round_hours(tally.hours),
            last_check_in: tally.last_check_in,
            is_active: tally.is_active,
        })
        .collect();
    rollups.sort_by(|a, b| a.name.cmp(&b.name));
    rollups
}

/// 成员出勤历史的时长标签: 未签退显示 "Active"
pub fn member_duration_label(record: &AttendanceRecord) -> String {
    match record.check_out {
        Some(check_out) => format_duration_millis(check_out - record.check_in),
        None => "Active".to_string(),
    }
}

/// 访客列表的到访时长标签: 未签退显示 "Still here"
pub fn guest_visit_label(check_in: i64, check_out: Option<i64>) -> String {
    match check_out {
        Some(check_out) => format_duration_millis(check_out - check_in),
        None => "Still here".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::AttendanceKind;
    use crate::utils::time::{MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

    fn member(usn: &str, name: &str) -> Member {
        Member {
            id: None,
            usn: usn.to_string(),
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            club: Club::Sosc,
            created_at: 0,
        }
    }

    fn record(usn: &str, check_in: i64, check_out: Option<i64>) -> AttendanceRecord {
        AttendanceRecord {
            id: None,
            user_id: usn.to_string(),
            kind: AttendanceKind::Member,
            check_in,
            check_out,
        }
    }

    fn closed(usn: &str, check_in: i64, hours: i64, minutes: i64) -> AttendanceRecord {
        record(
            usn,
            check_in,
            Some(check_in + hours * MILLIS_PER_HOUR + minutes * MILLIS_PER_MINUTE),
        )
    }

    #[test]
    fn test_ranking_by_check_ins_with_closed_hours() {
        let members = vec![member("101", "Asha"), member("102", "Ravi")];
        let records = vec![
            closed("101", 0, 1, 0),
            closed("101", 10 * MILLIS_PER_HOUR, 1, 30),
            closed("101", 20 * MILLIS_PER_HOUR, 2, 0),
            record("102", 30 * MILLIS_PER_HOUR, None),
        ];

        let report = club_report(Club::Sosc, &members, &records, i64::MAX);

        assert_eq!(report.total_members, 2);
        assert_eq!(report.total_check_ins, 4);
        assert_eq!(report.active_now, 1);
        assert_eq!(report.total_hours, 4.5);
        assert_eq!(report.avg_hours_per_member, 2.3); // 4.5 / 2 = 2.25, rounds up

        assert_eq!(report.top_members.len(), 2);
        assert_eq!(report.top_members[0].usn, "101");
        assert_eq!(report.top_members[0].check_ins, 3);
        assert_eq!(report.top_members[0].hours, 4.5);
        assert_eq!(report.top_members[1].usn, "102");
        assert_eq!(report.top_members[1].check_ins, 1);
        assert_eq!(report.top_members[1].hours, 0.0);
    }

    #[test]
    fn test_top_members_capped_at_five_with_stable_ties() {
        let members: Vec<Member> = (0..7)
            .map(|i| member(&format!("m{i}"), &format!("Member {i}")))
            .collect();
        // check-in counts: m0=3, m1=1, m2=3, m3=2, m4=5, m5=1, m6=0
        let counts = [3, 1, 3, 2, 5, 1, 0];
        let mut records = Vec::new();
        for (i, &count) in counts.iter().enumerate() {
            for j in 0..count {
                records.push(closed(&format!("m{i}"), (j as i64) * MILLIS_PER_HOUR * 10, 1, 0));
            }
        }

        let report = club_report(Club::Sosc, &members, &records, i64::MAX);

        let order: Vec<&str> = report.top_members.iter().map(|t| t.usn.as_str()).collect();
        // m4 (5), then the 3-tie in member order (m0, m2), m3 (2), then the first 1-tie (m1)
        assert_eq!(order, vec!["m4", "m0", "m2", "m3", "m1"]);
        // m6 has no records and m5 is squeezed out by the cap
        assert_eq!(report.top_members.len(), TOP_MEMBERS_LIMIT);
    }

    #[test]
    fn test_today_boundary_counts_check_ins_not_checkouts() {
        let members = vec![member("201", "Devi")];
        let day_start = 1_000 * MILLIS_PER_HOUR;
        let records = vec![
            // Yesterday's visit, closed today: not an "active today" check-in
            closed("201", day_start - 5 * MILLIS_PER_HOUR, 6, 0),
            // Checked in right at midnight: counts
            closed("201", day_start, 1, 0),
            // Checked in later today and still here: counts, and is active now
            record("201", day_start + 2 * MILLIS_PER_HOUR, None),
        ];

        let report = club_report(Club::Sosc, &members, &records, day_start);

        assert_eq!(report.active_today, 2);
        assert_eq!(report.active_now, 1);
        assert_eq!(report.total_check_ins, 3);
    }

    #[test]
    fn test_empty_club_has_zero_average() {
        let report = club_report(Club::Src, &[], &[], 0);
        assert_eq!(report.total_members, 0);
        assert_eq!(report.total_check_ins, 0);
        assert_eq!(report.total_hours, 0.0);
        assert_eq!(report.avg_hours_per_member, 0.0);
        assert!(report.top_members.is_empty());
    }

    #[test]
    fn test_hours_rounded_once_at_the_end() {
        let members = vec![member("301", "Kiran")];
        // 3 visits of 1h 2m each: raw total 3.1 hours, per-visit rounding would give 3.0
        let records = vec![
            closed("301", 0, 1, 2),
            closed("301", 10 * MILLIS_PER_HOUR, 1, 2),
            closed("301", 20 * MILLIS_PER_HOUR, 1, 2),
        ];

        let report = club_report(Club::Sosc, &members, &records, i64::MAX);
        assert_eq!(report.total_hours, 3.1);
        assert_eq!(report.top_members[0].hours, 3.1);
    }

    #[test]
    fn test_report_totals_sum_across_clubs() {
        let sosc = club_report(
            Club::Sosc,
            &[member("a", "A")],
            &[closed("a", 0, 2, 0), record("a", 99 * MILLIS_PER_HOUR, None)],
            i64::MAX,
        );
        let src = club_report(Club::Src, &[], &[], i64::MAX);

        let totals = report_totals(&[sosc, src]);
        assert_eq!(totals.members, 1);
        assert_eq!(totals.check_ins, 2);
        assert_eq!(totals.active_now, 1);
        assert_eq!(totals.hours, 2.0);
    }

    #[test]
    fn test_member_rollups_sorted_by_name() {
        let members = vec![member("402", "Zara"), member("401", "Anil")];
        let records = vec![
            closed("402", 0, 2, 30),
            record("402", 10 * MILLIS_PER_HOUR, None),
        ];

        let rollups = member_rollups(&members, &records);

        assert_eq!(rollups[0].name, "Anil");
        assert_eq!(rollups[0].total_check_ins, 0);
        assert!(!rollups[0].is_active);
        assert_eq!(rollups[0].last_check_in, None);

        assert_eq!(rollups[1].name, "Zara");
        assert_eq!(rollups[1].total_check_ins, 2);
        assert_eq!(rollups[1].total_hours, 2.5);
        assert!(rollups[1].is_active);
        assert_eq!(rollups[1].last_check_in, Some(10 * MILLIS_PER_HOUR));
    }

    #[test]
    fn test_duration_labels() {
        let open = record("501", 0, None);
        assert_eq!(member_duration_label(&open), "Active");
        assert_eq!(guest_visit_label(0, None), "Still here");

        let done = closed("501", 0, 2, 30);
        assert_eq!(member_duration_label(&done), "2h 30m");
        assert_eq!(
            guest_visit_label(done.check_in, done.check_out),
            "2h 30m"
        );
    }
}
