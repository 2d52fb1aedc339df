//! Attendance Repository
//!
//! 考勤记录的不变式：同一个 user_id 最多只有一条未签退记录。
//! `open` 在创建前检查，`close` 用 `check_out IS NONE` 守卫，
//! 并发的重复签退只有一个能成功。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{AttendanceId, AttendanceKind, AttendanceRecord};
use crate::db::repository::{BaseRepository, RepoError, RepoResult};

#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 按记录 ID 查找
    pub async fn find_by_id(&self, id: &AttendanceId) -> RepoResult<Option<AttendanceRecord>> {
        let record: Option<AttendanceRecord> = self.base.db().select(id.clone()).await?;
        Ok(record)
    }

    /// 查找某用户的未签退记录
    pub async fn find_open_by_user(&self, user_id: &str) -> RepoResult<Option<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM attendance WHERE user_id = $user_id AND check_out IS NONE LIMIT 1")
            .bind(("user_id", user_id.to_string()))
            .await?;
        let record: Option<AttendanceRecord> = result.take(0)?;
        Ok(record)
    }

    /// 开一条考勤记录 (签到)
    ///
    /// 该用户已有未签退记录时返回 [`RepoError::Duplicate`]。
    pub async fn open(
        &self,
        user_id: &str,
        kind: AttendanceKind,
        check_in: i64,
    ) -> RepoResult<AttendanceRecord> {
        if self.find_open_by_user(user_id).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User '{user_id}' is already checked in"
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE attendance SET
                    user_id = $user_id,
                    kind = $kind,
                    check_in = $check_in,
                    check_out = NONE
                RETURN AFTER"#,
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("kind", kind))
            .bind(("check_in", check_in))
            .await?;

        let record: Option<AttendanceRecord> = result.take(0)?;
        record.ok_or_else(|| RepoError::Database("Failed to create attendance record".to_string()))
    }

    /// 关一条考勤记录 (签退)
    ///
    /// 只在记录仍然未签退时写入 `check_out`；
    /// 已签退的记录返回 [`RepoError::Duplicate`]，时间戳保持不变。
    pub async fn close(&self, id: &AttendanceId, check_out: i64) -> RepoResult<AttendanceRecord> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET check_out = $check_out WHERE check_out IS NONE RETURN AFTER")
            .bind(("record", id.clone()))
            .bind(("check_out", check_out))
            .await?;

        let updated: Option<AttendanceRecord> = result.take(0)?;
        match updated {
            Some(record) => Ok(record),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(RepoError::Duplicate(format!(
                    "Attendance record {id} is already checked out"
                ))),
                None => Err(RepoError::NotFound(format!(
                    "Attendance record {id} not found"
                ))),
            },
        }
    }

    /// 某用户的全部记录，按签到时间倒序 (成员出勤历史)
    pub async fn find_by_user(
        &self,
        user_id: &str,
        kind: AttendanceKind,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM attendance WHERE user_id = $user_id AND kind = $kind ORDER BY check_in DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("kind", kind))
            .await?;
        let records: Vec<AttendanceRecord> = result.take(0)?;
        Ok(records)
    }

    /// 某一类记录的全部历史，按签到时间倒序 (访客列表)
    pub async fn find_by_kind_ordered(
        &self,
        kind: AttendanceKind,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM attendance WHERE kind = $kind ORDER BY check_in DESC")
            .bind(("kind", kind))
            .await?;
        let records: Vec<AttendanceRecord> = result.take(0)?;
        Ok(records)
    }

    /// 按用户 ID 分批拉取考勤记录 (统计聚合)
    ///
    /// ID 列表按 `batch_size` 切块，顺序发 `IN` 查询后合并。
    /// 块之间互不相交，所以合并结果不会重复计数。
    pub async fn find_by_users_batched(
        &self,
        user_ids: &[String],
        kind: AttendanceKind,
        batch_size: usize,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut records = Vec::new();
        if user_ids.is_empty() {
            return Ok(records);
        }

        let batch_size = batch_size.max(1);
        for batch in user_ids.chunks(batch_size) {
            let mut result = self
                .base
                .db()
                .query("SELECT * FROM attendance WHERE user_id IN $user_ids AND kind = $kind")
                .bind(("user_ids", batch.to_vec()))
                .bind(("kind", kind))
                .await?;
            let chunk: Vec<AttendanceRecord> = result.take(0)?;
            records.extend(chunk);
        }

        Ok(records)
    }

    /// 按用户 ID 分批拉取某时刻之后的记录 (仪表盘的当日统计)
    pub async fn find_by_users_since_batched(
        &self,
        user_ids: &[String],
        kind: AttendanceKind,
        since: i64,
        batch_size: usize,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut records = Vec::new();
        if user_ids.is_empty() {
            return Ok(records);
        }

        let batch_size = batch_size.max(1);
        for batch in user_ids.chunks(batch_size) {
            let mut result = self
                .base
                .db()
                .query(
                    "SELECT * FROM attendance WHERE user_id IN $user_ids AND kind = $kind AND check_in >= $since",
                )
                .bind(("user_ids", batch.to_vec()))
                .bind(("kind", kind))
                .bind(("since", since))
                .await?;
            let chunk: Vec<AttendanceRecord> = result.take(0)?;
            records.extend(chunk);
        }

        Ok(records)
    }

    /// 最近的记录，按签到时间倒序 (仪表盘活动流)
    ///
    /// LIMIT 和索引字段上的 ORDER BY 组合在嵌入式引擎上丢过行，
    /// 活动流很小，这里在内存里截断。
    pub async fn find_recent(&self, limit: usize) -> RepoResult<Vec<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM attendance ORDER BY check_in DESC")
            .await?;
        let mut records: Vec<AttendanceRecord> = result.take(0)?;
        records.truncate(limit);
        Ok(records)
    }
}
