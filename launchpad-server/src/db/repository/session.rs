//! Session Repository
//!
//! 会话和它控制的考勤记录同生共死：签到时创建 (active)，
//! 签退时关闭 (closed)。`close` / `set_reminder` 都带
//! `status = 'active'` 守卫，关闭是一次性的。

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Session, SessionCreate};
use crate::db::repository::{BaseRepository, RepoError, RepoResult};

#[derive(Debug, Clone)]
pub struct SessionRepository {
    base: BaseRepository,
}

impl SessionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> RepoResult<RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid session id: {id}")))
    }

    /// 开一个新会话 (active, 提醒未武装)
    pub async fn create(&self, data: SessionCreate) -> RepoResult<Session> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE session SET
                    attendance_id = $attendance_id,
                    user_id = $user_id,
                    kind = $kind,
                    display_name = $display_name,
                    check_in = $check_in,
                    status = 'active',
                    reminder_enabled = false,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("attendance_id", data.attendance_id.to_string()))
            .bind(("user_id", data.user_id))
            .bind(("kind", data.kind))
            .bind(("display_name", data.display_name))
            .bind(("check_in", data.check_in))
            .bind(("created_at", data.check_in))
            .await?;

        let session: Option<Session> = result.take(0)?;
        session.ok_or_else(|| RepoError::Database("Failed to create session".to_string()))
    }

    /// 按记录 ID 查找 ("session:xyz")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Session>> {
        let record = Self::parse_id(id)?;
        let session: Option<Session> = self.base.db().select(record).await?;
        Ok(session)
    }

    /// 关闭会话
    ///
    /// 已关闭的会话返回 [`RepoError::Duplicate`]。
    pub async fn close(&self, id: &str) -> RepoResult<Session> {
        let record = Self::parse_id(id)?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET status = 'closed' WHERE status = 'active' RETURN AFTER")
            .bind(("record", record))
            .await?;

        let closed: Option<Session> = result.take(0)?;
        match closed {
            Some(session) => Ok(session),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(RepoError::Duplicate(format!("Session {id} is already closed"))),
                None => Err(RepoError::NotFound(format!("Session {id} not found"))),
            },
        }
    }

    /// 持久化提醒开关 (只对 active 会话生效)
    pub async fn set_reminder(&self, id: &str, enabled: bool) -> RepoResult<Session> {
        let record = Self::parse_id(id)?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET reminder_enabled = $enabled WHERE status = 'active' RETURN AFTER")
            .bind(("record", record))
            .bind(("enabled", enabled))
            .await?;

        let session: Option<Session> = result.take(0)?;
        match session {
            Some(session) => Ok(session),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(RepoError::Duplicate(format!(
                    "Session {id} is already closed"
                ))),
                None => Err(RepoError::NotFound(format!("Session {id} not found"))),
            },
        }
    }

    /// 提醒已武装的 active 会话 (重启后恢复调度)
    pub async fn find_armed_active(&self) -> RepoResult<Vec<Session>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM session WHERE status = 'active' AND reminder_enabled = true")
            .await?;
        let sessions: Vec<Session> = result.take(0)?;
        Ok(sessions)
    }
}
