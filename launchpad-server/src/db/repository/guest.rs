//! Guest Repository

use serde::Deserialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Guest, GuestRegister};
use crate::db::repository::{BaseRepository, RepoError, RepoResult};
use crate::utils::time;

#[derive(Debug, Clone)]
pub struct GuestRepository {
    base: BaseRepository,
}

impl GuestRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 登记访客
    pub async fn create(&self, data: GuestRegister) -> RepoResult<Guest> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE guest SET
                    usn = $usn,
                    full_name = $full_name,
                    phone_number = $phone_number,
                    purpose = $purpose,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("usn", data.usn.trim().to_string()))
            .bind(("full_name", data.full_name.trim().to_string()))
            .bind(("phone_number", data.phone_number.trim().to_string()))
            .bind(("purpose", data.purpose.trim().to_string()))
            .bind(("created_at", time::now_millis()))
            .await?;

        let guest: Option<Guest> = result.take(0)?;
        guest.ok_or_else(|| RepoError::Database("Failed to create guest".to_string()))
    }

    /// 全部访客，按登记时间倒序
    pub async fn find_all(&self) -> RepoResult<Vec<Guest>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM guest ORDER BY created_at DESC")
            .await?;
        let guests: Vec<Guest> = result.take(0)?;
        Ok(guests)
    }

    /// 批量按记录键查找 (活动流的名字解析)
    ///
    /// 键形如 "guest:xyz"，解析失败的键直接忽略。
    pub async fn find_by_keys(&self, keys: Vec<String>) -> RepoResult<Vec<Guest>> {
        let ids: Vec<RecordId> = keys.iter().filter_map(|k| k.parse().ok()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM guest WHERE id IN $ids")
            .bind(("ids", ids))
            .await?;
        let guests: Vec<Guest> = result.take(0)?;
        Ok(guests)
    }

    /// 访客总数
    pub async fn count(&self) -> RepoResult<i64> {
        #[derive(Deserialize)]
        struct CountRow {
            count: i64,
        }

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM guest GROUP ALL")
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }
}
