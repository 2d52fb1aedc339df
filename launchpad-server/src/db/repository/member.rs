//! Member Repository
//!
//! 成员记录用 USN 作为记录键 (`member:<usn>`)，
//! 同一个 USN 天然只能存在一条记录。

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Club, Member, MemberCreate};
use crate::db::repository::{BaseRepository, RepoError, RepoResult};
use crate::utils::time;

#[derive(Debug, Clone)]
pub struct MemberRepository {
    base: BaseRepository,
}

impl MemberRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 按 USN 查找成员
    pub async fn find_by_usn(&self, usn: &str) -> RepoResult<Option<Member>> {
        let record = RecordId::from_table_key("member", usn);
        let member: Option<Member> = self.base.db().select(record).await?;
        Ok(member)
    }

    /// 按社团查找成员，按姓名排序
    pub async fn find_by_club(&self, club: Club) -> RepoResult<Vec<Member>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM member WHERE club = $club ORDER BY name")
            .bind(("club", club))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members)
    }

    /// 批量按 USN 查找 (活动流的名字解析)
    pub async fn find_by_usns(&self, usns: Vec<String>) -> RepoResult<Vec<Member>> {
        if usns.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM member WHERE usn IN $usns")
            .bind(("usns", usns))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members)
    }

    /// 添加成员
    ///
    /// USN 已存在时返回 [`RepoError::Duplicate`]。
    pub async fn create(&self, club: Club, data: MemberCreate) -> RepoResult<Member> {
        let usn = data.usn.trim().to_string();

        if self.find_by_usn(&usn).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "A member with USN '{usn}' already exists"
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE type::thing('member', $usn) SET
                    usn = $usn,
                    name = $name,
                    email = $email,
                    phone = $phone,
                    club = $club,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("usn", usn))
            .bind(("name", data.name.trim().to_string()))
            .bind(("email", data.email.trim().to_string()))
            .bind(("phone", data.phone.trim().to_string()))
            .bind(("club", club))
            .bind(("created_at", time::now_millis()))
            .await?;

        let member: Option<Member> = result.take(0)?;
        member.ok_or_else(|| RepoError::Database("Failed to create member".to_string()))
    }

    /// 删除成员
    ///
    /// 考勤记录不级联删除，历史数据保留。
    pub async fn delete(&self, usn: &str) -> RepoResult<bool> {
        let record = RecordId::from_table_key("member", usn);

        let existing: Option<Member> = self.base.db().select(record.clone()).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Member '{usn}' not found")));
        }

        self.base
            .db()
            .query("DELETE $record")
            .bind(("record", record))
            .await?;
        Ok(true)
    }
}
