//! Admin Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Admin, AdminCreate};
use crate::db::repository::{BaseRepository, RepoError, RepoResult};
use crate::utils::time;

#[derive(Debug, Clone)]
pub struct AdminRepository {
    base: BaseRepository,
}

impl AdminRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 按邮箱查找 (登录路径，邮箱有唯一索引)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Admin>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM admin WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let admin: Option<Admin> = result.take(0)?;
        Ok(admin)
    }

    /// 按记录 ID 查找 ("admin:xyz")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Admin>> {
        let record: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid admin id: {id}")))?;
        let admin: Option<Admin> = self.base.db().select(record).await?;
        Ok(admin)
    }

    /// 任意一条管理员记录 (引导种子检查)
    pub async fn find_any(&self) -> RepoResult<Option<Admin>> {
        let mut result = self.base.db().query("SELECT * FROM admin LIMIT 1").await?;
        let admin: Option<Admin> = result.take(0)?;
        Ok(admin)
    }

    /// 创建管理员账号
    ///
    /// 邮箱已存在时返回 [`RepoError::Duplicate`]，密码用 Argon2 散列后存储。
    pub async fn create(&self, data: AdminCreate) -> RepoResult<Admin> {
        let email = data.email.trim().to_string();

        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "An admin with email '{email}' already exists"
            )));
        }

        let hash_pass = Admin::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE admin SET
                    email = $email,
                    name = $name,
                    club = $club,
                    hash_pass = $hash_pass,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("email", email))
            .bind(("name", data.name.trim().to_string()))
            .bind(("club", data.club))
            .bind(("hash_pass", hash_pass))
            .bind(("created_at", time::now_millis()))
            .await?;

        let admin: Option<Admin> = result.take(0)?;
        admin.ok_or_else(|| RepoError::Database("Failed to create admin".to_string()))
    }

    /// 修改显示名
    pub async fn update_name(&self, id: &str, name: String) -> RepoResult<Admin> {
        let record: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid admin id: {id}")))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET name = $name RETURN AFTER")
            .bind(("record", record))
            .bind(("name", name))
            .await?;

        let admin: Option<Admin> = result.take(0)?;
        admin.ok_or_else(|| RepoError::NotFound(format!("Admin {id} not found")))
    }

    /// 更新密码散列
    pub async fn update_password(&self, id: &str, hash_pass: String) -> RepoResult<Admin> {
        let record: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid admin id: {id}")))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET hash_pass = $hash_pass RETURN AFTER")
            .bind(("record", record))
            .bind(("hash_pass", hash_pass))
            .await?;

        let admin: Option<Admin> = result.take(0)?;
        admin.ok_or_else(|| RepoError::NotFound(format!("Admin {id} not found")))
    }
}
