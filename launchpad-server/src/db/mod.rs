//! 数据库服务 - 嵌入式 SurrealDB (RocksDB 引擎)
//!
//! 单文件数据库存放在 `WORK_DIR/database/launchpad.db`，
//! 命名空间和数据库名都是 `launchpad`。
//! schema 在启动时幂等地定义 (IF NOT EXISTS)。

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::core::Config;
use crate::db::models::{AdminCreate, Club};
use crate::db::repository::AdminRepository;
use crate::utils::AppError;

/// 启动时定义的表结构和索引
///
/// - `attendance.user_id` / `attendance.check_in`: 统计聚合的查询路径
/// - `admin.email`: 唯一索引，登录查询路径
const SCHEMA: &[&str] = &[
    // People
    "DEFINE TABLE IF NOT EXISTS member SCHEMAFULL",
    "DEFINE FIELD IF NOT EXISTS usn ON member TYPE string",
    "DEFINE FIELD IF NOT EXISTS name ON member TYPE string",
    "DEFINE FIELD IF NOT EXISTS email ON member TYPE string",
    "DEFINE FIELD IF NOT EXISTS phone ON member TYPE string",
    "DEFINE FIELD IF NOT EXISTS club ON member TYPE string",
    "DEFINE FIELD IF NOT EXISTS created_at ON member TYPE int",
    "DEFINE INDEX IF NOT EXISTS member_club ON member FIELDS club",
    "DEFINE TABLE IF NOT EXISTS guest SCHEMAFULL",
    "DEFINE FIELD IF NOT EXISTS usn ON guest TYPE string",
    "DEFINE FIELD IF NOT EXISTS full_name ON guest TYPE string",
    "DEFINE FIELD IF NOT EXISTS phone_number ON guest TYPE string",
    "DEFINE FIELD IF NOT EXISTS purpose ON guest TYPE string",
    "DEFINE FIELD IF NOT EXISTS created_at ON guest TYPE int",
    // Attendance
    "DEFINE TABLE IF NOT EXISTS attendance SCHEMAFULL",
    "DEFINE FIELD IF NOT EXISTS user_id ON attendance TYPE string",
    "DEFINE FIELD IF NOT EXISTS kind ON attendance TYPE string",
    "DEFINE FIELD IF NOT EXISTS check_in ON attendance TYPE int",
    "DEFINE FIELD IF NOT EXISTS check_out ON attendance TYPE option<int>",
    "DEFINE INDEX IF NOT EXISTS attendance_user ON attendance FIELDS user_id",
    "DEFINE INDEX IF NOT EXISTS attendance_check_in ON attendance FIELDS check_in",
    // Sessions
    "DEFINE TABLE IF NOT EXISTS session SCHEMAFULL",
    "DEFINE FIELD IF NOT EXISTS attendance_id ON session TYPE string",
    "DEFINE FIELD IF NOT EXISTS user_id ON session TYPE string",
    "DEFINE FIELD IF NOT EXISTS kind ON session TYPE string",
    "DEFINE FIELD IF NOT EXISTS display_name ON session TYPE option<string>",
    "DEFINE FIELD IF NOT EXISTS check_in ON session TYPE int",
    "DEFINE FIELD IF NOT EXISTS status ON session TYPE string",
    "DEFINE FIELD IF NOT EXISTS reminder_enabled ON session TYPE bool",
    "DEFINE FIELD IF NOT EXISTS created_at ON session TYPE int",
    "DEFINE INDEX IF NOT EXISTS session_user ON session FIELDS user_id",
    // Auth
    "DEFINE TABLE IF NOT EXISTS admin SCHEMAFULL",
    "DEFINE FIELD IF NOT EXISTS email ON admin TYPE string",
    "DEFINE FIELD IF NOT EXISTS name ON admin TYPE string",
    "DEFINE FIELD IF NOT EXISTS club ON admin TYPE string",
    "DEFINE FIELD IF NOT EXISTS hash_pass ON admin TYPE string",
    "DEFINE FIELD IF NOT EXISTS created_at ON admin TYPE int",
    "DEFINE INDEX IF NOT EXISTS admin_email ON admin FIELDS email UNIQUE",
];

/// 数据库服务
#[derive(Debug, Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// 打开 (或创建) 数据库并定义 schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        db.use_ns("launchpad")
            .use_db("launchpad")
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        Self::define_schema(&db).await?;
        tracing::info!(path = %db_path, "Database ready (embedded SurrealDB, RocksDB engine)");

        Ok(Self { db })
    }

    async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        for stmt in SCHEMA {
            db.query(*stmt)
                .await
                .and_then(|response| response.check())
                .map_err(|e| {
                    AppError::Database(format!("Schema definition failed ({stmt}): {e}"))
                })?;
        }
        tracing::debug!("Database schema defined ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// 播种引导管理员
    ///
    /// admin 表为空时创建一个 SOSC 管理员，否则什么都不做。
    pub async fn bootstrap_admin(&self, config: &Config) -> Result<(), AppError> {
        let repo = AdminRepository::new(self.db.clone());
        if repo.find_any().await?.is_some() {
            return Ok(());
        }

        let password = config.resolve_bootstrap_password()?;
        let admin = repo
            .create(AdminCreate {
                email: config.bootstrap_admin_email.clone(),
                name: "Launchpad Admin".to_string(),
                club: Club::Sosc,
                password,
            })
            .await?;

        tracing::info!(email = %admin.email, club = %admin.club, "Seeded bootstrap admin account");
        Ok(())
    }
}
