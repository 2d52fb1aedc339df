//! Repository 层 - 数据库访问
//!
//! 每张表一个 Repository，持有数据库连接句柄，
//! 把 SurrealDB 查询封装成领域操作。
//!
//! # ID 约定
//!
//! - member 记录用 USN 作为记录键: `member:<usn>`
//! - guest / attendance / session / admin 使用 SurrealDB 生成的随机键
//! - `attendance.user_id` 对成员存裸 USN，对访客存 "guest:<key>" 字符串
//! - `session.attendance_id` 存 "attendance:<key>" 字符串，
//!   读取时按需解析回 [`surrealdb::RecordId`]

pub mod admin;
pub mod attendance;
pub mod guest;
pub mod member;
pub mod session;

pub use admin::AdminRepository;
pub use attendance::AttendanceRepository;
pub use guest::GuestRepository;
pub use member::MemberRepository;
pub use session::SessionRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::AppError;

/// Repository 错误类型
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Repository 层 Result 别名
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Repository 基础结构 - 持有数据库连接
#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
