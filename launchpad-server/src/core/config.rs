use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// 开发环境引导管理员的后备密码 (生产环境必须显式配置)
const DEV_BOOTSTRAP_PASSWORD: &str = "launchpad-dev-password";

/// 服务器配置 - 考勤服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/launchpad | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Asia/Kolkata | 业务时区 ("今日" 统计边界) |
/// | ATTENDANCE_BATCH_SIZE | 30 | 考勤按成员 ID 分批查询的批大小 |
/// | CHECKOUT_REMINDER_MINUTES | 120 | 签退提醒间隔 (分钟) |
/// | ENABLE_CHECKOUT_REMINDERS | true | 签退提醒全局开关 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时 (毫秒) |
/// | BOOTSTRAP_ADMIN_EMAIL | admin@sosc.club | 首次启动种子管理员邮箱 |
/// | BOOTSTRAP_ADMIN_PASSWORD | (开发后备) | 种子管理员密码，生产环境必填 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/launchpad HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区，决定 "今日签到" 的午夜边界
    pub timezone: Tz,

    // === 考勤特性配置 ===
    /// 按成员 ID 分批查询考勤记录的批大小
    pub attendance_batch_size: usize,
    /// 签退提醒间隔 (分钟)
    pub checkout_reminder_minutes: i64,
    /// 签退提醒全局开关
    pub enable_checkout_reminders: bool,
    /// 优雅关闭超时 (毫秒)
    pub shutdown_timeout_ms: u64,

    // === 首次启动种子管理员 ===
    /// 引导管理员邮箱
    pub bootstrap_admin_email: String,
    /// 引导管理员密码 (未设置时开发环境使用后备值)
    pub bootstrap_admin_password: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/launchpad".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|t| {
                    t.parse::<Tz>()
                        .map_err(|e| tracing::warn!("Invalid TIMEZONE '{}': {}", t, e))
                        .ok()
                })
                .unwrap_or(chrono_tz::Asia::Kolkata),

            attendance_batch_size: std::env::var("ATTENDANCE_BATCH_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            checkout_reminder_minutes: std::env::var("CHECKOUT_REMINDER_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(120),
            enable_checkout_reminders: std::env::var("ENABLE_CHECKOUT_REMINDERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),

            bootstrap_admin_email: std::env::var("BOOTSTRAP_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@sosc.club".into()),
            bootstrap_admin_password: std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("database")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }

    /// 引导管理员密码
    ///
    /// 生产环境必须通过 `BOOTSTRAP_ADMIN_PASSWORD` 显式配置；
    /// 其他环境回退到开发默认值并打警告。
    pub fn resolve_bootstrap_password(&self) -> Result<String, crate::utils::AppError> {
        match &self.bootstrap_admin_password {
            Some(password) => Ok(password.clone()),
            None if self.is_production() => Err(crate::utils::AppError::Internal(
                "BOOTSTRAP_ADMIN_PASSWORD must be set in production".to_string(),
            )),
            None => {
                tracing::warn!(
                    "⚠️  BOOTSTRAP_ADMIN_PASSWORD not set! Using insecure default password. DO NOT USE IN PRODUCTION!"
                );
                Ok(DEV_BOOTSTRAP_PASSWORD.to_string())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
