//! Launchpad Server - 社团考勤与后台管理系统
//!
//! # 架构概述
//!
//! 本模块是 Launchpad Server 的主入口，提供以下核心功能：
//!
//! - **自助签到** (`api/checkin`): 成员和访客的签到/签退终端接口
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (成员、访客、考勤、会话、管理员)
//! - **认证** (`auth`): JWT + Argon2 认证体系，按社团划分权限
//! - **统计** (`reporting`): 出勤聚合引擎 (签到数、时长、排行)
//! - **提醒** (`reminders`): 周期性签退提醒调度器
//!
//! # 模块结构
//!
//! ```text
//! launchpad-server/src/
//! ├── core/          # 配置、状态、服务器生命周期
//! ├── auth/          # JWT 认证、社团授权
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓库)
//! ├── reporting.rs   # 出勤聚合引擎
//! ├── reminders.rs   # 签退提醒调度器
//! ├── routes/        # 路由注册和中间件栈
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod reminders;
pub mod reporting;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentAdmin, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    __                           __
   / /   ____ ___  ______  _____/ /_
  / /   / __ `/ / / / __ \/ ___/ __ \
 / /___/ /_/ / /_/ / / / / /__/ / / /
/_____/\__,_/\__,_/_/ /_/\___/_/ /_/
    ____           __
   / __ \____ _____/ /
  / /_/ / __ `/ __  /
 / ____/ /_/ / /_/ /
/_/    \__,_/\__,_/
    "#
    );
}

/// 设置运行环境 (dotenv、日志)
///
/// 必须在 [`Config::from_env`] 之前调用，保证 .env 里的变量生效。
/// `LOG_DIR` 设置时日志按天滚动写文件，否则只输出到控制台。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
