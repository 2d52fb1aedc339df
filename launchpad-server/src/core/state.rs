use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::reminders::{ReminderRegistry, ReminderScheduler};

/// 服务器状态 - 在各个处理器之间共享
///
/// 包含数据库连接、JWT 服务和签退提醒注册表。
/// 克隆成本低 (内部都是句柄 / Arc)。
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式 SurrealDB 连接
    pub db: Surreal<Db>,
    /// JWT 令牌服务
    pub jwt_service: Arc<JwtService>,
    /// 签退提醒注册表 (调度器与处理器共享)
    pub reminders: Arc<ReminderRegistry>,
}

impl ServerState {
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        reminders: Arc<ReminderRegistry>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            reminders,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建工作目录、打开数据库、定义 schema、
    /// 播种引导管理员并构建 JWT 服务。
    ///
    /// # Panics
    ///
    /// 任何初始化步骤失败时 panic (服务无法在坏状态下启动)
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("launchpad.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        db_service
            .bootstrap_admin(config)
            .await
            .expect("Failed to seed bootstrap admin");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let reminders = Arc::new(ReminderRegistry::new(config.checkout_reminder_minutes));

        Self::new(config.clone(), db_service.db, jwt_service, reminders)
    }

    /// 启动后台任务
    ///
    /// 目前只有签退提醒调度器；被全局开关关闭时不启动。
    pub fn start_background_tasks(&self, shutdown: CancellationToken) {
        if self.config.enable_checkout_reminders {
            let scheduler = ReminderScheduler::new(self.clone(), shutdown);
            tokio::spawn(scheduler.run());
        } else {
            tracing::info!("Checkout reminders disabled by configuration");
        }
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 工作目录路径
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
