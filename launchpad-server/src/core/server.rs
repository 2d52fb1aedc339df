use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::routes;

/// HTTP 服务器
///
/// 负责绑定端口、挂载路由、启动后台任务和优雅关闭。
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// 使用已初始化的状态创建服务器 (测试和嵌入场景)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 运行服务器，阻塞直到收到关闭信号
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(state) => state.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        // 后台任务随服务器一起停止
        let shutdown = CancellationToken::new();
        state.start_background_tasks(shutdown.clone());

        let app = routes::build_app(&state).with_state(state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("🚀 Launchpad server listening on {}", addr);
        tracing::info!(
            environment = %self.config.environment,
            timezone = %self.config.timezone,
            "Server configuration loaded"
        );

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        let shutdown_timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, draining connections...");
            shutdown.cancel();
            shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
        });

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Internal(e.into()))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
