use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, AppState};
use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::orchestrator::{CaptureService, TaskRunner};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    listener: TcpListener,
    state: AppState<ChromeLauncher>,
}

impl App {
    /// 初始化应用：创建临时根目录、绑定端口
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        tokio::fs::create_dir_all(&config.scratch_root)
            .await
            .with_context(|| format!("无法创建临时目录: {}", config.scratch_root.display()))?;

        let launcher = ChromeLauncher::from_config(&config);
        let runner = TaskRunner::from_config(launcher, &config);
        let state = AppState::new(CaptureService::new(runner), config.max_concurrent_tasks);

        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("无法监听地址: {}", addr))?;

        Ok(Self {
            config,
            listener,
            state,
        })
    }

    /// 运行 HTTP 服务直到收到退出信号
    pub async fn run(self) -> Result<()> {
        let local_addr = self.listener.local_addr()?;
        info!("✅ 服务已启动: http://{}", local_addr);

        axum::serve(self.listener, api::router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("服务已停止 (端口 {})", self.config.port);
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到退出信号，正在停止服务...");
    }
}
