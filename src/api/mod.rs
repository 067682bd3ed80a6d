//! HTTP 接口层
//!
//! 只做参数校验和响应转换，任务执行全部委托给编排层

pub mod capture;
pub mod error;
pub mod extract;
pub mod request;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

use crate::browser::SessionLauncher;
use crate::error::{AppResult, CaptureError};
use crate::models::Task;
use crate::orchestrator::CaptureService;
use crate::services::CapturePackage;

/// 所有请求共享的状态
pub struct AppState<L> {
    service: Arc<CaptureService<L>>,
    limiter: Arc<Semaphore>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<L: SessionLauncher> AppState<L> {
    pub fn new(service: CaptureService<L>, max_concurrent_tasks: usize) -> Self {
        Self {
            service: Arc::new(service),
            limiter: Arc::new(Semaphore::new(max_concurrent_tasks.max(1))),
        }
    }

    /// 在并发上限内执行任务
    pub async fn execute(&self, task: Task) -> AppResult<CapturePackage> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(CaptureError::launch_failed)?;
        self.service.execute(task).await
    }
}

/// 构建路由
pub fn router<L: SessionLauncher + 'static>(state: AppState<L>) -> Router {
    Router::new()
        .route("/ping", get(capture::ping))
        .route("/capture", post(capture::capture::<L>))
        .route("/capture-one", get(capture::capture_one::<L>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
