//! # Page Capture
//!
//! 接收一个或多个 URL，输出整页截图、元素截图或 PDF，单个文件直出或打包为 zip
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Browser）
//! - `infrastructure/` - `ScratchStore`，每个任务独占的临时目录
//! - `browser/` - `RenderSession` / `SessionLauncher` 能力，`ChromeSession` 基于 chromiumoxide 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - `Packager`，把已完成作业的文件合成 zip 或单文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个作业"的完整流程（打开页面 → 导航 → 截图 → 关闭页面）
//! - `JobCtx` - 上下文封装（task_id + job_index）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/task_runner` - 顺序执行任务中的作业，管理会话和失败策略
//! - `orchestrator/capture_service` - 执行、打包、清理
//!
//! ### ⑤ 接口层（API）
//! - `api/` - axum 路由、参数校验、错误响应

pub mod api;
pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use browser::{ChromeLauncher, RenderSession, SessionLauncher};
pub use config::{Config, FailurePolicy, SessionGranularity};
pub use error::{AppResult, CaptureError};
pub use infrastructure::ScratchStore;
pub use models::{CaptureOptions, Job, JobStatus, OutputKind, ResponseFormat, Task, Viewport};
pub use orchestrator::{CaptureService, TaskRunner};
pub use services::{CapturePackage, Packager};
