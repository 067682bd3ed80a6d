//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `capture_service` - 请求级入口
//! - 执行任务、打包结果
//! - 保证返回前删除临时目录
//!
//! ### `task_runner` - 任务执行器
//! - 启动/关闭渲染引擎进程
//! - 按声明顺序逐个执行作业（Vec<Job>）
//! - 按失败策略决定终止或继续
//!
//! ## 层次关系
//!
//! ```text
//! capture_service (处理 Task，打包并清理)
//!     ↓
//! task_runner (处理 Vec<Job>，管理会话)
//!     ↓
//! workflow::CaptureFlow (处理单个 Job)
//!     ↓
//! browser (渲染会话) / infrastructure (临时目录)
//! ```

pub mod capture_service;
pub mod task_runner;

pub use capture_service::CaptureService;
pub use task_runner::TaskRunner;
