//! 截图服务 - 编排层入口
//!
//! 执行任务 → 打包 → 清理临时目录。无论成功失败，返回前临时目录都已删除。

use tracing::{info, warn};

use crate::browser::SessionLauncher;
use crate::error::AppResult;
use crate::models::Task;
use crate::orchestrator::task_runner::TaskRunner;
use crate::services::{CapturePackage, Packager};

/// 截图服务
pub struct CaptureService<L> {
    runner: TaskRunner<L>,
    packager: Packager,
}

impl<L: SessionLauncher> CaptureService<L> {
    pub fn new(runner: TaskRunner<L>) -> Self {
        Self {
            runner,
            packager: Packager::new(),
        }
    }

    pub fn runner(&self) -> &TaskRunner<L> {
        &self.runner
    }

    /// 执行任务并返回打包结果
    ///
    /// 快速失败策略下任务整体成功或整体失败，任一错误都不会返回部分结果
    pub async fn execute(&self, mut task: Task) -> AppResult<CapturePackage> {
        let result = self.run_and_package(&mut task).await;

        if let Err(e) = self.runner.store().release(&task.task_id).await {
            warn!("[任务 {}] ⚠️ 清理临时目录失败: {}", task.task_id, e);
        }

        if let Ok(package) = &result {
            info!(
                "[任务 {}] ✅ 已生成 {} ({} 字节)",
                task.task_id,
                package.file_name,
                package.bytes.len()
            );
        }

        result
    }

    async fn run_and_package(&self, task: &mut Task) -> AppResult<CapturePackage> {
        self.runner.run(task).await?;
        self.packager.package(task).await
    }
}
