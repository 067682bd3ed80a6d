//! 任务执行器 - 编排层
//!
//! ## 职责
//!
//! 1. **会话管理**：按粒度策略启动/关闭渲染引擎进程
//! 2. **目录分配**：为任务创建临时目录
//! 3. **顺序执行**：按声明顺序逐个执行作业，同一时刻只有一个页面
//! 4. **失败处理**：按失败策略终止或继续，出错时清理临时目录
//!
//! 不做重试，失败的作业不会被重新执行。

use tracing::{error, info, warn};

use crate::browser::{RenderSession, SessionLauncher};
use crate::config::{Config, FailurePolicy, SessionGranularity};
use crate::error::{AppResult, CaptureError};
use crate::infrastructure::ScratchStore;
use crate::models::{CaptureOptions, Job, Task};
use crate::utils::logging::{log_task_complete, log_task_start};
use crate::workflow::{CaptureFlow, JobCtx};

/// 任务执行器
pub struct TaskRunner<L> {
    launcher: L,
    store: ScratchStore,
    flow: CaptureFlow,
    failure_policy: FailurePolicy,
    granularity: SessionGranularity,
}

impl<L: SessionLauncher> TaskRunner<L> {
    pub fn new(
        launcher: L,
        store: ScratchStore,
        failure_policy: FailurePolicy,
        granularity: SessionGranularity,
    ) -> Self {
        Self {
            flow: CaptureFlow::new(store.clone()),
            launcher,
            store,
            failure_policy,
            granularity,
        }
    }

    pub fn from_config(launcher: L, config: &Config) -> Self {
        Self::new(
            launcher,
            ScratchStore::new(&config.scratch_root),
            config.failure_policy,
            config.session_granularity,
        )
    }

    pub fn store(&self) -> &ScratchStore {
        &self.store
    }

    /// 执行任务
    ///
    /// 成功返回时作业输出保留在临时目录中等待打包；
    /// 失败返回前会关闭会话并删除临时目录
    pub async fn run(&self, task: &mut Task) -> AppResult<()> {
        log_task_start(task);

        let result = match self.granularity {
            SessionGranularity::PerTask => self.run_shared_session(task).await,
            SessionGranularity::PerJob => self.run_session_per_job(task).await,
        };

        if let Err(e) = &result {
            error!("[任务 {}] ❌ 任务失败: {}", task.task_id, e);
            if let Err(release_err) = self.store.release(&task.task_id).await {
                warn!(
                    "[任务 {}] ⚠️ 清理临时目录失败: {}",
                    task.task_id, release_err
                );
            }
        }

        log_task_complete(task);
        result
    }

    /// 所有作业共享一个浏览器进程
    async fn run_shared_session(&self, task: &mut Task) -> AppResult<()> {
        let Task {
            task_id,
            jobs,
            options,
            ..
        } = task;

        let mut session = self.launcher.launch(options).await?;

        let result = match self.store.allocate(task_id).await {
            Ok(_) => self.run_jobs(&session, task_id, jobs, options).await,
            Err(e) => Err(e),
        };

        close_session(&mut session, task_id).await;
        result
    }

    /// 每个作业单独启动浏览器进程
    async fn run_session_per_job(&self, task: &mut Task) -> AppResult<()> {
        let Task {
            task_id,
            jobs,
            options,
            ..
        } = task;

        self.store.allocate(task_id).await?;

        let total = jobs.len();
        let mut outcome = Outcome::default();
        for job in jobs.iter_mut() {
            let ctx = JobCtx::new(task_id.as_str(), job.index, total);
            let mut session = self.launcher.launch(options).await?;
            let result = self.flow.run(&session, job, options, &ctx).await;
            close_session(&mut session, task_id).await;
            outcome.record(result.map(|_| ()), self.failure_policy)?;
        }
        outcome.finish()
    }

    async fn run_jobs<S: RenderSession>(
        &self,
        session: &S,
        task_id: &str,
        jobs: &mut [Job],
        options: &CaptureOptions,
    ) -> AppResult<()> {
        let total = jobs.len();
        let mut outcome = Outcome::default();
        for job in jobs.iter_mut() {
            let ctx = JobCtx::new(task_id, job.index, total);
            let result = self.flow.run(session, job, options, &ctx).await;
            outcome.record(result.map(|_| ()), self.failure_policy)?;
        }
        outcome.finish()
    }
}

async fn close_session<S: RenderSession>(session: &mut S, task_id: &str) {
    match session.close().await {
        Ok(()) => info!("[任务 {}] 浏览器已关闭", task_id),
        Err(e) => warn!("[任务 {}] ⚠️ 关闭浏览器失败: {}", task_id, e),
    }
}

/// 作业结果汇总
#[derive(Debug, Default)]
struct Outcome {
    succeeded: usize,
    first_error: Option<CaptureError>,
}

impl Outcome {
    /// 记录一个作业结果；快速失败策略下直接返回错误以终止任务
    fn record(&mut self, result: AppResult<()>, policy: FailurePolicy) -> AppResult<()> {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => match policy {
                FailurePolicy::FailFast => return Err(e),
                FailurePolicy::ContinueOnError => {
                    if self.first_error.is_none() {
                        self.first_error = Some(e);
                    }
                }
            },
        }
        Ok(())
    }

    /// 全部作业失败时返回第一个错误
    fn finish(self) -> AppResult<()> {
        match (self.succeeded, self.first_error) {
            (0, Some(e)) => Err(e),
            _ => Ok(()),
        }
    }
}
