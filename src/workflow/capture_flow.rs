//! 单个作业的截图流程 - 流程层
//!
//! 流程顺序：
//! 1. 打开页面
//! 2. 导航到作业 URL
//! 3. 根据选项选择截图策略（元素 / 整页 / PDF）
//! 4. 关闭页面（无论成功失败）

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::browser::RenderSession;
use crate::error::AppResult;
use crate::infrastructure::ScratchStore;
use crate::models::{CaptureOptions, Job};
use crate::utils::logging::truncate_text;
use crate::workflow::job_ctx::JobCtx;

/// 作业截图流程
///
/// - 不持有浏览器，只借用会话
/// - 负责作业状态的唯一一次终结
/// - 不做重试
pub struct CaptureFlow {
    store: ScratchStore,
}

impl CaptureFlow {
    pub fn new(store: ScratchStore) -> Self {
        Self { store }
    }

    /// 执行一个作业，成功时作业标记为 done 并记录输出文件
    pub async fn run<S: RenderSession>(
        &self,
        session: &S,
        job: &mut Job,
        options: &CaptureOptions,
        ctx: &JobCtx,
    ) -> AppResult<PathBuf> {
        job.begin();
        info!("{} 📸 开始截图: {}", ctx, truncate_text(&job.url, 80));

        let dest = self
            .store
            .resolve(&ctx.task_id, &job.file_name(options.kind.extension()));

        let page = match session.open_page().await {
            Ok(page) => page,
            Err(e) => {
                error!("{} ❌ 打开页面失败: {}", ctx, e);
                job.fail(&e);
                return Err(e);
            }
        };

        let result = self.capture(session, &page, &job.url, &dest, options).await;

        if let Err(e) = session.close_page(page).await {
            warn!("{} ⚠️ 关闭页面失败: {}", ctx, e);
        }

        match result {
            Ok(()) => {
                info!("{} ✓ 截图完成: {}", ctx, dest.display());
                job.complete(dest.clone());
                Ok(dest)
            }
            Err(e) => {
                error!("{} ❌ 截图失败: {}", ctx, e);
                job.fail(&e);
                Err(e)
            }
        }
    }

    async fn capture<S: RenderSession>(
        &self,
        session: &S,
        page: &S::Page,
        url: &str,
        dest: &Path,
        options: &CaptureOptions,
    ) -> AppResult<()> {
        session.navigate(page, url).await?;

        match options.selector.as_deref() {
            Some(selector) => {
                session
                    .capture_element(page, selector, dest, options.kind, options.quality())
                    .await
            }
            None => {
                session
                    .capture_full(page, dest, options.kind, options.quality())
                    .await
            }
        }
    }
}
