//! 临时目录 - 基础设施层
//!
//! 每个任务在根目录下拥有一个以任务 ID 命名的独立目录，只暴露分配、路径解析、释放三个能力

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppResult, CaptureError};

/// 任务临时目录
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 任务目录路径
    pub fn task_dir(&self, task_id: &str) -> PathBuf {
        self.root.join(task_id)
    }

    /// 创建任务目录（已存在时不报错）
    pub async fn allocate(&self, task_id: &str) -> AppResult<PathBuf> {
        let dir = self.task_dir(task_id);
        info!("📁 创建临时目录: {}", dir.display());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CaptureError::storage(&dir, e))?;
        Ok(dir)
    }

    /// 任务目录下指定文件的绝对路径，不做任何 I/O
    pub fn resolve(&self, task_id: &str, name: &str) -> PathBuf {
        self.task_dir(task_id).join(name)
    }

    /// 递归删除任务目录；目录不存在时视为成功
    pub async fn release(&self, task_id: &str) -> AppResult<()> {
        let dir = self.task_dir(task_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("🗑️ 已清理临时目录: {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("临时目录不存在，跳过清理: {}", dir.display());
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ 清理临时目录失败 {}: {}", dir.display(), e);
                Err(CaptureError::storage(&dir, e))
            }
        }
    }
}
