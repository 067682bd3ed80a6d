//! 打包服务 - 业务能力层
//!
//! 只负责把已完成作业的输出文件合成一个响应体，不关心截图流程

use std::io::{Cursor, Write};

use tokio::fs;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppResult, CaptureError};
use crate::models::{ResponseFormat, Task};

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// 打包结果
#[derive(Debug, Clone)]
pub struct CapturePackage {
    /// 下载文件名：`<taskId>.zip` 或 `<taskId>.<扩展名>`
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// 包含的文件数量
    pub entries: usize,
}

/// 打包服务
#[derive(Debug, Clone, Copy, Default)]
pub struct Packager;

impl Packager {
    pub fn new() -> Self {
        Self
    }

    /// 打包任务中所有已完成作业的输出
    ///
    /// 单作业且要求单文件响应时原样返回文件内容，否则生成 zip
    pub async fn package(&self, task: &Task) -> AppResult<CapturePackage> {
        let extension = task.options.kind.extension();

        let mut files = Vec::new();
        for job in task.done_jobs() {
            let path = job.file().ok_or_else(|| {
                CaptureError::packaging(format!("作业 {} 已完成但没有输出文件", job.index))
            })?;
            let bytes = fs::read(path).await.map_err(|e| {
                CaptureError::packaging_with(format!("读取输出文件失败: {}", path.display()), e)
            })?;
            files.push((job.file_name(extension), bytes));
        }

        if files.is_empty() {
            return Err(CaptureError::packaging("没有可打包的输出文件"));
        }

        let single = task.options.response_format == ResponseFormat::File && task.jobs.len() == 1;
        if single {
            let (_, bytes) = files.remove(0);
            debug!("单文件响应: {} 字节", bytes.len());
            return Ok(CapturePackage {
                file_name: format!("{}.{}", task.task_id, extension),
                content_type: task.options.kind.content_type(),
                bytes,
                entries: 1,
            });
        }

        let entries = files.len();
        let bytes = tokio::task::spawn_blocking(move || build_zip(files))
            .await
            .map_err(|e| CaptureError::packaging_with("打包线程异常退出", e))??;

        info!("📦 已打包 {} 个文件，共 {} 字节", entries, bytes.len());

        Ok(CapturePackage {
            file_name: format!("{}.zip", task.task_id),
            content_type: ZIP_CONTENT_TYPE,
            bytes,
            entries,
        })
    }
}

/// 生成 zip 字节流，每个文件以自己的名字存放
fn build_zip(files: Vec<(String, Vec<u8>)>) -> AppResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in files {
        writer.start_file(name.as_str(), options)?;
        writer
            .write_all(&bytes)
            .map_err(|e| CaptureError::packaging_with(format!("写入 {} 失败", name), e))?;
    }

    Ok(writer.finish()?.into_inner())
}
