//! 任务与作业
//!
//! 一个任务对应一次请求，包含按声明顺序排列的作业列表和共享的截图选项。

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::models::options::CaptureOptions;

/// 作业状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Capturing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// 单个 URL 的截图作业
#[derive(Debug, Clone)]
pub struct Job {
    pub url: String,
    /// 在任务中的位置（从 0 开始，创建后不再改变）
    pub index: usize,
    name: Option<String>,
    status: JobStatus,
    file: Option<PathBuf>,
    error: Option<String>,
}

impl Job {
    pub fn new(url: impl Into<String>, index: usize, name: Option<String>) -> Self {
        Self {
            url: url.into(),
            index,
            name,
            status: JobStatus::Pending,
            file: None,
            error: None,
        }
    }

    /// 输出名称，未指定时使用索引
    pub fn output_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.index.to_string())
    }

    /// 输出文件名（含扩展名）
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.output_name(), extension)
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// pending → capturing
    pub fn begin(&mut self) {
        debug_assert_eq!(self.status, JobStatus::Pending, "作业只能执行一次");
        self.status = JobStatus::Capturing;
    }

    /// capturing → done
    pub fn complete(&mut self, file: PathBuf) {
        debug_assert!(!self.status.is_terminal(), "作业状态只能终结一次");
        self.status = JobStatus::Done;
        self.file = Some(file);
    }

    /// capturing → error
    pub fn fail(&mut self, error: impl fmt::Display) {
        debug_assert!(!self.status.is_terminal(), "作业状态只能终结一次");
        self.status = JobStatus::Error;
        self.error = Some(error.to_string());
    }
}

/// 截图任务
#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: String,
    pub jobs: Vec<Job>,
    pub options: CaptureOptions,
    pub created_at: DateTime<Local>,
}

impl Task {
    /// 使用新生成的任务 ID 创建任务
    pub fn new(jobs: Vec<(String, Option<String>)>, options: CaptureOptions) -> Self {
        Self::with_id(generate_task_id(), jobs, options)
    }

    /// 使用指定的任务 ID 创建任务，作业索引按声明顺序分配
    pub fn with_id(
        task_id: impl Into<String>,
        jobs: Vec<(String, Option<String>)>,
        options: CaptureOptions,
    ) -> Self {
        let jobs = jobs
            .into_iter()
            .enumerate()
            .map(|(index, (url, name))| Job::new(url, index, name))
            .collect();

        Self {
            task_id: task_id.into(),
            jobs,
            options,
            created_at: Local::now(),
        }
    }

    /// 所有作业是否都已成功
    pub fn all_done(&self) -> bool {
        self.jobs.iter().all(|job| job.status() == JobStatus::Done)
    }

    /// 已成功的作业
    pub fn done_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs
            .iter()
            .filter(|job| job.status() == JobStatus::Done)
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status() == status).count()
    }
}

/// 生成任务 ID
pub fn generate_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<(String, Option<String>)> {
        (0..n)
            .map(|i| (format!("https://example.com/{}", i), None))
            .collect()
    }

    #[test]
    fn test_indices_follow_declaration_order() {
        let task = Task::new(urls(3), CaptureOptions::default());
        let indices: Vec<usize> = task.jobs.iter().map(|j| j.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(task.jobs[2].url, "https://example.com/2");
    }

    #[test]
    fn test_output_name_falls_back_to_index() {
        let job = Job::new("https://example.com", 4, None);
        assert_eq!(job.file_name("png"), "4.png");

        let named = Job::new("https://example.com", 4, Some("home".into()));
        assert_eq!(named.file_name("png"), "home.png");
    }

    #[test]
    fn test_status_transitions() {
        let mut job = Job::new("https://example.com", 0, None);
        assert_eq!(job.status(), JobStatus::Pending);
        job.begin();
        assert_eq!(job.status(), JobStatus::Capturing);
        job.complete(PathBuf::from("/tmp/x/0.jpeg"));
        assert_eq!(job.status(), JobStatus::Done);
        assert!(job.file().is_some());
        assert!(job.error().is_none());

        let mut failed = Job::new("https://example.com", 1, None);
        failed.begin();
        failed.fail("boom");
        assert_eq!(failed.status(), JobStatus::Error);
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.file().is_none());
    }

    #[test]
    fn test_task_ids_are_unique() {
        assert_ne!(generate_task_id(), generate_task_id());
    }
}
