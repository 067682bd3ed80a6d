//! 作业处理上下文
//!
//! 封装"我正在处理哪个任务的第几个作业"这一信息

use std::fmt::Display;

/// 作业处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 任务ID
    pub task_id: String,

    /// 作业索引（从0开始）
    pub job_index: usize,

    /// 任务中的作业总数（仅用于日志显示）
    pub total: usize,
}

impl JobCtx {
    pub fn new(task_id: impl Into<String>, job_index: usize, total: usize) -> Self {
        Self {
            task_id: task_id.into(),
            job_index,
            total,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} 作业 {}/{}]",
            self.task_id,
            self.job_index + 1,
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        let ctx = JobCtx::new("abc", 0, 3);
        assert_eq!(ctx.to_string(), "[任务 abc 作业 1/3]");
    }
}
