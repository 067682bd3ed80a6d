/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use chrono::Local;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::{JobStatus, Task};

/// 初始化日志
///
/// 生产环境默认 `info`，开发环境默认 `debug`，`RUST_LOG` 优先
pub fn init(production: bool) {
    let default_filter = if production {
        "info,tower_http=info"
    } else {
        "debug,tower_http=debug,chromiumoxide=info"
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 截图服务启动 - {}", if config.production { "生产环境" } else { "开发环境" });
    info!("🌐 监听地址: {}", config.bind_addr());
    info!("🖥️ 无头模式: {}", config.headless);
    info!("📁 临时目录: {}", config.scratch_root.display());
    info!("📊 最大并发任务数: {}", config.max_concurrent_tasks);
    info!("{}", "=".repeat(60));
}

/// 记录任务开始信息
pub fn log_task_start(task: &Task) {
    info!("\n{}", "─".repeat(60));
    info!("[任务 {}] 开始处理", task.task_id);
    info!("[任务 {}] 作业总数: {}", task.task_id, task.jobs.len());
    info!(
        "[任务 {}] 格式: {} | 视口: {} | 选择器: {}",
        task.task_id,
        task.options.kind,
        task.options.viewport,
        task.options.selector.as_deref().unwrap_or("-")
    );
}

/// 记录任务完成信息
pub fn log_task_complete(task: &Task) {
    let elapsed = Local::now() - task.created_at;
    info!(
        "[任务 {}] 作业统计: 成功 {}, 失败 {}, 总计 {}",
        task.task_id,
        task.count(JobStatus::Done),
        task.count(JobStatus::Error),
        task.jobs.len()
    );
    info!(
        "[任务 {}] 耗时: {:.1} 秒",
        task.task_id,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
