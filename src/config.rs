use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// 作业失败时的任务策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// 任一作业失败立即终止整个任务
    #[default]
    FailFast,
    /// 记录失败作业并继续执行剩余作业
    #[value(name = "continue")]
    ContinueOnError,
}

/// 渲染引擎进程的粒度
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SessionGranularity {
    /// 整个任务共享一个浏览器进程
    #[default]
    PerTask,
    /// 每个作业单独启动一个浏览器进程
    PerJob,
}

/// 程序配置
#[derive(Clone, Debug, Parser)]
#[command(name = "page_capture", version, about = "网页截图 / PDF 服务")]
pub struct Config {
    /// 监听地址
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// 监听端口
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// 是否以无头模式启动浏览器
    #[arg(long, env = "HEADLESS", default_value_t = true, action = clap::ArgAction::Set)]
    pub headless: bool,

    /// 生产环境（决定浏览器可执行文件路径和日志级别）
    #[arg(long, env = "PRODUCTION", default_value_t = false, action = clap::ArgAction::Set)]
    pub production: bool,

    /// 生产环境浏览器路径
    #[arg(long, env = "CHROME_EXECUTABLE_PROD", value_name = "PATH")]
    pub chrome_executable_prod: Option<PathBuf>,

    /// 开发环境浏览器路径
    #[arg(long, env = "CHROME_EXECUTABLE_DEV", value_name = "PATH")]
    pub chrome_executable_dev: Option<PathBuf>,

    /// 临时文件根目录
    #[arg(
        long,
        env = "SCRATCH_ROOT",
        default_value = "/tmp/app_server_side_page_capture"
    )]
    pub scratch_root: PathBuf,

    /// 页面导航 / 元素等待超时（秒）
    #[arg(long, env = "PAGE_TIMEOUT_SECS", default_value_t = 10)]
    pub page_timeout_secs: u64,

    /// 同时执行的任务数量
    #[arg(long, env = "MAX_CONCURRENT_TASKS", default_value_t = 4)]
    pub max_concurrent_tasks: usize,

    #[arg(long, env = "FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::FailFast)]
    pub failure_policy: FailurePolicy,

    #[arg(long, env = "SESSION_GRANULARITY", value_enum, default_value_t = SessionGranularity::PerTask)]
    pub session_granularity: SessionGranularity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            headless: true,
            production: false,
            chrome_executable_prod: None,
            chrome_executable_dev: None,
            scratch_root: PathBuf::from("/tmp/app_server_side_page_capture"),
            page_timeout_secs: 10,
            max_concurrent_tasks: 4,
            failure_policy: FailurePolicy::FailFast,
            session_granularity: SessionGranularity::PerTask,
        }
    }
}

impl Config {
    /// 从命令行参数和环境变量加载
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// 根据生产/开发开关选择浏览器路径，`None` 表示自动查找
    pub fn chrome_executable(&self) -> Option<&PathBuf> {
        if self.production {
            self.chrome_executable_prod.as_ref()
        } else {
            self.chrome_executable_dev.as_ref()
        }
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser() {
        let parsed = Config::try_parse_from(["page_capture"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.headless, default.headless);
        assert_eq!(parsed.scratch_root, default.scratch_root);
        assert_eq!(parsed.page_timeout_secs, 10);
        assert_eq!(parsed.failure_policy, FailurePolicy::FailFast);
        assert_eq!(parsed.session_granularity, SessionGranularity::PerTask);
    }

    #[test]
    fn test_executable_follows_production_toggle() {
        let mut config = Config {
            chrome_executable_prod: Some(PathBuf::from("/usr/bin/chromium")),
            chrome_executable_dev: Some(PathBuf::from("/opt/chrome-dev/chrome")),
            ..Config::default()
        };
        assert_eq!(
            config.chrome_executable(),
            Some(&PathBuf::from("/opt/chrome-dev/chrome"))
        );

        config.production = true;
        assert_eq!(
            config.chrome_executable(),
            Some(&PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_parse_policies() {
        let parsed = Config::try_parse_from([
            "page_capture",
            "--failure-policy",
            "continue",
            "--session-granularity",
            "per-job",
            "--headless",
            "false",
        ])
        .unwrap();
        assert_eq!(parsed.failure_policy, FailurePolicy::ContinueOnError);
        assert_eq!(parsed.session_granularity, SessionGranularity::PerJob);
        assert!(!parsed.headless);
    }
}
