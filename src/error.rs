use std::path::Path;

use axum::http::StatusCode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 截图服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// 渲染引擎启动失败（整个任务失败，不会执行任何作业）
    #[error("浏览器启动失败: {source}")]
    Launch {
        #[source]
        source: BoxError,
    },

    /// 页面导航失败（超时、DNS 失败、导航未提交）
    #[error("导航到 {url} 失败: {source}")]
    Navigation {
        url: String,
        #[source]
        source: BoxError,
    },

    /// 选择器在超时时间内没有匹配到元素
    #[error("元素未找到: {selector} (等待 {timeout_secs} 秒)")]
    ElementNotFound { selector: String, timeout_secs: u64 },

    /// 截图或 PDF 写入失败
    #[error("截图失败 ({path}): {source}")]
    Capture {
        path: String,
        #[source]
        source: BoxError,
    },

    /// 临时目录创建/删除失败
    #[error("存储错误 ({path}): {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 打包失败（已完成作业的文件缺失等）
    #[error("打包失败: {message}")]
    Packaging {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// 请求参数校验失败
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),
}

// ========== 便捷构造函数 ==========

impl CaptureError {
    /// 创建浏览器启动错误
    pub fn launch_failed(source: impl Into<BoxError>) -> Self {
        CaptureError::Launch {
            source: source.into(),
        }
    }

    /// 创建导航错误
    pub fn navigation_failed(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CaptureError::Navigation {
            url: url.into(),
            source: source.into(),
        }
    }

    /// 创建截图写入错误
    pub fn capture_failed(path: &Path, source: impl Into<BoxError>) -> Self {
        CaptureError::Capture {
            path: path.display().to_string(),
            source: source.into(),
        }
    }

    /// 创建存储错误
    pub fn storage(path: &Path, source: std::io::Error) -> Self {
        CaptureError::Storage {
            path: path.display().to_string(),
            source,
        }
    }

    /// 创建打包错误
    pub fn packaging(message: impl Into<String>) -> Self {
        CaptureError::Packaging {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带底层原因的打包错误
    pub fn packaging_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CaptureError::Packaging {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建参数校验错误
    pub fn invalid(message: impl Into<String>) -> Self {
        CaptureError::InvalidRequest(message.into())
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            CaptureError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CaptureError::ElementNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CaptureError::Navigation { .. } => StatusCode::BAD_GATEWAY,
            CaptureError::Launch { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CaptureError::Capture { .. }
            | CaptureError::Storage { .. }
            | CaptureError::Packaging { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 机器可读的错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::Launch { .. } => "LAUNCH_ERROR",
            CaptureError::Navigation { .. } => "NAVIGATION_ERROR",
            CaptureError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            CaptureError::Capture { .. } => "CAPTURE_ERROR",
            CaptureError::Storage { .. } => "STORAGE_ERROR",
            CaptureError::Packaging { .. } => "PACKAGING_ERROR",
            CaptureError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl From<zip::result::ZipError> for CaptureError {
    fn from(err: zip::result::ZipError) -> Self {
        CaptureError::packaging_with("写入压缩包失败", err)
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, CaptureError>;
