use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 默认视口宽度
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 750;
/// 默认视口高度
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1334;
/// 默认 JPEG 质量
pub const DEFAULT_QUALITY: u8 = 80;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Pdf,
}

impl OutputKind {
    /// 文件扩展名
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Jpeg => "jpeg",
            OutputKind::Png => "png",
            OutputKind::Pdf => "pdf",
        }
    }

    /// 单文件响应的 Content-Type
    pub fn content_type(self) -> &'static str {
        match self {
            OutputKind::Jpeg => "image/jpeg",
            OutputKind::Png => "image/png",
            OutputKind::Pdf => "application/pdf",
        }
    }

    /// 是否为位图格式
    pub fn is_raster(self) -> bool {
        !matches!(self, OutputKind::Pdf)
    }

    /// 是否支持 quality 参数
    pub fn supports_quality(self) -> bool {
        matches!(self, OutputKind::Jpeg)
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpeg" | "jpg" => Ok(OutputKind::Jpeg),
            "png" => Ok(OutputKind::Png),
            "pdf" => Ok(OutputKind::Pdf),
            other => Err(format!("不支持的输出格式: {}", other)),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 响应打包方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// 打包为 zip
    #[default]
    Zip,
    /// 单文件直出（仅限单个作业）
    File,
}

/// 视口尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 截图选项，一个任务内所有作业共享且只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureOptions {
    pub viewport: Viewport,
    pub selector: Option<String>,
    pub kind: OutputKind,
    quality: Option<u8>,
    pub response_format: ResponseFormat,
}

impl CaptureOptions {
    /// 构建选项；非 JPEG 格式会丢弃 quality
    pub fn new(
        viewport: Viewport,
        selector: Option<String>,
        kind: OutputKind,
        quality: Option<u8>,
        response_format: ResponseFormat,
    ) -> Self {
        let quality = if kind.supports_quality() { quality } else { None };
        Self {
            viewport,
            selector,
            kind,
            quality,
            response_format,
        }
    }

    /// 实际生效的质量参数
    pub fn quality(&self) -> Option<u8> {
        self.quality
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::new(
            Viewport::default(),
            None,
            OutputKind::Jpeg,
            Some(DEFAULT_QUALITY),
            ResponseFormat::Zip,
        )
    }
}
