//! 请求参数与校验
//!
//! 校验全部在进入编排层之前完成：URL 格式、数量上限、格式枚举、选择器与 PDF 互斥、作业名称

use std::collections::HashSet;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::{AppResult, CaptureError};
use crate::models::options::{DEFAULT_QUALITY, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::models::{CaptureOptions, OutputKind, ResponseFormat, Task, Viewport};

/// 单次请求最多的 URL 数量
pub const MAX_URLS: usize = 100;

/// URL 列表中的一项：纯 URL 或带输出名称的对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlEntry {
    Plain(String),
    Named { url: String, name: Option<String> },
}

impl UrlEntry {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            UrlEntry::Plain(url) => (url, None),
            UrlEntry::Named { url, name } => (url, name),
        }
    }
}

/// `POST /capture` 请求体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureBody {
    pub urls: Vec<UrlEntry>,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub viewport_size: Option<String>,
    pub selector: Option<String>,
    pub image_format: Option<OutputKind>,
    pub quality: Option<u32>,
    pub response_format: Option<ResponseFormat>,
}

/// `GET /capture-one` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOneQuery {
    pub url: String,
    pub name: Option<String>,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub viewport_size: Option<String>,
    pub selector: Option<String>,
    pub image_format: Option<OutputKind>,
    pub quality: Option<u32>,
}

/// 两种请求共享的选项参数
#[derive(Debug, Clone, Default)]
struct OptionParams {
    viewport_width: Option<u32>,
    viewport_height: Option<u32>,
    viewport_size: Option<String>,
    selector: Option<String>,
    image_format: Option<OutputKind>,
    quality: Option<u32>,
    response_format: Option<ResponseFormat>,
}

impl CaptureBody {
    /// 校验并构建任务
    pub fn into_task(self) -> AppResult<Task> {
        let entries = self.urls.into_iter().map(UrlEntry::into_parts).collect();
        let params = OptionParams {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            viewport_size: self.viewport_size,
            selector: self.selector,
            image_format: self.image_format,
            quality: self.quality,
            response_format: self.response_format,
        };
        build_task(entries, params)
    }
}

impl CaptureOneQuery {
    /// 校验并构建单作业、单文件响应的任务
    pub fn into_task(self) -> AppResult<Task> {
        let params = OptionParams {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            viewport_size: self.viewport_size,
            selector: self.selector,
            image_format: self.image_format,
            quality: self.quality,
            response_format: Some(ResponseFormat::File),
        };
        build_task(vec![(self.url, self.name)], params)
    }
}

fn build_task(entries: Vec<(String, Option<String>)>, params: OptionParams) -> AppResult<Task> {
    if entries.is_empty() {
        return Err(CaptureError::invalid("urls 不能为空"));
    }
    if entries.len() > MAX_URLS {
        return Err(CaptureError::invalid(format!(
            "urls 最多 {} 个，实际 {} 个",
            MAX_URLS,
            entries.len()
        )));
    }

    let options = build_options(&params, entries.len())?;

    let mut seen = HashSet::new();
    for (index, (url, name)) in entries.iter().enumerate() {
        validate_url(url)?;
        if let Some(name) = name {
            validate_name(name)?;
        }
        let output_name = name.clone().unwrap_or_else(|| index.to_string());
        if !seen.insert(output_name.clone()) {
            return Err(CaptureError::invalid(format!("输出名称重复: {}", output_name)));
        }
    }

    Ok(Task::new(entries, options))
}

fn build_options(params: &OptionParams, job_count: usize) -> AppResult<CaptureOptions> {
    let viewport = parse_viewport(params)?;
    let kind = params.image_format.unwrap_or_default();

    let selector = params
        .selector
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if kind == OutputKind::Pdf && selector.is_some() {
        return Err(CaptureError::invalid("PDF 格式不支持 selector"));
    }

    let quality = match params.quality {
        Some(q) if q > 100 => {
            return Err(CaptureError::invalid(format!("quality 必须在 0-100 之间: {}", q)))
        }
        Some(q) => q as u8,
        None => DEFAULT_QUALITY,
    };

    let response_format = params.response_format.unwrap_or_default();
    if response_format == ResponseFormat::File && job_count != 1 {
        return Err(CaptureError::invalid("单文件响应只支持一个 URL"));
    }

    Ok(CaptureOptions::new(
        viewport,
        selector,
        kind,
        Some(quality),
        response_format,
    ))
}

/// 解析视口，`viewportWidth`/`viewportHeight` 优先于 `viewportSize`
fn parse_viewport(params: &OptionParams) -> AppResult<Viewport> {
    let (mut width, mut height) = (DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT);

    if let Some(size) = params.viewport_size.as_deref() {
        let re = Regex::new(r"^([0-9]+)x([0-9]+)$")
            .map_err(|e| CaptureError::invalid(e.to_string()))?;
        let caps = re
            .captures(size)
            .ok_or_else(|| CaptureError::invalid(format!("viewportSize 格式应为 宽x高: {}", size)))?;
        width = caps[1]
            .parse()
            .map_err(|_| CaptureError::invalid(format!("viewportSize 宽度无效: {}", size)))?;
        height = caps[2]
            .parse()
            .map_err(|_| CaptureError::invalid(format!("viewportSize 高度无效: {}", size)))?;
    }

    let viewport = Viewport {
        width: params.viewport_width.unwrap_or(width),
        height: params.viewport_height.unwrap_or(height),
    };

    if viewport.width == 0 || viewport.height == 0 {
        return Err(CaptureError::invalid(format!("视口尺寸无效: {}", viewport)));
    }
    Ok(viewport)
}

fn validate_url(raw: &str) -> AppResult<()> {
    let url = Url::parse(raw).map_err(|e| CaptureError::invalid(format!("URL 无效 {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CaptureError::invalid(format!(
            "不支持的 URL 协议 {}: {}",
            other, raw
        ))),
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    let invalid = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.chars().any(char::is_control);
    if invalid {
        return Err(CaptureError::invalid(format!("输出名称无效: {:?}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(urls: &[&str]) -> CaptureBody {
        CaptureBody {
            urls: urls.iter().map(|u| UrlEntry::Plain(u.to_string())).collect(),
            ..Default::default()
        }
    }

    fn assert_invalid(result: AppResult<Task>) {
        let err = result.unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRequest(_)), "{:?}", err);
    }

    #[test]
    fn test_defaults() {
        let task = body(&["https://example.com"]).into_task().unwrap();
        assert_eq!(task.options.viewport, Viewport::default());
        assert_eq!(task.options.kind, OutputKind::Jpeg);
        assert_eq!(task.options.quality(), Some(80));
        assert_eq!(task.options.response_format, ResponseFormat::Zip);
    }

    #[test]
    fn test_each_job_keeps_its_own_url() {
        let task = body(&["https://a.example", "https://b.example"])
            .into_task()
            .unwrap();
        assert_eq!(task.jobs[0].url, "https://a.example");
        assert_eq!(task.jobs[1].url, "https://b.example");
    }

    #[test]
    fn test_pdf_with_selector_rejected() {
        let mut request = body(&["https://example.com"]);
        request.image_format = Some(OutputKind::Pdf);
        request.selector = Some("#x".into());
        assert_invalid(request.into_task());
    }

    #[test]
    fn test_png_clears_quality() {
        let mut request = body(&["https://example.com"]);
        request.image_format = Some(OutputKind::Png);
        request.quality = Some(30);
        let task = request.into_task().unwrap();
        assert_eq!(task.options.quality(), None);
    }

    #[test]
    fn test_url_count_bounds() {
        assert_invalid(body(&[]).into_task());

        let many: Vec<String> = (0..=MAX_URLS)
            .map(|i| format!("https://example.com/{}", i))
            .collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        assert_invalid(body(&refs).into_task());
    }

    #[test]
    fn test_invalid_urls_rejected() {
        assert_invalid(body(&["not a url"]).into_task());
        assert_invalid(body(&["file:///etc/passwd"]).into_task());
    }

    #[test]
    fn test_quality_out_of_range() {
        let mut request = body(&["https://example.com"]);
        request.quality = Some(101);
        assert_invalid(request.into_task());
    }

    #[test]
    fn test_viewport_size_string() {
        let mut request = body(&["https://example.com"]);
        request.viewport_size = Some("1024x768".into());
        let task = request.into_task().unwrap();
        assert_eq!(task.options.viewport, Viewport { width: 1024, height: 768 });

        let mut request = body(&["https://example.com"]);
        request.viewport_size = Some("1024*768".into());
        assert_invalid(request.into_task());

        let mut request = body(&["https://example.com"]);
        request.viewport_size = Some("1024x768".into());
        request.viewport_height = Some(500);
        let task = request.into_task().unwrap();
        assert_eq!(task.options.viewport, Viewport { width: 1024, height: 500 });
    }

    #[test]
    fn test_names_validated_and_unique() {
        let mut request = body(&[]);
        request.urls = vec![
            UrlEntry::Named {
                url: "https://a.example".into(),
                name: Some("home".into()),
            },
            UrlEntry::Plain("https://b.example".into()),
        ];
        let task = request.into_task().unwrap();
        assert_eq!(task.jobs[0].file_name("jpeg"), "home.jpeg");
        assert_eq!(task.jobs[1].file_name("jpeg"), "1.jpeg");

        let mut request = body(&[]);
        request.urls = vec![
            UrlEntry::Named {
                url: "https://a.example".into(),
                name: Some("1".into()),
            },
            UrlEntry::Plain("https://b.example".into()),
        ];
        assert_invalid(request.into_task());

        let mut request = body(&[]);
        request.urls = vec![UrlEntry::Named {
            url: "https://a.example".into(),
            name: Some("../escape".into()),
        }];
        assert_invalid(request.into_task());
    }

    #[test]
    fn test_single_file_only_for_one_url() {
        let mut request = body(&["https://a.example", "https://b.example"]);
        request.response_format = Some(ResponseFormat::File);
        assert_invalid(request.into_task());
    }

    #[test]
    fn test_capture_one_is_single_file() {
        let query = CaptureOneQuery {
            url: "https://example.com".into(),
            image_format: Some(OutputKind::Pdf),
            ..Default::default()
        };
        let task = query.into_task().unwrap();
        assert_eq!(task.jobs.len(), 1);
        assert_eq!(task.options.response_format, ResponseFormat::File);
        assert_eq!(task.options.quality(), None);
    }

    #[test]
    fn test_deserialize_mixed_url_entries() {
        let json = r##"{
            "urls": ["https://a.example", {"url": "https://b.example", "name": "b"}],
            "imageFormat": "png",
            "selector": "#main"
        }"##;
        let request: CaptureBody = serde_json::from_str(json).unwrap();
        let task = request.into_task().unwrap();
        assert_eq!(task.jobs[1].file_name("png"), "b.png");
        assert_eq!(task.options.selector.as_deref(), Some("#main"));
    }
}
