use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, PrintToPdfParams, Viewport as ClipViewport,
};
use chromiumoxide::handler::viewport::Viewport as EngineViewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::browser::session::{RenderSession, SessionLauncher};
use crate::config::Config;
use crate::error::{AppResult, CaptureError};
use crate::models::{CaptureOptions, OutputKind, Viewport};

/// 元素轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// CSS 像素与英寸的换算（PDF 纸张尺寸单位为英寸）
const CSS_PX_PER_INCH: f64 = 96.0;

/// 资源请求数量 500ms 不变视为网络空闲
const NETWORK_QUIET_JS: &str = r#"
new Promise((resolve) => {
    let last = performance.getEntriesByType('resource').length;
    let quiet = 0;
    const timer = setInterval(() => {
        const current = performance.getEntriesByType('resource').length;
        if (current === last) {
            quiet += 100;
            if (quiet >= 500) {
                clearInterval(timer);
                resolve(true);
            }
        } else {
            last = current;
            quiet = 0;
        }
    }, 100);
})
"#;

const CONTENT_HEIGHT_JS: &str = r#"
Math.max(
    document.documentElement ? document.documentElement.scrollHeight : 0,
    document.body ? document.body.scrollHeight : 0
)
"#;

/// 元素在文档中的位置
#[derive(Debug, Deserialize)]
struct ElementRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// 基于 chromiumoxide 的会话启动器
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
    executable: Option<PathBuf>,
    page_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(headless: bool, executable: Option<PathBuf>, page_timeout: Duration) -> Self {
        Self {
            headless,
            executable,
            page_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.headless,
            config.chrome_executable().cloned(),
            config.page_timeout(),
        )
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, options: &CaptureOptions) -> AppResult<ChromeSession> {
        info!(
            "🚀 启动浏览器 (无头: {}, 视口: {})",
            self.headless, options.viewport
        );

        let mut builder = BrowserConfig::builder()
            .window_size(options.viewport.width, options.viewport.height)
            .viewport(EngineViewport {
                width: options.viewport.width,
                height: options.viewport.height,
                ..Default::default()
            })
            .request_timeout(self.page_timeout)
            .args(vec![
                "--no-sandbox",
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--ignore-certificate-errors",
            ]);

        builder = if self.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };

        if let Some(path) = &self.executable {
            debug!("浏览器路径: {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| {
            error!("配置浏览器失败: {}", e);
            CaptureError::launch_failed(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            CaptureError::launch_failed(e)
        })?;

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        debug!("浏览器启动成功");

        Ok(ChromeSession {
            browser,
            handler_task,
            viewport: options.viewport,
            page_timeout: self.page_timeout,
            closed: false,
        })
    }
}

/// 页面句柄，只暴露执行 JS 的能力
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 并反序列化结果
    async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    async fn set_viewport(&self, width: u32, height: u32) -> Result<(), chromiumoxide::error::CdpError> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(width),
                i64::from(height),
                1.0,
                false,
            ))
            .await?;
        Ok(())
    }
}

/// 一个 Chromium 进程
pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    viewport: Viewport,
    page_timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// 轮询直到选择器匹配到可见元素
    async fn wait_for_element(&self, page: &ChromePage, selector: &str) -> AppResult<ElementRect> {
        let not_found = || CaptureError::ElementNotFound {
            selector: selector.to_string(),
            timeout_secs: self.page_timeout.as_secs(),
        };

        let selector_json = serde_json::to_string(selector).map_err(|_| not_found())?;
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return null;
                el.scrollIntoView();
                const r = el.getBoundingClientRect();
                if (r.width === 0 || r.height === 0) return null;
                return {{ x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height }};
            }})()
            "#,
            selector_json
        );

        let deadline = Instant::now() + self.page_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(not_found());
            }

            match timeout(remaining, page.eval_as::<Option<ElementRect>>(js_code.as_str())).await {
                Ok(Ok(Some(rect))) => return Ok(rect),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => debug!("查询元素 {} 失败: {}", selector, e),
                Err(_) => return Err(not_found()),
            }

            sleep(POLL_INTERVAL).await;
        }
    }
}

/// 整页截图区域：配置宽度 × 内容高度
fn full_extent_clip(width: u32, height: u32) -> ClipViewport {
    ClipViewport {
        x: 0.0,
        y: 0.0,
        width: f64::from(width),
        height: f64::from(height),
        scale: 1.0,
    }
}

fn screenshot_format(kind: OutputKind) -> CaptureScreenshotFormat {
    match kind {
        OutputKind::Png => CaptureScreenshotFormat::Png,
        _ => CaptureScreenshotFormat::Jpeg,
    }
}

#[async_trait]
impl RenderSession for ChromeSession {
    type Page = ChromePage;

    async fn open_page(&self) -> AppResult<ChromePage> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| {
            error!("创建页面失败: {}", e);
            CaptureError::navigation_failed("about:blank", e)
        })?;
        let page = ChromePage::new(page);

        page.set_viewport(self.viewport.width, self.viewport.height)
            .await
            .map_err(|e| CaptureError::navigation_failed("about:blank", e))?;

        Ok(page)
    }

    async fn navigate(&self, page: &ChromePage, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);

        let load = async {
            page.page().goto(url).await?;
            page.page().wait_for_navigation().await?;
            page.page().evaluate(NETWORK_QUIET_JS.to_string()).await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        match timeout(self.page_timeout, load).await {
            Ok(Ok(())) => {
                debug!("页面加载完成: {}", url);
                Ok(())
            }
            Ok(Err(e)) => Err(CaptureError::navigation_failed(url, e)),
            Err(elapsed) => Err(CaptureError::navigation_failed(url, elapsed)),
        }
    }

    async fn capture_full(
        &self,
        page: &ChromePage,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()> {
        if !kind.is_raster() {
            let params = PrintToPdfParams {
                print_background: Some(true),
                paper_width: Some(f64::from(self.viewport.width) / CSS_PX_PER_INCH),
                ..Default::default()
            };
            page.page()
                .save_pdf(params, dest)
                .await
                .map_err(|e| CaptureError::capture_failed(dest, e))?;
            return Ok(());
        }

        // 把视口高度拉伸到内容高度，宽度保持不变
        let content_height: f64 = page
            .eval_as(CONTENT_HEIGHT_JS)
            .await
            .map_err(|e| CaptureError::capture_failed(dest, e))?;
        let height = (content_height.ceil() as u32).max(1);
        debug!("内容高度: {}px", height);

        page.set_viewport(self.viewport.width, height)
            .await
            .map_err(|e| CaptureError::capture_failed(dest, e))?;

        // 不用 full_page：它会按内容宽度重设视口，宽度必须保持配置值
        let mut params = ScreenshotParams::builder()
            .format(screenshot_format(kind))
            .clip(full_extent_clip(self.viewport.width, height))
            .capture_beyond_viewport(true);
        if let Some(quality) = quality {
            params = params.quality(i64::from(quality));
        }

        page.page()
            .save_screenshot(params.build(), dest)
            .await
            .map_err(|e| CaptureError::capture_failed(dest, e))?;
        Ok(())
    }

    async fn capture_element(
        &self,
        page: &ChromePage,
        selector: &str,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()> {
        let rect = self.wait_for_element(page, selector).await?;
        debug!(
            "元素 {} 位置: ({}, {}) {}x{}",
            selector, rect.x, rect.y, rect.width, rect.height
        );

        let mut params = ScreenshotParams::builder()
            .format(screenshot_format(kind))
            .clip(ClipViewport {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                scale: 1.0,
            })
            .capture_beyond_viewport(true);
        if let Some(quality) = quality {
            params = params.quality(i64::from(quality));
        }

        page.page()
            .save_screenshot(params.build(), dest)
            .await
            .map_err(|e| CaptureError::capture_failed(dest, e))?;
        Ok(())
    }

    async fn close_page(&self, page: ChromePage) -> AppResult<()> {
        if let Err(e) = page.page.close().await {
            warn!("⚠️ 关闭页面失败（可能已关闭）: {}", e);
        }
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("⚠️ 等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();
        debug!("浏览器已关闭");
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_format() {
        assert_eq!(
            screenshot_format(OutputKind::Png),
            CaptureScreenshotFormat::Png
        );
        assert_eq!(
            screenshot_format(OutputKind::Jpeg),
            CaptureScreenshotFormat::Jpeg
        );
    }

    #[test]
    fn test_full_extent_clip_keeps_configured_width() {
        let clip = full_extent_clip(750, 4200);
        assert_eq!(clip.x, 0.0);
        assert_eq!(clip.y, 0.0);
        assert_eq!(clip.width, 750.0);
        assert_eq!(clip.height, 4200.0);
        assert_eq!(clip.scale, 1.0);
    }

    #[test]
    fn test_launcher_follows_config() {
        let config = Config {
            production: true,
            chrome_executable_prod: Some(PathBuf::from("/usr/bin/chromium")),
            page_timeout_secs: 3,
            ..Config::default()
        };
        let launcher = ChromeLauncher::from_config(&config);
        assert_eq!(launcher.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(launcher.page_timeout, Duration::from_secs(3));
        assert!(launcher.headless);
    }

    #[tokio::test]
    #[ignore] // 需要本机安装 Chromium：cargo test -- --ignored
    async fn test_capture_example_page() {
        let root = tempfile::TempDir::new().unwrap();
        let launcher = ChromeLauncher::new(true, None, Duration::from_secs(10));
        let mut session = launcher.launch(&CaptureOptions::default()).await.unwrap();

        let page = session.open_page().await.unwrap();
        session.navigate(&page, "https://example.com").await.unwrap();
        let dest = root.path().join("0.jpeg");
        session
            .capture_full(&page, &dest, OutputKind::Jpeg, Some(80))
            .await
            .unwrap();
        session.close_page(page).await.unwrap();
        session.close().await.unwrap();

        assert!(dest.exists());
    }
}
