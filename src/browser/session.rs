//! 渲染会话能力
//!
//! 编排层只依赖这两个 trait，不直接接触浏览器。任何满足约定的实现都可以替换，
//! 测试中使用假实现。

use std::path::Path;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{CaptureOptions, OutputKind};

/// 启动渲染会话
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: RenderSession;

    /// 启动一个渲染引擎进程，失败返回 `CaptureError::Launch`
    async fn launch(&self, options: &CaptureOptions) -> AppResult<Self::Session>;
}

/// 一个渲染引擎进程及其中打开的页面
#[async_trait]
pub trait RenderSession: Send + Sync {
    type Page: Send + Sync;

    /// 打开新页面，视口设置为启动时的选项尺寸
    async fn open_page(&self) -> AppResult<Self::Page>;

    /// 导航并等待网络空闲，失败返回 `CaptureError::Navigation`
    async fn navigate(&self, page: &Self::Page, url: &str) -> AppResult<()>;

    /// 整页截图；PDF 格式输出分页文档
    async fn capture_full(
        &self,
        page: &Self::Page,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()>;

    /// 元素截图，元素超时未出现返回 `CaptureError::ElementNotFound`
    async fn capture_element(
        &self,
        page: &Self::Page,
        selector: &str,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()>;

    /// 关闭页面，已关闭的页面不报错
    async fn close_page(&self, page: Self::Page) -> AppResult<()>;

    /// 结束引擎进程，重复调用不报错
    async fn close(&mut self) -> AppResult<()>;
}
