//! 测试用的假渲染会话
//!
//! 不启动浏览器，只把调用顺序记录下来，并把一段描述写入目标文件

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use page_capture::{
    AppResult, CaptureError, CaptureOptions, CaptureService, FailurePolicy, OutputKind,
    RenderSession, ScratchStore, SessionGranularity, SessionLauncher, TaskRunner,
};

/// 元素等待的超时时间
pub const ELEMENT_TIMEOUT: Duration = Duration::from_millis(50);

/// 假会话的行为设定
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub fail_launch: bool,
    pub unreachable: HashSet<String>,
    pub missing_selector: bool,
}

impl Script {
    pub fn unreachable(urls: &[&str]) -> Self {
        Self {
            unreachable: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// 调用记录
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
}

impl Recorder {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    script: Script,
    pub recorder: Arc<Recorder>,
}

impl FakeLauncher {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            recorder: Arc::new(Recorder::default()),
        }
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _options: &CaptureOptions) -> AppResult<FakeSession> {
        if self.script.fail_launch {
            return Err(CaptureError::launch_failed("chrome binary not found"));
        }
        self.recorder.launches.fetch_add(1, Ordering::SeqCst);
        self.recorder.push("launch");
        Ok(FakeSession {
            script: self.script.clone(),
            recorder: Arc::clone(&self.recorder),
            closed: false,
        })
    }
}

pub struct FakeSession {
    script: Script,
    recorder: Arc<Recorder>,
    closed: bool,
}

pub struct FakePage {
    id: usize,
}

impl FakeSession {
    async fn write(&self, dest: &Path, content: String) -> AppResult<()> {
        tokio::fs::write(dest, content)
            .await
            .map_err(|e| CaptureError::capture_failed(dest, e))?;
        let name = dest.file_name().unwrap().to_string_lossy().to_string();
        self.recorder.push(format!("write:{}", name));
        Ok(())
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    type Page = FakePage;

    async fn open_page(&self) -> AppResult<FakePage> {
        let id = self.recorder.pages_opened.fetch_add(1, Ordering::SeqCst);
        self.recorder.push("open_page");
        Ok(FakePage { id })
    }

    async fn navigate(&self, _page: &FakePage, url: &str) -> AppResult<()> {
        self.recorder.push(format!("navigate:{}", url));
        if self.script.unreachable.contains(url) {
            return Err(CaptureError::navigation_failed(url, "net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }

    async fn capture_full(
        &self,
        page: &FakePage,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()> {
        self.write(dest, format!("full|{}|{:?}|page{}", kind, quality, page.id))
            .await
    }

    async fn capture_element(
        &self,
        page: &FakePage,
        selector: &str,
        dest: &Path,
        kind: OutputKind,
        quality: Option<u8>,
    ) -> AppResult<()> {
        if self.script.missing_selector {
            let _ = tokio::time::timeout(ELEMENT_TIMEOUT, std::future::pending::<()>()).await;
            return Err(CaptureError::ElementNotFound {
                selector: selector.to_string(),
                timeout_secs: ELEMENT_TIMEOUT.as_secs(),
            });
        }
        self.write(
            dest,
            format!("element:{}|{}|{:?}|page{}", selector, kind, quality, page.id),
        )
        .await
    }

    async fn close_page(&self, _page: FakePage) -> AppResult<()> {
        self.recorder.pages_closed.fetch_add(1, Ordering::SeqCst);
        self.recorder.push("close_page");
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        if !self.closed {
            self.closed = true;
            self.recorder.closes.fetch_add(1, Ordering::SeqCst);
            self.recorder.push("close");
        }
        Ok(())
    }
}

pub fn runner(
    launcher: FakeLauncher,
    root: &Path,
    policy: FailurePolicy,
    granularity: SessionGranularity,
) -> TaskRunner<FakeLauncher> {
    TaskRunner::new(launcher, ScratchStore::new(root), policy, granularity)
}

pub fn service(launcher: FakeLauncher, root: &Path) -> CaptureService<FakeLauncher> {
    CaptureService::new(runner(
        launcher,
        root,
        FailurePolicy::FailFast,
        SessionGranularity::PerTask,
    ))
}
