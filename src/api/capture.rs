//! 截图接口

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::api::extract::{CaptureJson, CaptureQuery};
use crate::api::request::{CaptureBody, CaptureOneQuery};
use crate::api::AppState;
use crate::browser::SessionLauncher;
use crate::error::AppResult;
use crate::services::CapturePackage;

/// `POST /capture`：多个 URL，默认返回 zip
pub async fn capture<L: SessionLauncher + 'static>(
    State(state): State<AppState<L>>,
    CaptureJson(body): CaptureJson<CaptureBody>,
) -> AppResult<Response> {
    info!("CaptureController: 收到 {} 个 URL", body.urls.len());

    let task = body.into_task()?;
    info!("[任务 {}] 选项: {:?}", task.task_id, task.options);

    let package = state.execute(task).await?;
    Ok(package_response(package))
}

/// `GET /capture-one`：单个 URL，直接返回文件
pub async fn capture_one<L: SessionLauncher + 'static>(
    State(state): State<AppState<L>>,
    CaptureQuery(query): CaptureQuery<CaptureOneQuery>,
) -> AppResult<Response> {
    info!("CaptureOneController: {}", query.url);

    let task = query.into_task()?;
    info!("[任务 {}] 选项: {:?}", task.task_id, task.options);

    let package = state.execute(task).await?;
    Ok(package_response(package))
}

/// `GET /ping`
pub async fn ping() -> &'static str {
    "pong!"
}

fn package_response(package: CapturePackage) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", package.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, package.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        package.bytes,
    )
        .into_response()
}
