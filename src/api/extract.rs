//! 请求提取器
//!
//! 包装 axum 的 `Json` / `Query`，反序列化失败统一转换为 `CaptureError::InvalidRequest`，
//! 响应与其他校验错误一样是 JSON `{error, code}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CaptureError;

/// JSON 请求体
#[derive(Debug, Clone)]
pub struct CaptureJson<T>(pub T);

impl<S, T> FromRequest<S> for CaptureJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CaptureError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                debug!("请求体解析失败: {}", rejection.body_text());
                CaptureError::invalid(rejection.body_text())
            })?;
        Ok(CaptureJson(value))
    }
}

/// 查询参数
#[derive(Debug, Clone)]
pub struct CaptureQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for CaptureQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CaptureError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                debug!("查询参数解析失败: {}", rejection.body_text());
                CaptureError::invalid(rejection.body_text())
            })?;
        Ok(CaptureQuery(value))
    }
}
