//! 错误归一化
//!
//! 把传输层失败和非 2xx 响应统一成 `ApiError`，并解开响应外壳。

use crate::error::{ApiError, RefreshFailure};
use crate::models::ApiResponse;
use crate::utils::logging::truncate_text;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// 请求没有拿到响应（或在本地就构造失败）
pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        return ApiError::invalid_request(format!("无法构造请求 ({}): {}", url, err));
    }
    ApiError::NetworkUnavailable {
        url: url.to_string(),
        source: err,
    }
}

/// 按状态码分类
pub(crate) fn from_status(url: &str, status: u16, message: Option<String>) -> ApiError {
    let url = url.to_string();
    match status {
        401 => ApiError::Unauthorized { url, message },
        500..=u16::MAX => ApiError::Server {
            url,
            status,
            message,
        },
        _ => ApiError::Client {
            url,
            status,
            message,
        },
    }
}

/// 从错误响应体中取出服务器给的 message
pub(crate) fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiResponse>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty())
}

/// 非 2xx 响应 → ApiError
pub(crate) async fn status_error(url: &str, response: Response) -> ApiError {
    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(body) => body_error(url, status, &body),
        Err(_) => from_status(url, status, None),
    }
}

/// 已读出的错误响应体 → ApiError
pub(crate) fn body_error(url: &str, status: u16, body: &[u8]) -> ApiError {
    debug!(
        "错误响应 {} ({}): {}",
        status,
        url,
        truncate_text(&String::from_utf8_lossy(body), 200)
    );
    from_status(url, status, server_message(body))
}

/// 2xx 响应的外壳里带着错误码时，以外壳的 statusCode 为准
pub(crate) fn effective_status(status: StatusCode, body: &[u8]) -> StatusCode {
    if !status.is_success() {
        return status;
    }
    match serde_json::from_slice::<ApiResponse>(body) {
        Ok(envelope) if envelope.is_error() => envelope
            .status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_REQUEST),
        _ => status,
    }
}

/// 解析响应外壳，返回其中的 `data`
pub(crate) fn decode_envelope<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, ApiError> {
    let envelope = parse_envelope(url, body)?;
    serde_json::from_value(envelope.data).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// 只检查外壳，不关心 `data`
pub(crate) fn check_envelope(url: &str, body: &[u8]) -> Result<(), ApiError> {
    parse_envelope(url, body).map(|_| ())
}

fn parse_envelope(url: &str, body: &[u8]) -> Result<ApiResponse, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiResponse {
            data: Value::Null,
            ..ApiResponse::default()
        });
    }

    let envelope: ApiResponse = serde_json::from_slice(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })?;

    if envelope.is_error() {
        let status = envelope.status_code.unwrap_or(StatusCode::BAD_REQUEST.as_u16());
        return Err(from_status(url, status, envelope.message));
    }
    Ok(envelope)
}

pub(crate) async fn read_envelope<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e))?;
    decode_envelope(url, &body)
}

/// 刷新请求的失败 → 刷新失败原因
pub(crate) fn refresh_failure(err: &ApiError) -> RefreshFailure {
    match err {
        ApiError::Unauthorized { message, .. } => RefreshFailure::Rejected {
            status: 401,
            message: message.clone(),
        },
        ApiError::Server {
            status, message, ..
        }
        | ApiError::Client {
            status, message, ..
        } => RefreshFailure::Rejected {
            status: *status,
            message: message.clone(),
        },
        ApiError::NetworkUnavailable { source, .. } => RefreshFailure::Network(source.to_string()),
        ApiError::RefreshFailed { reason } => reason.clone(),
        ApiError::Decode { source, .. } => RefreshFailure::MalformedResponse(source.to_string()),
        ApiError::InvalidRequest { message } => RefreshFailure::MalformedResponse(message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Tag;

    const URL: &str = "http://localhost:8080/api/tags";

    #[test]
    fn status_classification() {
        assert!(matches!(from_status(URL, 401, None), ApiError::Unauthorized { .. }));
        assert_eq!(from_status(URL, 404, None).kind(), ErrorKind::Client);
        assert_eq!(from_status(URL, 502, None).kind(), ErrorKind::Server);
    }

    #[test]
    fn server_message_extraction() {
        assert_eq!(
            server_message(r#"{"statusCode":400,"message":"제목을 입력하세요"}"#.as_bytes()).as_deref(),
            Some("제목을 입력하세요")
        );
        assert_eq!(server_message(br#"{"message":"  "}"#), None);
        assert_eq!(server_message(b"<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn envelope_data_is_unwrapped() {
        let tags: Vec<Tag> = decode_envelope(
            URL,
            r#"{"statusCode":200,"message":"ok","data":[{"id":1,"name":"판타지"}]}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(tags[0].name, "판타지");
    }

    #[test]
    fn envelope_error_code_becomes_error() {
        let err = decode_envelope::<Value>(URL, r#"{"statusCode":409,"message":"중복된 닉네임"}"#.as_bytes())
            .unwrap_err();
        assert_eq!(err.http_status(), Some(409));
        assert_eq!(err.message(), "중복된 닉네임");
    }

    #[test]
    fn envelope_code_overrides_success_status() {
        let expired = br#"{"statusCode":401,"message":"expired"}"#;
        assert_eq!(effective_status(StatusCode::OK, expired), StatusCode::UNAUTHORIZED);
        assert_eq!(
            effective_status(StatusCode::OK, br#"{"statusCode":200,"data":1}"#),
            StatusCode::OK
        );
        assert_eq!(effective_status(StatusCode::OK, b"not json"), StatusCode::OK);
        assert_eq!(effective_status(StatusCode::NOT_FOUND, expired), StatusCode::NOT_FOUND);

        let err = body_error(URL, 401, expired);
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(err.message(), "expired");
    }

    #[test]
    fn empty_body_is_fine_for_unit() {
        assert!(check_envelope(URL, b"").is_ok());
        assert!(decode_envelope::<Option<Tag>>(URL, b"  ").unwrap().is_none());
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let err = decode_envelope::<Vec<Tag>>(URL, br#"{"statusCode":200,"data":{"id":1}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.kind(), ErrorKind::Server);
    }
}
