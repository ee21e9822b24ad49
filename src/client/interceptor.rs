//! 请求 / 响应拦截
//!
//! 请求阶段：同步读取 access token，存在时写入 `Authorization: Bearer <token>`。
//! 响应阶段：判断响应是放行、进入刷新流程，还是作为错误返回。

use crate::client::request::PendingRequest;
use crate::session::AuthState;
use crate::utils::logging::mask_token;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Request, StatusCode};
use tracing::warn;

/// 请求拦截，返回本次使用的 access token
pub fn intercept_request(auth: &AuthState, request: &mut Request) -> Option<String> {
    let token = auth.access_token();
    apply_bearer(request.headers_mut(), token.as_deref());
    token
}

/// 没有 token 时不做任何修改
pub fn apply_bearer(headers: &mut HeaderMap, token: Option<&str>) {
    let Some(token) = token else {
        return;
    };
    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Err(_) => warn!("access token 含有非法字符，已忽略: {}", mask_token(token)),
    }
}

/// 响应阶段的判断结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// 2xx
    Passed,
    /// 401，需要刷新后重放
    NeedsRefresh,
    /// 401，但已经重放过一次
    RetryExhausted,
    /// 其他失败，交给错误归一化
    Rejected,
}

pub fn classify(status: StatusCode, request: &PendingRequest) -> ResponseOutcome {
    if status.is_success() {
        return ResponseOutcome::Passed;
    }
    if status != StatusCode::UNAUTHORIZED || request.is_refresh_exempt() {
        return ResponseOutcome::Rejected;
    }
    if request.is_retried() {
        ResponseOutcome::RetryExhausted
    } else {
        ResponseOutcome::NeedsRefresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credential;

    fn request() -> Request {
        Request::new(
            reqwest::Method::GET,
            "http://localhost:8080/api/novels/me".parse().unwrap(),
        )
    }

    #[test]
    fn attaches_bearer_when_token_held() {
        let auth = AuthState::with_credential(Credential::new("tok-1", None, None));
        let mut request = request();

        let used = intercept_request(&auth, &mut request);
        assert_eq!(used.as_deref(), Some("tok-1"));
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer tok-1");
    }

    #[test]
    fn anonymous_request_is_untouched() {
        let auth = AuthState::in_memory();
        let mut request = request();

        assert_eq!(intercept_request(&auth, &mut request), None);
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_token_is_skipped() {
        let mut headers = HeaderMap::new();
        apply_bearer(&mut headers, Some("bad\ntoken"));
        assert!(headers.is_empty());
    }

    #[test]
    fn classification() {
        let plain = PendingRequest::get("/api/novels/me");
        let mut retried = plain.clone();
        retried.mark_retried();
        let login = PendingRequest::post("/api/auth/login").refresh_exempt();

        assert_eq!(classify(StatusCode::OK, &plain), ResponseOutcome::Passed);
        assert_eq!(classify(StatusCode::CREATED, &retried), ResponseOutcome::Passed);
        assert_eq!(classify(StatusCode::UNAUTHORIZED, &plain), ResponseOutcome::NeedsRefresh);
        assert_eq!(classify(StatusCode::UNAUTHORIZED, &retried), ResponseOutcome::RetryExhausted);
        assert_eq!(classify(StatusCode::UNAUTHORIZED, &login), ResponseOutcome::Rejected);
        assert_eq!(classify(StatusCode::FORBIDDEN, &plain), ResponseOutcome::Rejected);
    }
}
