//! 带认证的 API 客户端
//!
//! 每个请求的流程：
//! 1. 构造请求，附上当前 access token
//! 2. 2xx 直接返回；非 401 的失败归一化后返回
//! 3. 401 且未重放过：等待（共享的）刷新，然后重放一次
//! 4. 重放后仍是 401：清除会话、跳转登录页，返回 `RefreshFailed`

use crate::client::interceptor::{self, ResponseOutcome};
use crate::client::normalize;
use crate::client::refresh::{RefreshCoordinator, RefreshPhase};
use crate::client::request::PendingRequest;
use crate::config::Config;
use crate::error::{ApiError, RefreshFailure};
use crate::infrastructure::{HttpExecutor, LogRedirect, LoginRedirect};
use crate::session::AuthState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// API 客户端
///
/// 克隆体共享连接池、会话和刷新状态。
#[derive(Debug, Clone)]
pub struct ApiClient {
    executor: HttpExecutor,
    auth: AuthState,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// 会话失效时只记录日志
    pub fn new(config: &Config, auth: AuthState) -> Result<Self, ApiError> {
        Self::with_redirect(config, auth, Arc::new(LogRedirect))
    }

    /// 创建客户端
    ///
    /// # 参数
    /// - `config`: 提供 API 地址和登录页路径
    /// - `auth`: 会话状态，由调用方持有
    /// - `redirect`: 会话彻底失效时的跳转动作
    pub fn with_redirect(
        config: &Config,
        auth: AuthState,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let executor = HttpExecutor::new(config.api_base_url.clone())?;
        let refresh = RefreshCoordinator::new(
            auth.clone(),
            executor.clone(),
            redirect,
            config.login_path.clone(),
        );
        Ok(Self {
            executor,
            auth,
            refresh,
        })
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub fn url_for(&self, path: &str) -> String {
        self.executor.url_for(path)
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.refresh.phase()
    }

    /// 发送请求，返回 2xx 响应体
    ///
    /// HTTP 2xx 但外壳里是 401 的响应，和 HTTP 401 走同样的刷新流程。
    pub async fn execute(&self, mut request: PendingRequest) -> Result<Vec<u8>, ApiError> {
        loop {
            let url = self.executor.url_for(request.path());
            let mut outgoing = self.executor.build(&request)?;
            let sent_with = interceptor::intercept_request(&self.auth, &mut outgoing);
            let response = self.executor.execute(outgoing).await?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| normalize::transport_error(&url, e))?;
            let effective = normalize::effective_status(status, &body);

            match interceptor::classify(effective, &request) {
                ResponseOutcome::Passed => return Ok(body.to_vec()),
                ResponseOutcome::Rejected => {
                    return Err(normalize::body_error(&url, effective.as_u16(), &body));
                }
                ResponseOutcome::RetryExhausted => {
                    warn!("刷新后仍然 401: {} {}", request.method(), url);
                    let reason = RefreshFailure::RetryRejected;
                    self.refresh.terminate(&reason);
                    return Err(ApiError::RefreshFailed { reason });
                }
                ResponseOutcome::NeedsRefresh => {
                    debug!("401，刷新后重放: {} {}", request.method(), url);
                    self.refresh
                        .refresh(sent_with.as_deref())
                        .await
                        .map_err(|reason| ApiError::RefreshFailed { reason })?;
                    request.mark_retried();
                }
            }
        }
    }

    /// 发送请求并解出响应外壳中的 `data`
    pub async fn send<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        let url = self.executor.url_for(request.path());
        let body = self.execute(request).await?;
        normalize::decode_envelope(&url, &body)
    }

    /// 发送请求，不关心 `data`
    pub async fn send_unit(&self, request: PendingRequest) -> Result<(), ApiError> {
        let url = self.executor.url_for(request.path());
        let body = self.execute(request).await?;
        normalize::check_envelope(&url, &body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(PendingRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(PendingRequest::post(path).with_json(body)?).await
    }

    pub async fn patch(&self, path: &str) -> Result<(), ApiError> {
        self.send_unit(PendingRequest::patch(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_unit(PendingRequest::delete(path)).await
    }
}
