//! 凭证刷新协调
//!
//! 同一时刻最多只有一次刷新在进行：并发收到 401 的请求共享同一个
//! 刷新 future，而不是各自发起刷新。刷新失败时清除会话并跳转登录页，
//! 同一次失效只跳转一次。

use crate::client::normalize;
use crate::client::request::{PendingRequest, RequestBody};
use crate::endpoints;
use crate::error::RefreshFailure;
use crate::infrastructure::{HttpExecutor, LoginRedirect};
use crate::models::TokenPair;
use crate::session::{AuthState, Credential};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::json;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential, RefreshFailure>>>;

/// 认证流程当前所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Normal,
    Refreshing,
    /// 会话已清除，等待重新登录
    Failed,
}

struct Inner {
    auth: AuthState,
    executor: HttpExecutor,
    redirect: Arc<dyn LoginRedirect>,
    login_path: String,
    in_flight: Mutex<Option<RefreshFuture>>,
    /// 进入失败状态时的会话版本；会话再被修改后自动失效
    failed_revision: Mutex<Option<u64>>,
}

/// 刷新协调器
///
/// 加锁顺序：`in_flight` → `failed_revision` → 会话。任何锁都不跨越 await。
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        auth: AuthState,
        executor: HttpExecutor,
        redirect: Arc<dyn LoginRedirect>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                executor,
                redirect,
                login_path: login_path.into(),
                in_flight: Mutex::new(None),
                failed_revision: Mutex::new(None),
            }),
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        if lock(&self.inner.in_flight).is_some() {
            return RefreshPhase::Refreshing;
        }
        let failed = *lock(&self.inner.failed_revision);
        if failed == Some(self.inner.auth.revision()) {
            RefreshPhase::Failed
        } else {
            RefreshPhase::Normal
        }
    }

    /// 获取可用于重放的新凭证
    ///
    /// # 参数
    /// - `stale_token`: 收到 401 的那次请求所携带的 access token
    ///
    /// # 返回
    /// 已经写入会话的新凭证。若当前 token 已经不是 `stale_token`
    /// （别的请求刚刚刷新过），直接返回当前凭证，不再发起刷新。
    pub async fn refresh(&self, stale_token: Option<&str>) -> Result<Credential, RefreshFailure> {
        let shared = {
            let mut slot = lock(&self.inner.in_flight);
            match slot.as_ref() {
                Some(running) => {
                    debug!("加入进行中的刷新");
                    running.clone()
                }
                None => {
                    let current = self.inner.auth.snapshot();
                    if current.access_token.is_some() && current.access_token.as_deref() != stale_token {
                        debug!("凭证已被更新，直接重放");
                        return Ok(current);
                    }
                    let running = run(Arc::clone(&self.inner)).boxed().shared();
                    *slot = Some(running.clone());
                    running
                }
            }
        };
        shared.await
    }

    /// 进入失败状态：清除会话并跳转登录页
    pub(crate) fn terminate(&self, reason: &RefreshFailure) {
        terminate(&self.inner, reason);
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("phase", &self.phase())
            .field("login_path", &self.inner.login_path)
            .finish()
    }
}

async fn run(inner: Arc<Inner>) -> Result<Credential, RefreshFailure> {
    info!("🔄 access token 已失效，正在刷新");
    let result = request_new_credential(&inner).await;
    match &result {
        Ok(credential) => info!(
            "✅ 凭证刷新成功 (userId: {})",
            credential.subject_id.as_deref().unwrap_or("-")
        ),
        Err(reason) => {
            warn!("❌ 凭证刷新失败: {}", reason);
            terminate(&inner, reason);
        }
    }
    *lock(&inner.in_flight) = None;
    result
}

/// 刷新请求本身不经过拦截器，也不参与 401 处理
async fn request_new_credential(inner: &Inner) -> Result<Credential, RefreshFailure> {
    let previous = inner.auth.snapshot();
    if !previous.has_refresh_token() {
        return Err(RefreshFailure::MissingRefreshToken);
    }
    let refresh_token = previous.refresh_token.clone().unwrap_or_default();

    let pending = PendingRequest::post(endpoints::REFRESH)
        .with_body(RequestBody::Json(json!({
            "refreshToken": format!("Bearer {}", refresh_token)
        })))
        .refresh_exempt();
    let url = inner.executor.url_for(pending.path());

    let request = inner
        .executor
        .build(&pending)
        .map_err(|e| normalize::refresh_failure(&e))?;
    let response = inner
        .executor
        .execute(request)
        .await
        .map_err(|e| normalize::refresh_failure(&e))?;

    if !response.status().is_success() {
        let err = normalize::status_error(&url, response).await;
        return Err(normalize::refresh_failure(&err));
    }

    let tokens: TokenPair = normalize::read_envelope(&url, response)
        .await
        .map_err(|e| normalize::refresh_failure(&e))?;
    let credential = tokens.into_credential(&previous);

    inner
        .auth
        .set_credential(credential.clone())
        .map_err(|e| RefreshFailure::Persist(e.to_string()))?;
    Ok(credential)
}

fn terminate(inner: &Inner, reason: &RefreshFailure) {
    {
        let mut failed = lock(&inner.failed_revision);
        if *failed == Some(inner.auth.revision()) {
            debug!("会话已处于失效状态，跳过: {}", reason);
            return;
        }
        if let Err(e) = inner.auth.clear() {
            error!("清除会话失败: {}", e);
        }
        *failed = Some(inner.auth.revision());
    }

    warn!("🔐 会话已失效 ({})，跳转登录页", reason);
    inner.redirect.redirect_to_login(&inner.login_path);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRedirect {
        hits: AtomicUsize,
    }

    impl LoginRedirect for CountingRedirect {
        fn redirect_to_login(&self, login_path: &str) {
            assert_eq!(login_path, "/login");
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator(auth: &AuthState) -> (RefreshCoordinator, Arc<CountingRedirect>) {
        let redirect = Arc::new(CountingRedirect::default());
        // 端口 9 上没有服务，这些测试都不应该真的发请求
        let executor = HttpExecutor::new("http://127.0.0.1:9").unwrap();
        let coordinator = RefreshCoordinator::new(auth.clone(), executor, redirect.clone(), "/login");
        (coordinator, redirect)
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_network() {
        let auth = AuthState::with_credential(Credential::new("expired", None, Some("4".to_string())));
        let (coordinator, redirect) = coordinator(&auth);
        assert_eq!(coordinator.phase(), RefreshPhase::Normal);

        let err = coordinator.refresh(Some("expired")).await.unwrap_err();
        assert_eq!(err, RefreshFailure::MissingRefreshToken);
        assert!(auth.snapshot().is_empty());
        assert_eq!(redirect.hits.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.phase(), RefreshPhase::Failed);
    }

    #[tokio::test]
    async fn newer_token_short_circuits_refresh() {
        let auth = AuthState::with_credential(Credential::new("fresh", Some("r".to_string()), None));
        let (coordinator, redirect) = coordinator(&auth);

        let credential = coordinator.refresh(Some("stale")).await.unwrap();
        assert_eq!(credential.access_token.as_deref(), Some("fresh"));
        assert_eq!(redirect.hits.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.phase(), RefreshPhase::Normal);
    }

    #[test]
    fn terminate_redirects_once_per_session() {
        let auth = AuthState::with_credential(Credential::new("a", Some("r".to_string()), None));
        let (coordinator, redirect) = coordinator(&auth);

        coordinator.terminate(&RefreshFailure::RetryRejected);
        coordinator.terminate(&RefreshFailure::MissingRefreshToken);
        assert_eq!(redirect.hits.load(Ordering::SeqCst), 1);

        // 重新登录后再次失效，会再跳转一次
        auth.set_credential(Credential::new("b", None, None)).unwrap();
        assert_eq!(coordinator.phase(), RefreshPhase::Normal);
        coordinator.terminate(&RefreshFailure::RetryRejected);
        assert_eq!(redirect.hits.load(Ordering::SeqCst), 2);
    }
}
