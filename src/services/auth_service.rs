/// 账号服务
///
/// 登录、注册、重复检查、个人信息、登出和第三方登录回调
use crate::client::{ApiClient, PendingRequest};
use crate::endpoints;
use crate::error::{ApiError, AppResult};
use crate::models::{DuplicateCheck, LoginRequest, SignupRequest, SocialProvider, TokenPair, UserProfile};
use crate::session::Credential;
use crate::utils::logging::mask_token;
use regex::Regex;
use tracing::{info, warn};

/// 重复检查的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckField {
    Username,
    Nickname,
    Email,
}

impl CheckField {
    fn path(self) -> &'static str {
        match self {
            CheckField::Username => endpoints::CHECK_USERNAME,
            CheckField::Nickname => endpoints::CHECK_NICKNAME,
            CheckField::Email => endpoints::CHECK_EMAIL,
        }
    }

    fn key(self) -> &'static str {
        match self {
            CheckField::Username => "username",
            CheckField::Nickname => "nickname",
            CheckField::Email => "email",
        }
    }
}

/// 账号服务
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 登录并保存凭证
    ///
    /// # 参数
    /// - `username`: 用户名
    /// - `password`: 密码
    ///
    /// # 返回
    /// 返回已经写入会话的凭证。401 直接返回 `Unauthorized`，不会触发刷新。
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Credential> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::invalid_request("用户名和密码不能为空").into());
        }

        let body = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let request = PendingRequest::post(endpoints::LOGIN)
            .with_json(&body)?
            .refresh_exempt();
        let tokens: TokenPair = self.client.send(request).await?;

        let credential = tokens.into_credential(&Credential::default());
        self.client.auth().set_credential(credential.clone())?;
        info!(
            "✅ 登录成功: {} (token: {})",
            body.username,
            credential.access_token.as_deref().map(mask_token).unwrap_or_default()
        );
        Ok(credential)
    }

    pub async fn signup(&self, request: &SignupRequest) -> AppResult<()> {
        let request = PendingRequest::post(endpoints::SIGNUP)
            .with_json(request)?
            .refresh_exempt();
        self.client.send_unit(request).await?;
        Ok(())
    }

    /// 值已被占用时返回 `true`
    pub async fn check_duplicate(&self, field: CheckField, value: &str) -> AppResult<bool> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ApiError::invalid_request(format!("{} 不能为空", field.key())).into());
        }

        let request = PendingRequest::get(field.path()).with_query(field.key(), value);
        let check: DuplicateCheck = self.client.send(request).await?;
        Ok(check.duplicated)
    }

    pub async fn check_username(&self, username: &str) -> AppResult<bool> {
        self.check_duplicate(CheckField::Username, username).await
    }

    pub async fn check_nickname(&self, nickname: &str) -> AppResult<bool> {
        self.check_duplicate(CheckField::Nickname, nickname).await
    }

    pub async fn check_email(&self, email: &str) -> AppResult<bool> {
        self.check_duplicate(CheckField::Email, email).await
    }

    pub async fn profile(&self) -> AppResult<UserProfile> {
        Ok(self.client.get(endpoints::USER_PROFILE).await?)
    }

    /// 只清除本地会话，不通知服务器
    pub fn logout(&self) -> AppResult<()> {
        self.client.auth().clear()?;
        info!("👋 已登出");
        Ok(())
    }

    /// 第三方登录入口，需要在浏览器中打开
    pub fn social_login_url(&self, provider: SocialProvider) -> String {
        self.client.url_for(&endpoints::social_authorize(provider.as_str()))
    }

    /// 处理第三方登录回调地址
    ///
    /// # 参数
    /// - `callback_url`: 浏览器最终停留的地址，或者只是它的查询串
    ///
    /// # 返回
    /// 回调中带有 `Authorization` 参数时保存为 access token 并返回 `true`
    pub fn complete_social_login(&self, callback_url: &str) -> AppResult<bool> {
        match extract_authorization(callback_url)? {
            Some(token) => {
                self.client.auth().set_access_token(token.as_str())?;
                info!("✅ 第三方登录成功 (token: {})", mask_token(&token));
                Ok(true)
            }
            None => {
                warn!("⚠️ 回调地址中没有 Authorization 参数");
                Ok(false)
            }
        }
    }
}

fn extract_authorization(callback_url: &str) -> Result<Option<String>, ApiError> {
    let re = Regex::new(r"[?&]Authorization=([^&#]*)")
        .map_err(|e| ApiError::invalid_request(format!("回调地址解析失败: {}", e)))?;

    Ok(re
        .captures(callback_url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty()))
}
