use crate::models::de;
use crate::session::Credential;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub name: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// 登录 / 刷新接口返回的令牌
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub user_id: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// 转成凭证；响应里缺失的 refresh token / userId 沿用旧值
    pub fn into_credential(self, previous: &Credential) -> Credential {
        Credential {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token.or_else(|| previous.refresh_token.clone()),
            subject_id: self.user_id.or_else(|| previous.subject_id.clone()),
        }
    }
}

/// 用户名 / 昵称 / 邮箱重复检查结果
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DuplicateCheck {
    pub duplicated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 第三方登录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Naver,
}

impl SocialProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Naver => "naver",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(SocialProvider::Google),
            "naver" => Ok(SocialProvider::Naver),
            other => Err(format!("不支持的登录方式: {}", other)),
        }
    }
}
