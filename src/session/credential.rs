use serde::{Deserialize, Serialize};

/// 登录凭证
///
/// 序列化后的三个键与会话文件中的键一一对应：
/// `accessToken` / `refreshToken` / `userId`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        subject_id: Option<String>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
            subject_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.subject_id.is_none()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_not_serialized() {
        let credential = Credential::new("access", None, Some("7".to_string()));
        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": "access", "userId": "7" }));
        assert!(!credential.has_refresh_token());
        assert!(!Credential::new("access", Some(String::new()), None).has_refresh_token());
        assert!(Credential::default().is_empty());
    }
}
