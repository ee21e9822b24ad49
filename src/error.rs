use serde::Serialize;
use thiserror::Error;

/// 服务器未返回 message 时使用的提示
pub const UNKNOWN_ERROR_MESSAGE: &str = "未知错误";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 会话存储错误
    #[error("会话存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

// ========== API 错误 ==========

/// 归一化后的错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 没有收到响应
    Network,
    /// 服务器 5xx 或响应格式错误
    Server,
    /// 4xx 或本地请求构造失败
    Client,
}

/// 交给调用方（展示层）的统一错误形态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

/// 凭证刷新失败的原因
///
/// 需要 `Clone`：同一次刷新的结果会分发给所有等待中的请求。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("没有可用的 refresh token")]
    MissingRefreshToken,
    #[error("刷新请求被拒绝 (HTTP {status}): {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Rejected { status: u16, message: Option<String> },
    #[error("刷新请求无响应: {0}")]
    Network(String),
    #[error("刷新响应格式错误: {0}")]
    MalformedResponse(String),
    #[error("新凭证持久化失败: {0}")]
    Persist(String),
    #[error("刷新后重放的请求仍被拒绝")]
    RetryRejected,
}

impl RefreshFailure {
    /// 失败对应的 HTTP 状态码（如果有）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RefreshFailure::Rejected { status, .. } => Some(*status),
            RefreshFailure::RetryRejected => Some(401),
            _ => None,
        }
    }
}

/// 请求层返回给调用方的错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401，且该请求不参与自动刷新
    #[error("未授权 ({url}): {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Unauthorized { url: String, message: Option<String> },
    /// 刷新失败，会话已被清除
    #[error("登录状态已失效: {reason}")]
    RefreshFailed { reason: RefreshFailure },
    /// 请求已发出但没有收到响应
    #[error("服务器无响应 ({url}): {source}")]
    NetworkUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 5xx
    #[error("服务器错误 ({url}, HTTP {status}): {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Server {
        url: String,
        status: u16,
        message: Option<String>,
    },
    /// 4xx
    #[error("请求错误 ({url}, HTTP {status}): {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Client {
        url: String,
        status: u16,
        message: Option<String>,
    },
    /// 响应体不是预期的格式
    #[error("响应解析失败 ({url}): {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// 请求在本地就无法构造
    #[error("请求无效: {message}")]
    InvalidRequest { message: String },
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NetworkUnavailable { .. } => ErrorKind::Network,
            ApiError::Server { .. } | ApiError::Decode { .. } => ErrorKind::Server,
            ApiError::Unauthorized { .. }
            | ApiError::RefreshFailed { .. }
            | ApiError::Client { .. }
            | ApiError::InvalidRequest { .. } => ErrorKind::Client,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::RefreshFailed { reason } => reason.http_status(),
            ApiError::Server { status, .. } | ApiError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 面向用户的提示：优先使用服务器返回的 message
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Client { message, .. } => message
                .clone()
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            ApiError::NetworkUnavailable { .. } => "服务器无响应".to_string(),
            ApiError::RefreshFailed { reason } => format!("登录状态已失效，请重新登录 ({})", reason),
            ApiError::Decode { .. } => "服务器返回了无法解析的数据".to_string(),
            ApiError::InvalidRequest { message } => message.clone(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.message(),
            http_status: self.http_status(),
        }
    }
}

// ========== 会话存储错误 ==========

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读取会话文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入会话文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("删除会话文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("会话文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("会话序列化失败: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
}

// ========== 配置错误 ==========

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置项 {key} 的值 '{value}' 无效: 需要 {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
