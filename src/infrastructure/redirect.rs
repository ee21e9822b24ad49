//! 跳转登录页的能力
//!
//! 会话彻底失效时调用，由使用方决定"跳转"具体做什么。

use tracing::warn;

pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, login_path: &str);
}

/// 默认实现：只记一条日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        warn!("🔐 登录已失效，请重新登录: {}", login_path);
    }
}
