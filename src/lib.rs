//! # Webnovel Client
//!
//! 网络小说平台的带认证 API 客户端
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 会话层（Session）
//! - `session/` - 凭证及其持久化，依赖方向上的叶子
//! - `AuthState` - 可注入的会话句柄，内存与存储同步修改
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有连接池，只暴露"构造 / 发送请求"的能力
//! - `HttpExecutor` - 唯一的 reqwest::Client 持有者
//! - `LoginRedirect` - 会话失效时的跳转动作
//!
//! ### ③ 请求客户端层（Client）
//! - `client/` - 附加 Bearer、401 刷新后重放一次、错误归一化
//! - `RefreshCoordinator` - 单飞刷新，失败时清除会话并跳转一次
//!
//! ### ④ 业务服务层（Services）
//! - `services/` - 账号、作品、回次、评论
//!
//! ## 模块结构

pub mod app;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

// 重新导出常用类型
pub use client::{ApiClient, PendingRequest, RefreshPhase};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, ErrorKind, ErrorReport, RefreshFailure};
pub use infrastructure::{LogRedirect, LoginRedirect};
pub use services::{AuthService, CommentService, EpisodeService, NovelService};
pub use session::{AuthState, Credential};
