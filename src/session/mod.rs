//! 认证状态（叶子模块）
//!
//! - `credential` - 凭证数据
//! - `storage` - 持久化能力（内存 / TOML 文件）
//! - `state` - 可注入的 `AuthState` 句柄

pub mod credential;
pub mod state;
pub mod storage;

pub use credential::Credential;
pub use state::AuthState;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
