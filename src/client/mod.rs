//! 请求客户端层
//!
//! 拦截器、刷新协调、错误归一化都在这里，上层服务只和 `ApiClient` 打交道。

pub mod api_client;
pub mod interceptor;
pub(crate) mod normalize;
pub mod refresh;
pub mod request;

pub use api_client::ApiClient;
pub use refresh::{RefreshCoordinator, RefreshPhase};
pub use request::{FormPart, PendingRequest, RequestBody};
