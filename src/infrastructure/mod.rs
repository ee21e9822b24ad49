//! 基础设施层：持有稀缺资源（连接池），只暴露能力

pub mod http_executor;
pub mod redirect;

pub use http_executor::HttpExecutor;
pub use redirect::{LogRedirect, LoginRedirect};
