//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest::Client，只暴露"构造请求 / 发送请求"的能力

use crate::client::normalize;
use crate::client::request::{PendingRequest, RequestBody};
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Request, Response};
use tracing::debug;

/// HTTP 执行器
///
/// 职责：
/// - 持有连接池
/// - 把 `PendingRequest` 变成真正的请求
/// - 不认识凭证，不处理 401
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::invalid_request(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 相对路径拼上基础地址，绝对地址原样返回
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// 根据描述构造请求（不带 Authorization）
    pub fn build(&self, request: &PendingRequest) -> Result<Request, ApiError> {
        let url = self.url_for(request.path());
        let mut builder = self.client.request(request.method().clone(), &url);

        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(RequestBody::to_form(parts)?),
        };

        builder
            .build()
            .map_err(|e| normalize::transport_error(&url, e))
    }

    /// 发送请求，没有响应时返回 `NetworkUnavailable`
    pub async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let url = request.url().to_string();
        debug!("→ {} {}", request.method(), url);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| normalize::transport_error(&url, e))?;

        debug!("← {} {}", response.status().as_u16(), url);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::request::FormPart;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;

    #[test]
    fn url_joining() {
        let executor = HttpExecutor::new("http://localhost:8080/").unwrap();
        assert_eq!(executor.url_for("/api/tags"), "http://localhost:8080/api/tags");
        assert_eq!(executor.url_for("api/tags"), "http://localhost:8080/api/tags");
        assert_eq!(executor.url_for("https://cdn.example.com/x"), "https://cdn.example.com/x");
    }

    #[test]
    fn build_applies_query_and_body() {
        let executor = HttpExecutor::new("http://localhost:8080").unwrap();
        let request = PendingRequest::post("/api/novels")
            .with_query("page", 2)
            .with_json(&json!({ "title": "t" }))
            .unwrap();

        let built = executor.build(&request).unwrap();
        assert_eq!(built.url().as_str(), "http://localhost:8080/api/novels?page=2");
        assert_eq!(
            built.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(built.headers().get("authorization").is_none());
    }

    #[test]
    fn multipart_sets_boundary_content_type() {
        let executor = HttpExecutor::new("http://localhost:8080").unwrap();
        let request = PendingRequest::patch("/api/novels/1")
            .with_form(vec![FormPart::text("title", "t")]);

        let built = executor.build(&request).unwrap();
        let content_type = built.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }
}
