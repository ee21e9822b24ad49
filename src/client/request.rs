//! 待发送请求的描述
//!
//! 401 之后需要原样重放，所以请求先保存成可克隆的描述，
//! 每次发送时再构造 `reqwest::Request`。

use crate::error::ApiError;
use crate::models::CoverImage;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// multipart 表单的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: CoverImage },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, file: CoverImage) -> Self {
        FormPart::File {
            name: name.into(),
            file,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// 每次发送都重新构造 multipart 表单
    pub(crate) fn to_form(parts: &[FormPart]) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File { name, file } => {
                    let body = Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)
                        .map_err(|e| {
                            ApiError::invalid_request(format!(
                                "无效的文件类型 {}: {}",
                                file.content_type, e
                            ))
                        })?;
                    form.part(name.clone(), body)
                }
            };
        }
        Ok(form)
    }
}

/// 待发送（或待重放）的请求
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    retried: bool,
    refresh_exempt: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
            refresh_exempt: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::invalid_request(format!("请求体序列化失败: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_form(self, parts: Vec<FormPart>) -> Self {
        self.with_body(RequestBody::Multipart(parts))
    }

    /// 401 时不尝试刷新，直接返回给调用方（登录、注册、刷新本身）
    pub fn refresh_exempt(mut self) -> Self {
        self.refresh_exempt = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub fn is_refresh_exempt(&self) -> bool {
        self.refresh_exempt
    }

    /// 一次性标记：刷新后重放前调用
    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_everything_for_replay() {
        let mut request = PendingRequest::post("/api/novels")
            .with_query("page", 1)
            .with_json(&json!({ "title": "귀환" }))
            .unwrap();
        assert!(!request.is_retried());

        let replay = request.clone();
        request.mark_retried();
        assert!(request.is_retried());
        assert!(!replay.is_retried());
        assert_eq!(replay.query(), &[("page".to_string(), "1".to_string())]);
        assert_eq!(replay.body(), &RequestBody::Json(json!({ "title": "귀환" })));
    }

    #[test]
    fn invalid_mime_is_rejected_before_sending() {
        let parts = vec![
            FormPart::text("title", "1화"),
            FormPart::file("cover", CoverImage::new("c.png", "not a mime", vec![1])),
        ];
        let err = RequestBody::to_form(&parts).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }
}
