use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 所有接口统一的响应外壳 `{ statusCode, message, data }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    /// 外壳里的 statusCode 是否表示失败（HTTP 200 也可能带着错误码）
    pub fn is_error(&self) -> bool {
        self.status_code.is_some_and(|code| code >= 400)
    }
}

/// 分页结果
///
/// `page_number` 从 0 开始计数；请求时传的 `page` 从 1 开始。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page_number.saturating_add(1) < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_code() {
        let ok: ApiResponse =
            serde_json::from_str(r#"{"statusCode":200,"message":"ok","data":{"id":1}}"#).unwrap();
        assert!(!ok.is_error());
        assert_eq!(ok.data["id"], 1);

        let failed: ApiResponse =
            serde_json::from_str(r#"{"statusCode":409,"message":"중복"}"#).unwrap();
        assert!(failed.is_error());
        assert!(failed.data.is_null());
    }

    #[test]
    fn page_navigation() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"content":[1,2],"pageNumber":0,"totalPages":3,"totalElements":25}"#,
        )
        .unwrap();
        assert!(page.has_next());
        assert_eq!(page.total_elements, 25);

        let last: Page<u32> = serde_json::from_str(r#"{"pageNumber":2,"totalPages":3}"#).unwrap();
        assert!(last.is_empty());
        assert!(!last.has_next());

        let bogus: Page<u32> =
            serde_json::from_str(r#"{"pageNumber":4294967295,"totalPages":3}"#).unwrap();
        assert!(!bogus.has_next());
    }
}
