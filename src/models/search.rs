use std::fmt;
use std::str::FromStr;

/// 搜索范围（`sc` 参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    All,
    Title,
    Author,
}

/// 排序方式（`oc` 参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    /// 按浏览量
    #[default]
    View,
    /// 按公开日期
    New,
    /// 按更新时间
    Update,
}

impl SearchScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchScope::All => "all",
            SearchScope::Title => "title",
            SearchScope::Author => "author",
        }
    }
}

impl SearchOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOrder::View => "view",
            SearchOrder::New => "new",
            SearchOrder::Update => "update",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SearchScope::All),
            "title" => Ok(SearchScope::Title),
            "author" => Ok(SearchScope::Author),
            other => Err(format!("未知的搜索范围: {}", other)),
        }
    }
}

impl FromStr for SearchOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(SearchOrder::View),
            "new" => Ok(SearchOrder::New),
            "update" => Ok(SearchOrder::Update),
            other => Err(format!("未知的排序方式: {}", other)),
        }
    }
}

/// 作品搜索条件
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub keyword: String,
    pub scope: SearchScope,
    pub order: SearchOrder,
    /// 从 1 开始
    pub page: u32,
    pub size: u32,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            scope: SearchScope::default(),
            order: SearchOrder::default(),
            page: 1,
            size: 10,
        }
    }

    /// 查询参数，顺序与服务器约定一致
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("sort_dir".to_string(), "desc".to_string()),
            ("sc".to_string(), self.scope.to_string()),
            ("keyword".to_string(), self.keyword.clone()),
            ("oc".to_string(), self.order.to_string()),
            ("page".to_string(), self.page.max(1).to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters() {
        let query = SearchQuery {
            scope: SearchScope::Author,
            order: SearchOrder::Update,
            page: 0,
            ..SearchQuery::new("검사")
        };
        let pairs = query.to_query();
        assert_eq!(pairs[0], ("sort_dir".to_string(), "desc".to_string()));
        assert_eq!(pairs[1].1, "author");
        assert_eq!(pairs[2].1, "검사");
        assert_eq!(pairs[3].1, "update");
        // 页码最小为 1
        assert_eq!(pairs[4].1, "1");
    }
}
