/// 作品服务
///
/// 标签、我的作品、作品详情、新建 / 修改作品和搜索
use crate::client::{ApiClient, PendingRequest};
use crate::endpoints;
use crate::error::ApiError;
use crate::models::{NewNovel, NovelDetails, NovelId, NovelSummary, NovelUpdate, Page, SearchQuery, Tag};
use crate::services::paged;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct NovelService {
    client: ApiClient,
}

impl NovelService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.client.get(endpoints::TAGS).await
    }

    /// 当前用户的作品
    ///
    /// # 参数
    /// - `page`: 页码，从 1 开始
    /// - `size`: 每页条数
    pub async fn my_novels(&self, page: u32, size: u32) -> Result<Page<NovelSummary>, ApiError> {
        self.client
            .send(paged(PendingRequest::get(endpoints::MY_NOVELS), page, size))
            .await
    }

    pub async fn details(&self, novel_id: NovelId) -> Result<NovelDetails, ApiError> {
        self.client.get(&endpoints::novel(novel_id)).await
    }

    /// 新建作品，返回服务器给的 `data`
    pub async fn create(&self, novel: &NewNovel) -> Result<Value, ApiError> {
        if novel.title.trim().is_empty() {
            return Err(ApiError::invalid_request("作品标题不能为空"));
        }
        let created: Value = self.client.post(endpoints::NOVELS, novel).await?;
        info!("📚 作品已创建: {}", novel.title);
        Ok(created)
    }

    /// 修改作品（multipart，可带封面）
    pub async fn update(&self, novel_id: NovelId, update: NovelUpdate) -> Result<(), ApiError> {
        let title = update.title.clone();
        let request = PendingRequest::patch(endpoints::novel(novel_id)).with_form(update.into_form());
        self.client.send_unit(request).await?;
        info!("📝 作品已修改: {} ({})", title, novel_id);
        Ok(())
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Page<NovelSummary>, ApiError> {
        debug!(
            "搜索作品: keyword={}, sc={}, oc={}, page={}",
            query.keyword, query.scope, query.order, query.page
        );
        let request = PendingRequest::get(endpoints::NOVEL_SEARCH).with_query_pairs(query.to_query());
        self.client.send(request).await
    }
}
