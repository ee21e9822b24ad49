/// 评论服务
use crate::client::{ApiClient, PendingRequest};
use crate::endpoints;
use crate::error::ApiError;
use crate::models::{Comment, CommentBody, CommentId, EpisodeId, NovelId};

#[derive(Debug, Clone)]
pub struct CommentService {
    client: ApiClient,
}

impl CommentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, novel_id: NovelId, episode_id: EpisodeId) -> Result<Vec<Comment>, ApiError> {
        let comments: Option<Vec<Comment>> = self
            .client
            .get(&endpoints::comments(novel_id, episode_id))
            .await?;
        Ok(comments.unwrap_or_default())
    }

    pub async fn create(
        &self,
        novel_id: NovelId,
        episode_id: EpisodeId,
        content: &str,
    ) -> Result<(), ApiError> {
        let request = PendingRequest::post(endpoints::comments(novel_id, episode_id))
            .with_json(&body(content)?)?;
        self.client.send_unit(request).await
    }

    pub async fn update(
        &self,
        novel_id: NovelId,
        episode_id: EpisodeId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<(), ApiError> {
        let request = PendingRequest::patch(endpoints::comment(novel_id, episode_id, comment_id))
            .with_json(&body(content)?)?;
        self.client.send_unit(request).await
    }

    pub async fn delete(
        &self,
        novel_id: NovelId,
        episode_id: EpisodeId,
        comment_id: CommentId,
    ) -> Result<(), ApiError> {
        self.client
            .delete(&endpoints::comment(novel_id, episode_id, comment_id))
            .await
    }
}

fn body(content: &str) -> Result<CommentBody, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid_request("评论内容不能为空"));
    }
    Ok(CommentBody {
        content: content.to_string(),
    })
}
