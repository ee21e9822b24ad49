/// 回次服务
///
/// 回次列表、阅读、发布 / 编辑 / 删除，以及阅读数和推荐数
use crate::client::{ApiClient, PendingRequest};
use crate::endpoints;
use crate::error::ApiError;
use crate::models::{EpisodeDetails, EpisodeDraft, EpisodeId, EpisodeSummary, NovelId, Page};
use crate::services::paged;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EpisodeService {
    client: ApiClient,
}

impl EpisodeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        novel_id: NovelId,
        page: u32,
        size: u32,
    ) -> Result<Page<EpisodeSummary>, ApiError> {
        self.client
            .send(paged(PendingRequest::get(endpoints::episodes(novel_id)), page, size))
            .await
    }

    pub async fn get(&self, episode_id: EpisodeId) -> Result<EpisodeDetails, ApiError> {
        self.client.get(&endpoints::episode(episode_id)).await
    }

    /// 阅读回次
    ///
    /// 先取正文，再增加阅读数；阅读数更新失败只记录日志，不影响阅读。
    pub async fn read(&self, episode_id: EpisodeId) -> Result<EpisodeDetails, ApiError> {
        let episode = self.get(episode_id).await?;
        if let Err(e) = self.increase_view(episode_id).await {
            warn!("⚠️ 阅读数更新失败 (回次 {}): {}", episode_id, e);
        }
        Ok(episode)
    }

    /// 发布新回次
    ///
    /// # 参数
    /// - `novel_id`: 所属作品
    /// - `draft`: 标题、作者的话、正文和可选封面
    pub async fn create(&self, novel_id: NovelId, draft: EpisodeDraft) -> Result<(), ApiError> {
        validate(&draft)?;
        let title = draft.title.clone();
        let request = PendingRequest::post(endpoints::episodes(novel_id)).with_form(draft.into_form());
        self.client.send_unit(request).await?;
        info!("📖 回次已发布: {} (作品 {})", title, novel_id);
        Ok(())
    }

    pub async fn edit(
        &self,
        novel_id: NovelId,
        episode_id: EpisodeId,
        draft: EpisodeDraft,
    ) -> Result<(), ApiError> {
        validate(&draft)?;
        let request = PendingRequest::patch(endpoints::novel_episode(novel_id, episode_id))
            .with_form(draft.into_form());
        self.client.send_unit(request).await
    }

    pub async fn delete(&self, novel_id: NovelId, episode_id: EpisodeId) -> Result<(), ApiError> {
        self.client
            .delete(&endpoints::novel_episode(novel_id, episode_id))
            .await?;
        info!("🗑️ 回次已删除: {} (作品 {})", episode_id, novel_id);
        Ok(())
    }

    pub async fn increase_view(&self, episode_id: EpisodeId) -> Result<(), ApiError> {
        self.client.patch(&endpoints::episode_views(episode_id)).await
    }

    pub async fn recommend(&self, episode_id: EpisodeId) -> Result<(), ApiError> {
        self.client
            .patch(&endpoints::episode_recommendations(episode_id))
            .await
    }
}

fn validate(draft: &EpisodeDraft) -> Result<(), ApiError> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::invalid_request("回次标题不能为空"));
    }
    if draft.content.trim().is_empty() {
        return Err(ApiError::invalid_request("正文不能为空"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_is_rejected() {
        let draft = EpisodeDraft {
            title: "1화".to_string(),
            author_review: String::new(),
            content: "  ".to_string(),
            cover: None,
        };
        assert!(matches!(validate(&draft), Err(ApiError::InvalidRequest { .. })));

        let draft = EpisodeDraft {
            content: "본문".to_string(),
            ..draft
        };
        assert!(validate(&draft).is_ok());
    }
}
