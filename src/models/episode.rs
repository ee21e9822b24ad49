use crate::client::request::FormPart;
use crate::models::{de, CoverImage, EpisodeId, NovelId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 回次列表项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    pub id: EpisodeId,
    #[serde(default)]
    pub episode_number: u32,
    pub title: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub recommendation_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

/// 回次正文
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDetails {
    #[serde(default)]
    pub id: Option<EpisodeId>,
    pub novel_id: NovelId,
    #[serde(default)]
    pub episode_number: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_review: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub recommendation_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub prev_episode_id: Option<EpisodeId>,
    #[serde(default)]
    pub next_episode_id: Option<EpisodeId>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

/// 新建 / 编辑回次（multipart）
#[derive(Debug, Clone)]
pub struct EpisodeDraft {
    pub title: String,
    pub author_review: String,
    pub content: String,
    pub cover: Option<CoverImage>,
}

impl EpisodeDraft {
    pub fn into_form(self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("title", self.title),
            FormPart::text("authorReview", self.author_review),
            FormPart::text("content", self.content),
        ];
        if let Some(cover) = self.cover {
            parts.push(FormPart::file("cover", cover));
        }
        parts
    }
}
