use crate::client::request::FormPart;
use crate::models::{de, CoverImage, NovelId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// 作品连载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NovelStatus {
    Ongoing,
    Completed,
    Hiatus,
}

impl NovelStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NovelStatus::Ongoing => "ONGOING",
            NovelStatus::Completed => "COMPLETED",
            NovelStatus::Hiatus => "HIATUS",
        }
    }
}

impl fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NovelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONGOING" => Ok(NovelStatus::Ongoing),
            "COMPLETED" => Ok(NovelStatus::Completed),
            "HIATUS" => Ok(NovelStatus::Hiatus),
            other => Err(format!("未知的作品状态: {}", other)),
        }
    }
}

/// 列表 / 搜索结果中的作品
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelSummary {
    #[serde(alias = "id")]
    pub novel_id: NovelId,
    pub title: String,
    #[serde(default)]
    pub author_nickname: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub publish_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub last_update_date: Option<NaiveDateTime>,
}

/// 作品详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDetails {
    pub title: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub author_nickname: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<NovelStatus>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub total_episode_count: u64,
    #[serde(default)]
    pub total_view_count: u64,
    #[serde(default, alias = "totalPreferenceCount")]
    pub total_recommendation_count: u64,
    #[serde(default)]
    pub total_subscriber_count: u64,
    #[serde(default)]
    pub total_comment_count: u64,
}

/// 新建作品（JSON）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNovel {
    pub title: String,
    pub synopsis: String,
    pub tag_ids: Vec<u64>,
}

/// 修改作品（multipart）
#[derive(Debug, Clone)]
pub struct NovelUpdate {
    pub title: String,
    pub synopsis: String,
    pub status: NovelStatus,
    pub tag_ids: Vec<u64>,
    pub cover: Option<CoverImage>,
}

impl NovelUpdate {
    /// `tagIds` 每个 ID 单独一项
    pub fn into_form(self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("title", self.title),
            FormPart::text("synopsis", self.synopsis),
            FormPart::text("status", self.status.as_str()),
        ];
        parts.extend(
            self.tag_ids
                .iter()
                .map(|id| FormPart::text("tagIds", id.to_string())),
        );
        if let Some(cover) = self.cover {
            parts.push(FormPart::file("cover", cover));
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_accept_preference_alias() {
        let details: NovelDetails = serde_json::from_str(
            r#"{"title":"회귀한 검사","synopsis":"...","tags":["판타지"],"status":"ONGOING","totalPreferenceCount":12}"#,
        )
        .unwrap();
        assert_eq!(details.total_recommendation_count, 12);
        assert_eq!(details.status, Some(NovelStatus::Ongoing));
        assert_eq!(details.total_view_count, 0);
    }

    #[test]
    fn update_form_repeats_tag_ids() {
        let update = NovelUpdate {
            title: "제목".to_string(),
            synopsis: "소개".to_string(),
            status: NovelStatus::Hiatus,
            tag_ids: vec![3, 8],
            cover: Some(CoverImage::new("c.png", "image/png", vec![0])),
        };
        let parts = update.into_form();
        let names: Vec<&str> = parts.iter().map(FormPart::name).collect();
        assert_eq!(names, ["title", "synopsis", "status", "tagIds", "tagIds", "cover"]);
        assert_eq!(parts[2], FormPart::text("status", "HIATUS"));
    }

    #[test]
    fn summary_uses_novel_id_or_id() {
        let a: NovelSummary = serde_json::from_str(r#"{"novelId":4,"title":"a","publishDate":"2024-09-30"}"#).unwrap();
        let b: NovelSummary = serde_json::from_str(r#"{"id":5,"title":"b","lastUpdateDate":null}"#).unwrap();
        assert_eq!(a.novel_id, 4);
        assert!(a.publish_date.is_some());
        assert_eq!(b.novel_id, 5);
        assert!(b.last_update_date.is_none());
    }
}
