pub mod auth;
pub mod comment;
pub mod cover;
pub mod envelope;
pub mod episode;
pub mod novel;
pub mod search;

pub use auth::{DuplicateCheck, LoginRequest, SignupRequest, SocialProvider, TokenPair, UserProfile};
pub use comment::{Comment, CommentBody};
pub use cover::CoverImage;
pub use envelope::{ApiResponse, Page};
pub use episode::{EpisodeDetails, EpisodeDraft, EpisodeSummary};
pub use novel::{NewNovel, NovelDetails, NovelStatus, NovelSummary, NovelUpdate, Tag};
pub use search::{SearchOrder, SearchQuery, SearchScope};

pub type NovelId = u64;
pub type EpisodeId = u64;
pub type CommentId = u64;

/// 反序列化辅助函数
pub(crate) mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::{self, Visitor};
    use serde::Deserializer;
    use std::fmt;

    /// 用户 ID 有时是字符串，有时是数字，统一成字符串
    pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = Option<String>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer id")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(value.to_string()))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }

    /// 时间字段：接受 `2024-10-01T12:00:00(.fff)`、RFC 3339 和纯日期
    pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_datetime(text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("无法解析时间: {}", text))),
        }
    }

    pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
        if let Ok(value) = text.parse::<NaiveDateTime>() {
            return Some(value);
        }
        if let Ok(value) = DateTime::parse_from_rfc3339(text) {
            return Some(value.naive_utc());
        }
        text.parse::<NaiveDate>()
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::de::parse_datetime;

    #[test]
    fn datetime_formats() {
        assert!(parse_datetime("2024-10-01T12:30:00").is_some());
        assert!(parse_datetime("2024-10-01T12:30:00.123456").is_some());
        assert!(parse_datetime("2024-10-01T12:30:00+09:00").is_some());
        assert_eq!(
            parse_datetime("2024-10-01").map(|d| d.to_string()),
            Some("2024-10-01 00:00:00".to_string())
        );
        assert!(parse_datetime("어제").is_none());
    }
}
