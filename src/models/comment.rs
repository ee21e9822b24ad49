use crate::models::{de, CommentId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub author_user_name: Option<String>,
    pub content: String,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub commented_at: Option<NaiveDateTime>,
}

impl Comment {
    /// 是否是当前用户写的评论
    pub fn is_written_by(&self, subject_id: Option<&str>) -> bool {
        matches!((self.user_id.as_deref(), subject_id), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentBody {
    pub content: String,
}
