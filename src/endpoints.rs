//! 后端接口路径
//!
//! 只保存相对路径，基础地址由配置决定。

use crate::models::{CommentId, EpisodeId, NovelId};

pub const LOGIN: &str = "/api/auth/login";
pub const SIGNUP: &str = "/api/auth/signup";
pub const REFRESH: &str = "/api/auth/refresh";

pub const CHECK_USERNAME: &str = "/api/users/check/username";
pub const CHECK_NICKNAME: &str = "/api/users/check/nickname";
pub const CHECK_EMAIL: &str = "/api/users/check/email";
pub const USER_PROFILE: &str = "/api/users/me";

pub const TAGS: &str = "/api/tags";
pub const NOVELS: &str = "/api/novels";
pub const MY_NOVELS: &str = "/api/novels/me";
pub const NOVEL_SEARCH: &str = "/api/novels/search";

pub fn novel(novel_id: NovelId) -> String {
    format!("{}/{}", NOVELS, novel_id)
}

pub fn episodes(novel_id: NovelId) -> String {
    format!("{}/episodes", novel(novel_id))
}

pub fn novel_episode(novel_id: NovelId, episode_id: EpisodeId) -> String {
    format!("{}/{}", episodes(novel_id), episode_id)
}

pub fn episode(episode_id: EpisodeId) -> String {
    format!("/api/episodes/{}", episode_id)
}

pub fn episode_views(episode_id: EpisodeId) -> String {
    format!("{}/views", episode(episode_id))
}

pub fn episode_recommendations(episode_id: EpisodeId) -> String {
    format!("{}/recommendations", episode(episode_id))
}

pub fn comments(novel_id: NovelId, episode_id: EpisodeId) -> String {
    format!("{}/comments", novel_episode(novel_id, episode_id))
}

pub fn comment(novel_id: NovelId, episode_id: EpisodeId, comment_id: CommentId) -> String {
    format!("{}/{}", comments(novel_id, episode_id), comment_id)
}

/// 第三方登录入口（不是 API，浏览器直接打开）
pub fn social_authorize(provider: &str) -> String {
    format!("/oauth2/authorize/{}", provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths() {
        assert_eq!(novel_episode(3, 14), "/api/novels/3/episodes/14");
        assert_eq!(comment(3, 14, 15), "/api/novels/3/episodes/14/comments/15");
        assert_eq!(episode_views(14), "/api/episodes/14/views");
        assert_eq!(social_authorize("naver"), "/oauth2/authorize/naver");
    }
}
