pub mod auth_service;
pub mod comment_service;
pub mod episode_service;
pub mod novel_service;

pub use auth_service::{AuthService, CheckField};
pub use comment_service::CommentService;
pub use episode_service::EpisodeService;
pub use novel_service::NovelService;

use crate::client::PendingRequest;

/// 分页参数，页码从 1 开始
pub(crate) fn paged(request: PendingRequest, page: u32, size: u32) -> PendingRequest {
    request
        .with_query("page", page.max(1))
        .with_query("size", size)
}
