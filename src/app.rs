use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ErrorKind, ErrorReport};
use crate::infrastructure::LoginRedirect;
use crate::models::{
    CoverImage, EpisodeDraft, EpisodeId, NewNovel, NovelId, NovelStatus, NovelUpdate, SearchOrder,
    SearchQuery, SearchScope, SignupRequest, SocialProvider,
};
use crate::services::{AuthService, CheckField, CommentService, EpisodeService, NovelService};
use crate::session::{AuthState, FileSessionStorage};
use crate::utils::logging::log_startup;
use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// 命令行子命令
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 用户名密码登录
    Login {
        username: String,
        #[arg(long, env = "WEBNOVEL_PASSWORD")]
        password: String,
    },
    /// 清除本地会话
    Logout,
    /// 注册（先检查用户名、昵称、邮箱是否重复）
    Signup {
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "WEBNOVEL_PASSWORD")]
        password: String,
    },
    /// 第三方登录入口地址
    OauthUrl {
        #[arg(default_value = "google")]
        provider: SocialProvider,
    },
    /// 处理第三方登录回调地址
    OauthCallback { callback_url: String },
    /// 当前用户信息
    Whoami,
    /// 全部标签
    Tags,
    /// 我的作品
    MyNovels {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 作品详情
    Novel { novel_id: NovelId },
    /// 新建作品
    CreateNovel {
        title: String,
        #[arg(long, default_value = "")]
        synopsis: String,
        #[arg(long = "tag", value_delimiter = ',')]
        tag_ids: Vec<u64>,
    },
    /// 修改作品
    UpdateNovel {
        novel_id: NovelId,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        synopsis: String,
        #[arg(long, default_value = "ONGOING")]
        status: NovelStatus,
        #[arg(long = "tag", value_delimiter = ',')]
        tag_ids: Vec<u64>,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// 搜索作品
    Search {
        keyword: String,
        #[arg(long, default_value = "all")]
        scope: SearchScope,
        #[arg(long, default_value = "view")]
        order: SearchOrder,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 发布新回次，正文从文件读取
    Publish {
        novel_id: NovelId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content_file: PathBuf,
        #[arg(long, default_value = "")]
        review: String,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// 回次列表
    Episodes {
        novel_id: NovelId,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 阅读回次（阅读数 +1）
    Read { episode_id: EpisodeId },
    /// 推荐回次
    Recommend { episode_id: EpisodeId },
    /// 删除回次
    DeleteEpisode {
        novel_id: NovelId,
        episode_id: EpisodeId,
    },
    /// 评论列表
    Comments {
        novel_id: NovelId,
        episode_id: EpisodeId,
    },
    /// 发表评论
    Comment {
        novel_id: NovelId,
        episode_id: EpisodeId,
        content: String,
    },
    /// 删除评论
    DeleteComment {
        novel_id: NovelId,
        episode_id: EpisodeId,
        comment_id: u64,
    },
}

/// 命令行下的"跳转登录页"：提示重新登录
#[derive(Debug, Clone, Copy, Default)]
pub struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        eprintln!("🔐 登录已失效 ({})，请重新执行 `webnovel login`", login_path);
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    client: ApiClient,
    auth: AuthService,
    novels: NovelService,
    episodes: EpisodeService,
    comments: CommentService,
}

impl App {
    /// 初始化应用：恢复会话并创建各个服务
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let session = match config.session_file.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => AuthState::initialize(FileSessionStorage::new(path))?,
            _ => AuthState::in_memory(),
        };
        Self::with_session(config, session, Arc::new(CliRedirect))
    }

    /// 使用已有的会话和跳转方式创建应用
    pub fn with_session(
        config: Config,
        session: AuthState,
        redirect: Arc<dyn LoginRedirect>,
    ) -> AppResult<Self> {
        let client = ApiClient::with_redirect(&config, session, redirect)?;
        Ok(Self {
            auth: AuthService::new(client.clone()),
            novels: NovelService::new(client.clone()),
            episodes: EpisodeService::new(client.clone()),
            comments: CommentService::new(client.clone()),
            client,
            config,
        })
    }

    pub fn session(&self) -> &AuthState {
        self.client.auth()
    }

    /// 执行一条命令，返回要输出的 JSON
    pub async fn run(&self, command: Command) -> Result<Value> {
        let page_size = self.config.page_size;

        match command {
            Command::Login { username, password } => {
                let credential = self.auth.login(&username, &password).await?;
                Ok(json!({ "loggedIn": true, "userId": credential.subject_id }))
            }
            Command::Logout => {
                self.auth.logout()?;
                Ok(json!({ "loggedIn": false }))
            }
            Command::Signup {
                username,
                name,
                nickname,
                email,
                password,
            } => {
                for (field, value) in [
                    (CheckField::Username, &username),
                    (CheckField::Nickname, &nickname),
                    (CheckField::Email, &email),
                ] {
                    if self.auth.check_duplicate(field, value).await? {
                        return Err(AppError::from(ApiError::invalid_request(format!(
                            "{} 已被使用",
                            value
                        )))
                        .into());
                    }
                }
                let request = SignupRequest {
                    username,
                    name,
                    nickname,
                    email,
                    password,
                };
                self.auth.signup(&request).await?;
                info!("🎉 注册成功: {}", request.username);
                Ok(json!({ "signedUp": true, "username": request.username }))
            }
            Command::OauthUrl { provider } => {
                Ok(json!({ "url": self.auth.social_login_url(provider) }))
            }
            Command::OauthCallback { callback_url } => {
                let logged_in = self.auth.complete_social_login(&callback_url)?;
                Ok(json!({ "loggedIn": logged_in }))
            }
            Command::Whoami => to_json(&self.auth.profile().await?),
            Command::Tags => to_json(&self.novels.tags().await?),
            Command::MyNovels { page } => to_json(&self.novels.my_novels(page, page_size).await?),
            Command::Novel { novel_id } => to_json(&self.novels.details(novel_id).await?),
            Command::CreateNovel {
                title,
                synopsis,
                tag_ids,
            } => {
                let novel = NewNovel {
                    title,
                    synopsis,
                    tag_ids,
                };
                Ok(self.novels.create(&novel).await?)
            }
            Command::UpdateNovel {
                novel_id,
                title,
                synopsis,
                status,
                tag_ids,
                cover,
            } => {
                let update = NovelUpdate {
                    title,
                    synopsis,
                    status,
                    tag_ids,
                    cover: load_cover(cover.as_deref()).await?,
                };
                self.novels.update(novel_id, update).await?;
                Ok(json!({ "updated": novel_id }))
            }
            Command::Search {
                keyword,
                scope,
                order,
                page,
            } => {
                let query = SearchQuery {
                    scope,
                    order,
                    page,
                    size: page_size,
                    ..SearchQuery::new(keyword)
                };
                to_json(&self.novels.search(&query).await?)
            }
            Command::Publish {
                novel_id,
                title,
                content_file,
                review,
                cover,
            } => {
                let content = tokio::fs::read_to_string(&content_file)
                    .await
                    .with_context(|| format!("读取正文失败: {}", content_file.display()))?;
                let draft = EpisodeDraft {
                    title,
                    author_review: review,
                    content,
                    cover: load_cover(cover.as_deref()).await?,
                };
                self.episodes.create(novel_id, draft).await?;
                Ok(json!({ "published": true, "novelId": novel_id }))
            }
            Command::Episodes { novel_id, page } => {
                to_json(&self.episodes.list(novel_id, page, page_size).await?)
            }
            Command::Read { episode_id } => to_json(&self.episodes.read(episode_id).await?),
            Command::Recommend { episode_id } => {
                self.episodes.recommend(episode_id).await?;
                Ok(json!({ "recommended": episode_id }))
            }
            Command::DeleteEpisode {
                novel_id,
                episode_id,
            } => {
                self.episodes.delete(novel_id, episode_id).await?;
                Ok(json!({ "deleted": episode_id }))
            }
            Command::Comments {
                novel_id,
                episode_id,
            } => {
                let comments = self.comments.list(novel_id, episode_id).await?;
                let me = self.session().subject_id();
                let rows: Vec<Value> = comments
                    .iter()
                    .map(|comment| -> Result<Value, serde_json::Error> {
                        let mine = comment.is_written_by(me.as_deref());
                        let mut row = serde_json::to_value(comment)?;
                        row["mine"] = Value::Bool(mine);
                        Ok(row)
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Value::Array(rows))
            }
            Command::Comment {
                novel_id,
                episode_id,
                content,
            } => {
                self.comments.create(novel_id, episode_id, &content).await?;
                Ok(json!({ "commented": true }))
            }
            Command::DeleteComment {
                novel_id,
                episode_id,
                comment_id,
            } => {
                self.comments.delete(novel_id, episode_id, comment_id).await?;
                Ok(json!({ "deleted": comment_id }))
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("结果序列化失败")
}

async fn load_cover(path: Option<&Path>) -> Result<Option<CoverImage>> {
    match path {
        Some(path) => {
            let cover = CoverImage::from_path(path)
                .await
                .with_context(|| format!("读取封面失败: {}", path.display()))?;
            Ok(Some(cover))
        }
        None => Ok(None),
    }
}

/// 把任意错误转成统一的错误形态
pub fn error_report(err: &anyhow::Error) -> ErrorReport {
    let api = err.downcast_ref::<ApiError>().or_else(|| match err.downcast_ref::<AppError>() {
        Some(AppError::Api(api)) => Some(api),
        _ => None,
    });

    match api {
        Some(api) => api.report(),
        None => ErrorReport {
            kind: ErrorKind::Client,
            message: format!("{:#}", err),
            http_status: None,
        },
    }
}
