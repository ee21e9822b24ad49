/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::config::Config;
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 API 地址: {}", config.api_base_url);
    match &config.session_file {
        Some(path) => info!("💾 会话文件: {}", path),
        None => info!("💾 会话只保存在内存中"),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 令牌只显示前 6 个字符
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 6 {
        return "***".to_string();
    }
    token.chars().take(6).collect::<String>() + "***"
}
