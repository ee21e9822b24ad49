use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 API 基础地址
    pub api_base_url: String,
    /// 会话彻底失效时跳转的登录入口
    pub login_path: String,
    /// 会话文件路径，为空时只在内存中保存凭证
    pub session_file: Option<String>,
    /// 列表接口默认每页数量
    pub page_size: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            login_path: "/login".to_string(),
            session_file: Some(".webnovel/session.toml".to_string()),
            page_size: 10,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 配置文件（可选）+ 环境变量覆盖，最后校验
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            login_path: std::env::var("LOGIN_PATH").unwrap_or(self.login_path),
            session_file: std::env::var("SESSION_FILE").ok().or(self.session_file),
            page_size: std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.page_size),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
                expected: "http:// 或 https:// 开头的地址".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                value: self.page_size.to_string(),
                expected: "大于 0 的整数".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://novel.example.com\"").unwrap();
        writeln!(file, "page_size = 20").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://novel.example.com");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.login_path, "/login");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn broken_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"many\"").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = Config {
            api_base_url: "localhost:8080".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
