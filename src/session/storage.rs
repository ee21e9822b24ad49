//! 会话持久化
//!
//! 凭证的三个条目总是一起写入、一起删除。

use crate::error::StorageError;
use crate::session::credential::Credential;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const SUBJECT_ID_KEY: &str = "userId";

/// 持久化存储能力
pub trait SessionStorage: Send + Sync {
    /// 读取已保存的凭证，没有时返回空凭证
    fn load(&self) -> Result<Credential, StorageError>;

    /// 整体写入凭证，缺失的条目会被删除
    fn persist(&self, credential: &Credential) -> Result<(), StorageError>;

    /// 删除全部条目
    fn remove(&self) -> Result<(), StorageError>;
}

/// 内存存储
///
/// 克隆体共享同一份数据，测试里可以留一个句柄检查写入结果。
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置凭证
    pub fn with_credential(credential: &Credential) -> Self {
        let storage = Self::new();
        storage.replace(credential);
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, credential: &Credential) {
        let mut next = HashMap::new();
        let pairs = [
            (ACCESS_TOKEN_KEY, &credential.access_token),
            (REFRESH_TOKEN_KEY, &credential.refresh_token),
            (SUBJECT_ID_KEY, &credential.subject_id),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                next.insert(key.to_string(), value.clone());
            }
        }
        *self.entries() = next;
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Credential, StorageError> {
        Ok(Credential {
            access_token: self.get(ACCESS_TOKEN_KEY),
            refresh_token: self.get(REFRESH_TOKEN_KEY),
            subject_id: self.get(SUBJECT_ID_KEY),
        })
    }

    fn persist(&self, credential: &Credential) -> Result<(), StorageError> {
        self.replace(credential);
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.entries().clear();
        Ok(())
    }
}

/// TOML 会话文件
///
/// 先写临时文件再 rename，避免写到一半的文件被下次启动读到。
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Credential, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("会话文件不存在，使用空凭证: {}", self.display_path());
                return Ok(Credential::default());
            }
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.display_path(),
                    source,
                })
            }
        };

        toml::from_str(&content).map_err(|source| StorageError::ParseFailed {
            path: self.display_path(),
            source,
        })
    }

    fn persist(&self, credential: &Credential) -> Result<(), StorageError> {
        if credential.is_empty() {
            return self.remove();
        }

        let content = toml::to_string(credential)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::WriteFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let temp = self.temp_path();
        fs::write(&temp, content).map_err(|source| StorageError::WriteFailed {
            path: temp.display().to_string(),
            source,
        })?;
        fs::rename(&temp, &self.path).map_err(|source| StorageError::WriteFailed {
            path: self.display_path(),
            source,
        })?;

        debug!("会话已写入: {}", self.display_path());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("会话文件已删除: {}", self.display_path());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: self.display_path(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_credential() -> Credential {
        Credential::new("access-1", Some("refresh-1".to_string()), Some("42".to_string()))
    }

    #[test]
    fn memory_storage_writes_all_three_entries() {
        let storage = MemorySessionStorage::new();
        storage.persist(&full_credential()).unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-1"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-1"));
        assert_eq!(storage.get(SUBJECT_ID_KEY).as_deref(), Some("42"));

        // 缺失的条目会被一起删掉
        storage.persist(&Credential::new("access-2", None, None)).unwrap();
        assert_eq!(storage.get(REFRESH_TOKEN_KEY), None);

        storage.remove().unwrap();
        assert!(storage.is_empty());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn file_storage_round_trip_uses_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.toml"));

        assert!(storage.load().unwrap().is_empty());

        storage.persist(&full_credential()).unwrap();
        let raw = fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("accessToken = \"access-1\""));
        assert!(raw.contains("refreshToken = \"refresh-1\""));
        assert!(raw.contains("userId = \"42\""));
        assert_eq!(storage.load().unwrap(), full_credential());

        storage.remove().unwrap();
        assert!(!storage.path().exists());
        // 再删一次也没问题
        storage.remove().unwrap();
    }

    #[test]
    fn persisting_empty_credential_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.toml"));
        storage.persist(&full_credential()).unwrap();

        storage.persist(&Credential::default()).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(&path, "accessToken = [").unwrap();

        let err = FileSessionStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::ParseFailed { .. }));
    }
}
