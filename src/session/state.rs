use crate::error::StorageError;
use crate::session::credential::Credential;
use crate::session::storage::{MemorySessionStorage, SessionStorage};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct Session {
    credential: Credential,
    /// 每次成功的修改 +1
    revision: u64,
}

struct Inner {
    session: RwLock<Session>,
    storage: Box<dyn SessionStorage>,
}

/// 认证状态
///
/// 由创建 `ApiClient` 的地方持有并以句柄方式传递，克隆体共享同一份状态。
///
/// 修改时先写存储、再改内存，存储失败则内存保持不变，
/// 两者任何时刻都不会不一致。
#[derive(Clone)]
pub struct AuthState {
    inner: Arc<Inner>,
}

impl AuthState {
    /// 从持久化存储恢复凭证
    pub fn initialize(storage: impl SessionStorage + 'static) -> Result<Self, StorageError> {
        let credential = storage.load()?;
        debug!(
            "已恢复会话: 已登录 = {}",
            credential.access_token.is_some()
        );
        Ok(Self {
            inner: Arc::new(Inner {
                session: RwLock::new(Session {
                    credential,
                    revision: 0,
                }),
                storage: Box::new(storage),
            }),
        })
    }

    /// 只保存在内存里的认证状态
    pub fn in_memory() -> Self {
        Self::with_credential(Credential::default())
    }

    pub fn with_credential(credential: Credential) -> Self {
        let storage = MemorySessionStorage::with_credential(&credential);
        Self {
            inner: Arc::new(Inner {
                session: RwLock::new(Session {
                    credential,
                    revision: 0,
                }),
                storage: Box::new(storage),
            }),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().credential.access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().credential.refresh_token.clone()
    }

    pub fn subject_id(&self) -> Option<String> {
        self.read().credential.subject_id.clone()
    }

    pub fn snapshot(&self) -> Credential {
        self.read().credential.clone()
    }

    pub fn revision(&self) -> u64 {
        self.read().revision
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().credential.access_token.is_some()
    }

    /// 整体替换凭证（登录、刷新）
    pub fn set_credential(&self, credential: Credential) -> Result<(), StorageError> {
        self.update(|_| credential)
    }

    /// 只替换 access token，其余条目保留（OAuth 回调只带 access token）
    pub fn set_access_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.update(|current| Credential {
            access_token: Some(token),
            ..current.clone()
        })
    }

    /// 清除凭证（登出、刷新失败）
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut session = self.write();
        self.inner.storage.remove()?;
        session.credential = Credential::default();
        session.revision += 1;
        Ok(())
    }

    fn update(&self, next: impl FnOnce(&Credential) -> Credential) -> Result<(), StorageError> {
        let mut session = self.write();
        let credential = next(&session.credential);
        self.inner.storage.persist(&credential)?;
        session.credential = credential;
        session.revision += 1;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.read();
        f.debug_struct("AuthState")
            .field("authenticated", &session.credential.access_token.is_some())
            .field("subject_id", &session.credential.subject_id)
            .field("revision", &session.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SUBJECT_ID_KEY};

    /// 写入总是失败的存储
    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn load(&self) -> Result<Credential, StorageError> {
            Ok(Credential::new("old", Some("old-refresh".to_string()), None))
        }

        fn persist(&self, _: &Credential) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                path: "broken".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::DeleteFailed {
                path: "broken".to_string(),
                source: std::io::Error::other("read only"),
            })
        }
    }

    #[test]
    fn mutations_reach_storage() {
        let storage = MemorySessionStorage::new();
        let state = AuthState::initialize(storage.clone()).unwrap();
        assert!(!state.is_authenticated());

        state
            .set_credential(Credential::new("a1", Some("r1".to_string()), Some("5".to_string())))
            .unwrap();
        assert_eq!(state.access_token().as_deref(), Some("a1"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("a1"));
        assert_eq!(storage.get(SUBJECT_ID_KEY).as_deref(), Some("5"));

        state.set_access_token("a2").unwrap();
        assert_eq!(state.refresh_token().as_deref(), Some("r1"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("a2"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));

        state.clear().unwrap();
        assert!(state.snapshot().is_empty());
        assert!(storage.is_empty());
        assert_eq!(state.revision(), 3);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let state = AuthState::initialize(BrokenStorage).unwrap();
        let before = state.snapshot();

        assert!(state.set_credential(Credential::new("new", None, None)).is_err());
        assert!(state.clear().is_err());

        assert_eq!(state.snapshot(), before);
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn clones_share_state() {
        let state = AuthState::in_memory();
        let handle = state.clone();
        handle.set_access_token("shared").unwrap();
        assert_eq!(state.access_token().as_deref(), Some("shared"));
    }
}
