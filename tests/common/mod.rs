//! 集成测试共用的辅助函数

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use webnovel_client::session::MemorySessionStorage;
use webnovel_client::{ApiClient, AuthState, Config, Credential, LoginRedirect};

/// 记录跳转次数
#[derive(Debug, Default)]
pub struct CountingRedirect {
    hits: AtomicUsize,
}

impl CountingRedirect {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, _login_path: &str) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub storage: MemorySessionStorage,
    pub redirect: Arc<CountingRedirect>,
}

pub fn config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        session_file: None,
        ..Config::default()
    }
}

/// 用给定凭证创建客户端，存储可在测试中直接检查
pub fn harness(base_url: &str, credential: Credential) -> Harness {
    let storage = MemorySessionStorage::with_credential(&credential);
    let auth = AuthState::initialize(storage.clone()).expect("内存存储不会失败");
    let redirect = Arc::new(CountingRedirect::default());
    let client = ApiClient::with_redirect(&config(base_url), auth, redirect.clone())
        .expect("创建客户端失败");
    Harness {
        client,
        storage,
        redirect,
    }
}

pub fn credential(access: &str, refresh: Option<&str>) -> Credential {
    Credential::new(access, refresh.map(str::to_string), Some("7".to_string()))
}

/// 服务器的响应外壳
pub fn envelope(data: Value) -> String {
    json!({ "statusCode": 200, "message": "ok", "data": data }).to_string()
}

pub fn error_body(status: u16, message: &str) -> String {
    json!({ "statusCode": status, "message": message }).to_string()
}
