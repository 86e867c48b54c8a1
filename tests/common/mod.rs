#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use statsdash::{
    config::{DiscordConfig, ServerConfig, SessionConfig, SiteConfig},
    models::{BaseUserData, DiscordIdentity, Item, Items, TokenGrant, UserData},
    AppState, Config, Error, MemoryStorage, OAuthClient, Result, SharedState, SiteApi,
};
use tower::ServiceExt;

pub const OAUTH_URL: &str =
    "https://discord.com/oauth2/authorize?client_id=test&response_type=code&scope=identify";

/// Discord stand-in: every code exchanges successfully unless an error
/// payload is configured; access tokens resolve through `users`.
#[derive(Default)]
pub struct FakeDiscord {
    pub exchange_error: Option<Value>,
    pub expires_in: Option<i64>,
    pub users: HashMap<String, String>,
    pub exchanges: Arc<AtomicUsize>,
}

impl FakeDiscord {
    pub fn with_user(mut self, access_token: &str, user_id: &str) -> Self {
        self.users
            .insert(access_token.to_string(), user_id.to_string());
        self
    }
}

#[async_trait]
impl OAuthClient for FakeDiscord {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if let Some(payload) = &self.exchange_error {
            return Err(Error::OAuthProvider(payload.clone()));
        }
        Ok(TokenGrant {
            access_token: format!("access-{code}"),
            refresh_token: format!("refresh-{code}"),
            expires_in: self.expires_in.unwrap_or(604_800),
            token_type: Some("Bearer".to_string()),
            scope: Some("identify".to_string()),
        })
    }

    async fn identify(&self, access_token: &str) -> Result<Option<DiscordIdentity>> {
        Ok(self.users.get(access_token).map(|id| DiscordIdentity {
            id: id.clone(),
            username: format!("user{id}"),
            global_name: None,
        }))
    }
}

/// Site API stand-in counting every fetch.
#[derive(Default)]
pub struct FakeSite {
    pub fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl SiteApi for FakeSite {
    async fn items(&self) -> Result<Items> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut items = Items::new();
        items.insert(
            "lock_pick".to_string(),
            Item {
                id: "lock_pick".to_string(),
                name: "lock pick".to_string(),
                emoji: Some("🔓".to_string()),
                extra: serde_json::Map::new(),
            },
        );
        Ok(items)
    }

    async fn base_user(&self, user_id: &str) -> Result<BaseUserData> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "id": user_id, "kind": "base" }))
    }

    async fn user(&self, user_id: &str) -> Result<UserData> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "id": user_id, "kind": "full" }))
    }
}

pub fn test_config() -> Config {
    Config {
        discord: DiscordConfig {
            client_id: "test".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000/login".to_string(),
            oauth_url: OAUTH_URL.to_string(),
            api_url: "http://discord.invalid/api".to_string(),
        },
        site: SiteConfig {
            api_url: "http://site.invalid".to_string(),
            items_url: "http://site.invalid/api/items".to_string(),
        },
        session: SessionConfig {
            cookie_secure: false,
        },
        server: ServerConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub storage: Arc<MemoryStorage>,
    pub site_fetches: Arc<AtomicUsize>,
    pub exchanges: Arc<AtomicUsize>,
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response {
        self.get_with_cookie(uri, None).await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub fn create_test_app(discord: FakeDiscord) -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let site = FakeSite::default();
    let site_fetches = Arc::clone(&site.fetches);
    let exchanges = Arc::clone(&discord.exchanges);

    let state = Arc::new(AppState::with_clients(
        test_config(),
        Arc::clone(&storage),
        discord,
        site,
    ));

    TestApp {
        router: statsdash::app(Arc::clone(&state)),
        state,
        storage,
        site_fetches,
        exchanges,
    }
}

pub fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a streamed payload: the immediate data line and the deferred chunks
/// keyed by name.
pub async fn read_stream(response: Response) -> (Value, HashMap<String, Value>) {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let mut lines = std::str::from_utf8(&bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap());

    let head = lines.next().expect("empty stream");
    assert_eq!(head["type"], "data");

    let chunks = lines
        .map(|chunk| {
            assert_eq!(chunk["type"], "chunk");
            (chunk["key"].as_str().unwrap().to_string(), chunk)
        })
        .collect();

    (head["data"].clone(), chunks)
}
