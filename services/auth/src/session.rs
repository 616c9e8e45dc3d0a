//! Server-side sessions
//!
//! A session maps an opaque random token to a snapshot of the signed-in
//! user. The token travels to the client inside a cookie value of the form
//! `<token>.<signature>`, where the signature is an HMAC-SHA256 of the token
//! under the session secret. Values that fail verification resolve to no
//! session without touching the store.

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use civic_common::cache::RedisPool;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::models::SessionUser;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "civic.sid";

/// Default session lifetime: 7 days
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

type HmacSha256 = Hmac<Sha256>;

/// Keyed storage for session snapshots
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `user` under `token`, replacing any previous value
    async fn create(&self, token: &str, user: &SessionUser, ttl: Duration) -> Result<()>;
    /// Fetch the snapshot for `token` unless it is absent or expired
    async fn get(&self, token: &str) -> Result<Option<SessionUser>>;
    /// Remove `token`; removing an unknown token is not an error
    async fn destroy(&self, token: &str) -> Result<()>;
}

/// Session store backed by Redis keys with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, token: &str, user: &SessionUser, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(user)?;
        self.redis_pool
            .set(&Self::key(token), &payload, Some(ttl.as_secs().max(1)))
            .await
    }

    async fn get(&self, token: &str) -> Result<Option<SessionUser>> {
        match self.redis_pool.get(&Self::key(token)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        self.redis_pool.delete(&Self::key(token)).await
    }
}

/// Process-local session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, (SessionUser, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, token: &str, user: &SessionUser, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(token.to_string(), (user.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<SessionUser>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(token) {
            Some((user, expires)) if *expires > now => Ok(Some(user.clone())),
            Some(_) => {
                entries.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        self.entries.lock().await.remove(token);
        Ok(())
    }
}

/// Issues, resolves and ends sessions on top of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    secret: Arc<Vec<u8>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, secret: &str, ttl: Duration) -> Self {
        Self {
            store,
            secret: Arc::new(secret.as_bytes().to_vec()),
            ttl,
        }
    }

    /// Session lifetime, also used as the cookie Max-Age
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user` and return the signed cookie value
    pub async fn start(&self, user: &SessionUser) -> Result<String> {
        let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());
        self.store.create(&token, user, self.ttl).await?;
        info!("Session started for user {}", user.username);

        self.sign(&token)
    }

    /// Resolve a cookie value to the session snapshot it refers to
    pub async fn resolve(&self, cookie_value: &str) -> Result<Option<SessionUser>> {
        match self.verify(cookie_value) {
            Some(token) => self.store.get(token).await,
            None => Ok(None),
        }
    }

    /// End the session a cookie value refers to, if any
    pub async fn end(&self, cookie_value: &str) -> Result<()> {
        if let Some(token) = self.verify(cookie_value) {
            self.store.destroy(token).await?;
            info!("Session ended");
        }
        Ok(())
    }

    fn mac(&self, token: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow::anyhow!("Invalid session secret: {}", e))?;
        mac.update(token.as_bytes());
        Ok(mac)
    }

    fn sign(&self, token: &str) -> Result<String> {
        let signature = self.mac(token)?.finalize().into_bytes();
        Ok(format!("{}.{}", token, URL_SAFE_NO_PAD.encode(signature)))
    }

    fn verify<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (token, signature) = cookie_value.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.mac(token).ok()?.verify_slice(&signature).ok()?;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn snapshot() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "ab1".into(),
            role: Role::User,
            email: "ab1@x.com".into(),
            firstname: "A".into(),
            lastname: "B".into(),
        }
    }

    fn manager(ttl: Duration) -> SessionManager {
        SessionManager::new(Arc::new(InMemorySessionStore::new()), "test-secret", ttl)
    }

    #[tokio::test]
    async fn test_start_resolve_end() {
        let sessions = manager(DEFAULT_SESSION_TTL);
        let user = snapshot();

        let cookie = sessions.start(&user).await.unwrap();
        assert_eq!(sessions.resolve(&cookie).await.unwrap(), Some(user));

        sessions.end(&cookie).await.unwrap();
        assert_eq!(sessions.resolve(&cookie).await.unwrap(), None);

        // Ending twice is harmless.
        sessions.end(&cookie).await.unwrap();
    }

    #[tokio::test]
    async fn test_tampered_cookie_resolves_to_nothing() {
        let sessions = manager(DEFAULT_SESSION_TTL);
        let cookie = sessions.start(&snapshot()).await.unwrap();
        let (token, _) = cookie.rsplit_once('.').unwrap();

        assert_eq!(sessions.resolve(token).await.unwrap(), None);
        assert_eq!(
            sessions
                .resolve(&format!("{}.AAAA", token))
                .await
                .unwrap(),
            None
        );
        assert_eq!(sessions.resolve("garbage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cookie_signed_with_other_secret_is_rejected() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let ours = SessionManager::new(store.clone(), "secret-a", DEFAULT_SESSION_TTL);
        let theirs = SessionManager::new(store, "secret-b", DEFAULT_SESSION_TTL);

        let cookie = ours.start(&snapshot()).await.unwrap();
        assert_eq!(theirs.resolve(&cookie).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let sessions = manager(Duration::from_millis(10));
        let cookie = sessions.start(&snapshot()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(sessions.resolve(&cookie).await.unwrap(), None);
    }
}
