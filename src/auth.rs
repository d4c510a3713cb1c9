//! Auth provider seam consumed by the rewards engine
//!
//! Token acquisition and refresh live elsewhere; the engine only needs a
//! bearer credential, the channel identity, and the affiliate gate.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Credentials and channel identity consumed by [`crate::twitch::RewardsApi`].
///
/// Implementations may refresh internally before returning.
#[async_trait]
pub trait TwitchAuth: Send + Sync {
    /// Current bearer token
    async fn access_token(&self) -> String;

    /// The broadcaster (channel) whose rewards are being managed
    async fn broadcaster_id(&self) -> String;

    /// Custom rewards are restricted to affiliate and partner channels
    async fn is_affiliate_or_partner(&self) -> bool;

    /// The application client id, sent on every Helix request
    fn client_id(&self) -> &str;
}

#[derive(Default)]
struct SessionInner {
    access_token: String,
    broadcaster_id: String,
    broadcaster_type: String,
}

/// Auth provider backed by session values owned by the embedding application
///
/// The broadcaster type is the string the Helix users endpoint reports
/// (`"affiliate"`, `"partner"`, or empty).
pub struct SessionAuth {
    client_id: String,
    inner: RwLock<SessionInner>,
}

impl SessionAuth {
    pub fn new(client_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            client_id: client_id.into(),
            inner: RwLock::new(SessionInner::default()),
        })
    }

    /// Sets the bearer token used for API requests
    pub async fn set_access_token(&self, token: String) {
        self.inner.write().await.access_token = token;
    }

    /// Sets the channel identity and its broadcaster type
    pub async fn set_broadcaster(&self, id: String, broadcaster_type: String) {
        let mut inner = self.inner.write().await;
        inner.broadcaster_id = id;
        inner.broadcaster_type = broadcaster_type;
    }
}

#[async_trait]
impl TwitchAuth for SessionAuth {
    async fn access_token(&self) -> String {
        self.inner.read().await.access_token.clone()
    }

    async fn broadcaster_id(&self) -> String {
        self.inner.read().await.broadcaster_id.clone()
    }

    async fn is_affiliate_or_partner(&self) -> bool {
        matches!(
            self.inner.read().await.broadcaster_type.as_str(),
            "affiliate" | "partner"
        )
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }
}
