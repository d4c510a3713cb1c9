//! Common test utilities for integration tests

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use twitch_rewards::auth::TwitchAuth;
use twitch_rewards::twitch::{
    HttpClient, HttpResponse, Reward, RewardData, TransportError,
};

pub const REWARDS_URL: &str =
    "https://api.twitch.tv/helix/channel_points/custom_rewards?broadcaster_id=b1";

/// Recording transport serving canned responses per method and URL
#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: Arc<RwLock<HashMap<(Method, String), (u16, String)>>>,
    requests: Arc<RwLock<Vec<(Method, String, Option<String>)>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert((method, url.to_string()), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<(Method, String, Option<String>)> {
        self.requests.read().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for FakeTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        _headers: &HeaderMap,
        body: Option<String>,
    ) -> Result<HttpResponse, TransportError> {
        self.requests
            .write()
            .unwrap()
            .push((method.clone(), url.to_string(), body));

        let responses = self.responses.read().unwrap();
        let (status, body) = responses
            .get(&(method, url.to_string()))
            .ok_or_else(|| TransportError(format!("no canned response for {url}")))?;

        Ok(HttpResponse {
            status: *status,
            body: body.clone().into_bytes(),
        })
    }
}

/// Auth stub for an affiliate broadcaster `b1`
pub struct AffiliateAuth;

#[async_trait]
impl TwitchAuth for AffiliateAuth {
    async fn access_token(&self) -> String {
        "integration_token".to_string()
    }

    async fn broadcaster_id(&self) -> String {
        "b1".to_string()
    }

    async fn is_affiliate_or_partner(&self) -> bool {
        true
    }

    fn client_id(&self) -> &str {
        "integration_client"
    }
}

pub fn make_data(title: &str, cost: i64) -> RewardData {
    RewardData {
        title: title.to_string(),
        cost,
        is_enabled: true,
        background_color: None,
        max_per_stream: None,
        max_per_user_per_stream: None,
        global_cooldown_seconds: None,
    }
}

pub fn make_reward(id: &str, title: &str, is_manageable: bool) -> Reward {
    Reward {
        id: id.to_string(),
        title: title.to_string(),
        cost: 100,
        is_enabled: true,
        is_manageable,
        background_color: None,
        image_url: Some("https://example.com/icon.png".to_string()),
        max_per_stream: None,
        max_per_user_per_stream: None,
        global_cooldown_seconds: None,
    }
}
