use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::sync::watch;

use super::codec;
use super::http::{HttpClient, HttpResponse, ReqwestClient};
use super::types::{
    CustomRewardsResponse, RedemptionStatus, Reward, RewardData, RewardRedemption,
    UpdateRedemptionBody,
};
use super::{Outcome, RewardsError};
use crate::auth::TwitchAuth;
use crate::bridge::CallbackBridge;

const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Client for the Helix custom rewards endpoints
///
/// Generic over the HTTP transport for testability. Every operation schedules
/// an independent task on the runtime and returns immediately; the result
/// comes back through the supplied [`CallbackBridge`], or for reloads through
/// the rewards broadcast channel. A started call always runs to completion;
/// only delivery is skipped when the owner has gone away.
pub struct RewardsApi<H: HttpClient = ReqwestClient> {
    http: H,
    auth: Arc<dyn TwitchAuth>,
    rewards_tx: Arc<watch::Sender<Option<Outcome<Vec<Reward>>>>>,
    rewards_rx: watch::Receiver<Option<Outcome<Vec<Reward>>>>,
    // (id, title) of the manageable rewards seen on the last reload, for the
    // local duplicate-title check. Not a reward cache.
    manageable_titles: Arc<Mutex<Vec<(String, String)>>>,
    duplicate_markers: Arc<Vec<String>>,
}

impl RewardsApi<ReqwestClient> {
    /// Creates a rewards client with the default HTTP implementation
    pub fn new(auth: Arc<dyn TwitchAuth>) -> Self {
        Self::with_transport(ReqwestClient::new(), auth)
    }
}

impl<H: HttpClient + Clone + 'static> RewardsApi<H> {
    /// Creates a rewards client over a custom transport
    pub fn with_transport(http: H, auth: Arc<dyn TwitchAuth>) -> Self {
        let (rewards_tx, rewards_rx) = watch::channel(None);
        Self {
            http,
            auth,
            rewards_tx: Arc::new(rewards_tx),
            rewards_rx,
            manageable_titles: Arc::new(Mutex::new(Vec::new())),
            duplicate_markers: Arc::new(
                codec::DUPLICATE_TITLE_MARKERS
                    .iter()
                    .map(|marker| (*marker).to_string())
                    .collect(),
            ),
        }
    }

    /// Overrides the error-body markers used to recognize a remote
    /// duplicate-title rejection
    ///
    /// The strings Twitch puts in its error messages are not contractual, so
    /// they are treated as data rather than hard-coded behavior.
    pub fn set_duplicate_title_markers(&mut self, markers: Vec<String>) {
        self.duplicate_markers = Arc::new(markers);
    }

    /// Subscribes to reload results
    ///
    /// Every completed [`reload_rewards`](Self::reload_rewards) is observed
    /// by every current subscriber.
    pub fn subscribe_rewards(&self) -> watch::Receiver<Option<Outcome<Vec<Reward>>>> {
        self.rewards_rx.clone()
    }

    /// Creates a reward and delivers the created entity (with its newly
    /// assigned id) through the bridge
    pub fn create_reward(&self, data: RewardData, bridge: CallbackBridge<Reward>) {
        let api = self.clone();
        tokio::spawn(async move {
            bridge.deliver(api.create_reward_call(data).await);
        });
    }

    /// Updates a manageable reward, keyed by its id, and delivers the updated
    /// entity through the bridge
    pub fn update_reward(&self, reward: Reward, bridge: CallbackBridge<Reward>) {
        let api = self.clone();
        tokio::spawn(async move {
            bridge.deliver(api.update_reward_call(reward).await);
        });
    }

    /// Deletes a manageable reward
    pub fn delete_reward(&self, reward: Reward, bridge: CallbackBridge<()>) {
        let api = self.clone();
        tokio::spawn(async move {
            bridge.deliver(api.delete_reward_call(&reward).await);
        });
    }

    /// Reloads the full reward list and broadcasts the outcome to every
    /// subscriber
    pub fn reload_rewards(&self) {
        let api = self.clone();
        tokio::spawn(async move {
            let outcome = api.fetch_rewards().await;
            match &outcome {
                Ok(rewards) => tracing::info!(count = rewards.len(), "reloaded rewards"),
                Err(error) => tracing::warn!(%error, "failed to reload rewards"),
            }
            let _ = api.rewards_tx.send(Some(outcome));
        });
    }

    /// Downloads the reward's icon bytes
    ///
    /// The reward must carry an image URL; calling this without one is a bug
    /// in the caller, not a remote failure, and delivers nothing.
    pub fn download_image(&self, reward: &Reward, bridge: CallbackBridge<Vec<u8>>) {
        let Some(url) = reward.image_url.clone() else {
            tracing::error!(reward_id = %reward.id, "download_image called for a reward without an image url");
            return;
        };
        let api = self.clone();
        tokio::spawn(async move {
            bridge.deliver(api.download_image_call(&url).await);
        });
    }

    /// Marks a redemption fulfilled or canceled. Fire-and-forget: this is a
    /// best-effort acknowledgement, so failures are logged and swallowed.
    pub fn update_redemption_status(&self, redemption: RewardRedemption, status: RedemptionStatus) {
        let api = self.clone();
        tokio::spawn(async move {
            if let Err(error) = api.update_redemption_status_call(&redemption, status).await {
                tracing::warn!(
                    redemption_id = %redemption.redemption_id,
                    %error,
                    "failed to update redemption status"
                );
            }
        });
    }

    async fn create_reward_call(&self, data: RewardData) -> Outcome<Reward> {
        self.ensure_affiliate().await?;
        self.check_title(&data.title, None)?;

        let url = self.rewards_url(None).await;
        let body = encode_body(&codec::encode_reward_data(&data));
        let response = self.send(Method::POST, &url, Some(body)).await?;
        let reward = self.decode_single_reward(&response)?;

        self.manageable_titles
            .lock()
            .unwrap()
            .push((reward.id.clone(), reward.title.clone()));
        Ok(reward)
    }

    async fn update_reward_call(&self, reward: Reward) -> Outcome<Reward> {
        self.ensure_affiliate().await?;
        if !reward.is_manageable {
            return Err(RewardsError::NotManageable);
        }
        self.check_title(&reward.title, Some(&reward.id))?;

        let url = self.rewards_url(Some(&reward.id)).await;
        let body = encode_body(&codec::encode_reward_data(&reward.data()));
        let response = self.send(Method::PATCH, &url, Some(body)).await?;
        let updated = self.decode_single_reward(&response)?;

        let mut titles = self.manageable_titles.lock().unwrap();
        match titles.iter_mut().find(|(id, _)| *id == updated.id) {
            Some(entry) => entry.1 = updated.title.clone(),
            None => titles.push((updated.id.clone(), updated.title.clone())),
        }
        drop(titles);
        Ok(updated)
    }

    async fn delete_reward_call(&self, reward: &Reward) -> Outcome<()> {
        self.ensure_affiliate().await?;
        if !reward.is_manageable {
            return Err(RewardsError::NotManageable);
        }

        let url = self.rewards_url(Some(&reward.id)).await;
        let response = self.send(Method::DELETE, &url, None).await?;
        if !response.is_success() {
            return Err(self.classify(&response));
        }

        self.manageable_titles
            .lock()
            .unwrap()
            .retain(|(id, _)| *id != reward.id);
        Ok(())
    }

    async fn fetch_rewards(&self) -> Outcome<Vec<Reward>> {
        // Helix has no per-reward ownership flag: manageability is the ids
        // present in the only-manageable listing.
        let all = self.list_rewards_call(false).await?;
        let manageable = self.list_rewards_call(true).await?;
        let manageable_ids: HashSet<String> =
            manageable.into_iter().map(|wire| wire.id).collect();

        let rewards: Vec<Reward> = all
            .into_iter()
            .map(|wire| {
                let is_manageable = manageable_ids.contains(&wire.id);
                codec::decode_reward(wire, is_manageable)
            })
            .collect();

        *self.manageable_titles.lock().unwrap() = rewards
            .iter()
            .filter(|reward| reward.is_manageable)
            .map(|reward| (reward.id.clone(), reward.title.clone()))
            .collect();

        Ok(rewards)
    }

    async fn list_rewards_call(
        &self,
        only_manageable: bool,
    ) -> Result<Vec<super::types::WireReward>, RewardsError> {
        let mut url = self.rewards_url(None).await;
        if only_manageable {
            url.push_str("&only_manageable_rewards=true");
        }

        let response = self.send(Method::GET, &url, None).await?;
        if !response.is_success() {
            return Err(self.classify(&response));
        }
        let parsed: CustomRewardsResponse = response.json().map_err(|_| unexpected(&response))?;
        Ok(parsed.data)
    }

    async fn download_image_call(&self, url: &str) -> Outcome<Vec<u8>> {
        // Image CDN request; no Helix auth headers.
        let response = self
            .http
            .request(Method::GET, url, &HeaderMap::new(), None)
            .await?;
        if !response.is_success() {
            return Err(unexpected(&response));
        }
        Ok(response.body)
    }

    async fn update_redemption_status_call(
        &self,
        redemption: &RewardRedemption,
        status: RedemptionStatus,
    ) -> Outcome<()> {
        self.ensure_affiliate().await?;

        let broadcaster_id = self.auth.broadcaster_id().await;
        let url = format!(
            "{HELIX_BASE_URL}/channel_points/custom_rewards/redemptions?broadcaster_id={}&reward_id={}&id={}",
            urlencoding::encode(&broadcaster_id),
            urlencoding::encode(&redemption.reward_id),
            urlencoding::encode(&redemption.redemption_id),
        );
        let body = encode_body(&UpdateRedemptionBody { status });

        let response = self.send(Method::PATCH, &url, Some(body)).await?;
        if !response.is_success() {
            return Err(self.classify(&response));
        }
        Ok(())
    }

    async fn ensure_affiliate(&self) -> Result<(), RewardsError> {
        if self.auth.is_affiliate_or_partner().await {
            Ok(())
        } else {
            Err(RewardsError::NotAffiliate)
        }
    }

    /// Validates a submitted title against the manageable rewards known from
    /// the last reload. `exclude_id` lets an update keep its own title.
    fn check_title(&self, title: &str, exclude_id: Option<&str>) -> Result<(), RewardsError> {
        if title.is_empty() {
            return Err(RewardsError::EmptyTitle);
        }
        let titles = self.manageable_titles.lock().unwrap();
        let duplicate = titles.iter().any(|(id, existing)| {
            existing.eq_ignore_ascii_case(title) && exclude_id != Some(id.as_str())
        });
        if duplicate {
            return Err(RewardsError::DuplicateTitle);
        }
        Ok(())
    }

    fn decode_single_reward(&self, response: &HttpResponse) -> Outcome<Reward> {
        if !response.is_success() {
            return Err(self.classify(response));
        }
        let parsed: CustomRewardsResponse = response.json().map_err(|_| unexpected(response))?;
        let wire = parsed.data.into_iter().next().ok_or_else(|| unexpected(response))?;
        // only manageable rewards pass through create/update
        Ok(codec::decode_reward(wire, true))
    }

    fn classify(&self, response: &HttpResponse) -> RewardsError {
        codec::classify_error_response(response.status, &response.text(), &self.duplicate_markers)
    }

    async fn rewards_url(&self, id: Option<&str>) -> String {
        let broadcaster_id = self.auth.broadcaster_id().await;
        let mut url = format!(
            "{HELIX_BASE_URL}/channel_points/custom_rewards?broadcaster_id={}",
            urlencoding::encode(&broadcaster_id)
        );
        if let Some(id) = id {
            url.push_str("&id=");
            url.push_str(&urlencoding::encode(id));
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, RewardsError> {
        let headers = self.build_headers().await;
        Ok(self.http.request(method, url, &headers, body).await?)
    }

    async fn build_headers(&self) -> HeaderMap {
        let token = self.auth.access_token().await;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {token}").parse().unwrap(),
        );
        headers.insert("Client-Id", self.auth.client_id().parse().unwrap());
        headers
    }
}

fn encode_body<T: serde::Serialize>(body: &T) -> String {
    serde_json::to_string(body).expect("request body serialization cannot fail")
}

fn unexpected(response: &HttpResponse) -> RewardsError {
    RewardsError::UnexpectedStatus {
        status: response.status,
        body: response.text(),
    }
}

impl<H: HttpClient + Clone> Clone for RewardsApi<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            auth: Arc::clone(&self.auth),
            rewards_tx: Arc::clone(&self.rewards_tx),
            rewards_rx: self.rewards_rx.clone(),
            manageable_titles: Arc::clone(&self.manageable_titles),
            duplicate_markers: Arc::clone(&self.duplicate_markers),
        }
    }
}
