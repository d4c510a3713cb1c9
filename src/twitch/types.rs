use serde::{Deserialize, Serialize};

/// A channel point reward as modeled by Twitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Assigned by Twitch; always present on a reward returned from the API.
    pub id: String,
    pub title: String,
    pub cost: i64,
    pub is_enabled: bool,
    /// Whether this reward was created by this app's client id and can be
    /// edited or deleted through it. Rewards created on the dashboard or by
    /// other integrations are read-only here.
    pub is_manageable: bool,
    pub background_color: Option<String>,
    /// Icon to display for the reward. `None` only for rewards constructed
    /// by hand; anything decoded from Twitch carries a URL.
    pub image_url: Option<String>,
    pub max_per_stream: Option<i64>,
    pub max_per_user_per_stream: Option<i64>,
    pub global_cooldown_seconds: Option<i64>,
}

impl Reward {
    /// The user-editable subset of this reward, as submitted on update
    pub fn data(&self) -> RewardData {
        RewardData {
            title: self.title.clone(),
            cost: self.cost,
            is_enabled: self.is_enabled,
            background_color: self.background_color.clone(),
            max_per_stream: self.max_per_stream,
            max_per_user_per_stream: self.max_per_user_per_stream,
            global_cooldown_seconds: self.global_cooldown_seconds,
        }
    }
}

/// The user-editable reward fields submitted on create and update
///
/// Never carries a reward id. Each numeric setting is independently optional;
/// `None` means the setting is disabled on Twitch's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardData {
    pub title: String,
    pub cost: i64,
    pub is_enabled: bool,
    pub background_color: Option<String>,
    pub max_per_stream: Option<i64>,
    pub max_per_user_per_stream: Option<i64>,
    pub global_cooldown_seconds: Option<i64>,
}

/// A single redemption event awaiting a fulfillment decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRedemption {
    pub reward_id: String,
    pub redemption_id: String,
}

/// Terminal status applied to a redemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    Canceled,
    Fulfilled,
}

/// Envelope around the custom rewards endpoints' responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CustomRewardsResponse {
    pub data: Vec<WireReward>,
}

/// A reward as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireReward {
    pub id: String,
    pub title: String,
    pub cost: i64,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub image: Option<WireImage>,
    #[serde(default)]
    pub max_per_stream_setting: Option<WireMaxPerStream>,
    #[serde(default)]
    pub max_per_user_per_stream_setting: Option<WireMaxPerUserPerStream>,
    #[serde(default)]
    pub global_cooldown_setting: Option<WireGlobalCooldown>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireImage {
    #[serde(default)]
    pub url_4x: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireMaxPerStream {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub max_per_stream: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireMaxPerUserPerStream {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub max_per_user_per_stream: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireGlobalCooldown {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub global_cooldown_seconds: i64,
}

/// Request body for the create and update reward endpoints
///
/// Twitch pairs each optional setting with an `is_*_enabled` flag; a disabled
/// setting omits its value entirely.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CustomRewardBody {
    pub title: String,
    pub cost: i64,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub is_max_per_stream_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_stream: Option<i64>,
    pub is_max_per_user_per_stream_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_user_per_stream: Option<i64>,
    pub is_global_cooldown_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_cooldown_seconds: Option<i64>,
}

/// Request body for the redemption status endpoint
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateRedemptionBody {
    pub status: RedemptionStatus,
}

/// Error response body from Twitch
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub(crate) struct HelixErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub message: String,
}
