//! Pure translation between reward entities and the Helix wire JSON
//!
//! Also classifies error response bodies, so a remote duplicate-title
//! rejection surfaces as [`RewardsError::DuplicateTitle`] rather than the
//! generic status error.

use super::types::{CustomRewardBody, Reward, RewardData, WireReward};
use super::RewardsError;

/// Error-body message markers Twitch currently uses for a duplicate title.
/// The exact strings are remote-controlled, so the engine treats them as data
/// and allows overriding.
pub(crate) const DUPLICATE_TITLE_MARKERS: &[&str] = &[
    "CREATE_CUSTOM_REWARD_DUPLICATE_REWARD",
    "UPDATE_CUSTOM_REWARD_DUPLICATE_REWARD",
];

/// Icon Twitch serves for rewards without an uploaded image.
const DEFAULT_IMAGE_URL: &str =
    "https://static-cdn.jtvnw.net/custom-reward-images/default-4.png";

pub(crate) fn encode_reward_data(data: &RewardData) -> CustomRewardBody {
    CustomRewardBody {
        title: data.title.clone(),
        cost: data.cost,
        is_enabled: data.is_enabled,
        background_color: data.background_color.clone(),
        is_max_per_stream_enabled: data.max_per_stream.is_some(),
        max_per_stream: data.max_per_stream,
        is_max_per_user_per_stream_enabled: data.max_per_user_per_stream.is_some(),
        max_per_user_per_stream: data.max_per_user_per_stream,
        is_global_cooldown_enabled: data.global_cooldown_seconds.is_some(),
        global_cooldown_seconds: data.global_cooldown_seconds,
    }
}

pub(crate) fn decode_reward(wire: WireReward, is_manageable: bool) -> Reward {
    let image_url = wire
        .image
        .as_ref()
        .and_then(|image| image.url_4x.clone())
        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

    Reward {
        id: wire.id,
        title: wire.title,
        cost: wire.cost,
        is_enabled: wire.is_enabled,
        is_manageable,
        background_color: wire.background_color,
        image_url: Some(image_url),
        max_per_stream: wire
            .max_per_stream_setting
            .and_then(|s| enabled_value(s.is_enabled, s.max_per_stream)),
        max_per_user_per_stream: wire
            .max_per_user_per_stream_setting
            .and_then(|s| enabled_value(s.is_enabled, s.max_per_user_per_stream)),
        global_cooldown_seconds: wire
            .global_cooldown_setting
            .and_then(|s| enabled_value(s.is_enabled, s.global_cooldown_seconds)),
    }
}

// A setting counts as present only when Twitch flags it enabled; the value
// alone is meaningless.
fn enabled_value(is_enabled: bool, value: i64) -> Option<i64> {
    is_enabled.then_some(value)
}

/// Decodes the reward object embedded in a PubSub/EventSub redemption event.
///
/// The event payload carries no manageability information, so the result is
/// marked not manageable.
pub fn decode_pubsub_reward(json: &str) -> Result<Reward, serde_json::Error> {
    let wire: WireReward = serde_json::from_str(json)?;
    Ok(decode_reward(wire, false))
}

/// Maps a non-2xx Helix response to a typed error.
///
/// The duplicate-title check runs before the generic fallback.
pub(crate) fn classify_error_response(
    status: u16,
    body: &str,
    duplicate_markers: &[String],
) -> RewardsError {
    if let Ok(error_body) = serde_json::from_str::<super::types::HelixErrorBody>(body) {
        if duplicate_markers
            .iter()
            .any(|marker| error_body.message.contains(marker.as_str()))
        {
            return RewardsError::DuplicateTitle;
        }
    }
    RewardsError::UnexpectedStatus {
        status,
        body: body.to_string(),
    }
}
