mod codec;
pub mod http;
mod rewards;
mod types;

pub use codec::decode_pubsub_reward;
pub use http::{HttpClient, HttpResponse, ReqwestClient, TransportError};
pub use rewards::RewardsApi;
pub use types::*;

/// Result of every asynchronous rewards operation.
///
/// Exactly one of success or error, produced once per operation and handed to
/// the caller through a [`crate::bridge::CallbackBridge`] or the rewards
/// broadcast channel.
pub type Outcome<T> = Result<T, RewardsError>;

/// Errors surfaced by rewards operations.
///
/// Validation errors are raised before any network I/O where detectable
/// locally. A remote duplicate-title rejection is classified from the error
/// response body and takes precedence over `UnexpectedStatus`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardsError {
    #[error("the reward title must not be empty")]
    EmptyTitle,
    #[error("a reward with the same title already exists")]
    DuplicateTitle,
    #[error("this reward was not created by this app and cannot be changed here")]
    NotManageable,
    #[error("channel points are only available to affiliates and partners")]
    NotAffiliate,
    #[error("unexpected Twitch API response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}
