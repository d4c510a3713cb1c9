// Library entry point
// Async management of Twitch channel point rewards over the Helix API.

pub mod auth;
pub mod bridge;
pub mod twitch;
