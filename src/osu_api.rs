use crate::osu_types::{MatchInfo, UserProfile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("osu! API request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected osu! API payload: {0}")]
    BadPayload(String),
}

/// The game-API seam. A production implementation wraps an HTTP client
/// plus OAuth token handling and owns its own timeout/retry policy; the
/// engine only ever sees these two calls.
#[cfg_attr(test, mockall::automock)]
pub trait GameApi {
    fn get_user_info(&self, user_id: u64) -> Result<UserProfile, ApiError>;

    fn get_match_info(&self, match_id: u64) -> Result<MatchInfo, ApiError>;
}
