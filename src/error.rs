//! Error types for the farming engine.

/// Top-level error type for reward-claim orchestration.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    /// Bearer token could not be parsed as a structured credential.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Bearer token carries an expiry that has already passed.
    #[error("token expired at {expired_at} (unix seconds)")]
    ExpiredToken { expired_at: i64 },

    /// The account lookup returned nothing for the token's subject.
    #[error("account not found for user {user_id}")]
    AccountNotFound { user_id: u64 },

    /// Requested reward magnitude is outside the family's fixed set.
    #[error("invalid magnitude {magnitude}, valid magnitudes are: {valid}")]
    InvalidMagnitude { magnitude: u32, valid: String },

    /// The curriculum tree yielded no skill id for a unit-test session.
    #[error("no skill id found in the current course; cannot run a unit-test session")]
    SkillNotFound,

    /// The remote API answered with a non-success status.
    #[error("Duolingo API error: {status} - {body}")]
    RemoteApi { status: u16, body: String },

    /// The request never produced a response (connect, TLS, body decode).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FarmError {
    /// Returns true when the failure happened below the API layer and a
    /// later attempt against the same input could still succeed.
    ///
    /// Token, magnitude and skill failures are deterministic: retrying the
    /// same request cannot change the outcome.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::RemoteApi { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedToken(_)
            | Self::ExpiredToken { .. }
            | Self::AccountNotFound { .. }
            | Self::InvalidMagnitude { .. }
            | Self::SkillNotFound => false,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FarmError>;
