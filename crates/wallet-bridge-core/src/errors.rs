use thiserror::Error;

/// EIP-1193 provider error codes surfaced to page code.
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const DISCONNECTED: i64 = 4900;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;
    pub const REQUEST_TIMEOUT: i64 = -32002;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider is not initialized")]
    NotReady,
    #[error("no active account")]
    NoActiveAccount,
    #[error("user rejected the request: {0}")]
    UserRejected(String),
    #[error("unsupported chain {chain_id}: transactions are limited to {supported}")]
    UnsupportedChain { chain_id: u64, supported: String },
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("relay error: {0}")]
    Relay(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn code(&self) -> i64 {
        match self {
            Self::NotReady => codes::DISCONNECTED,
            Self::NoActiveAccount => codes::UNAUTHORIZED,
            Self::UserRejected(_) => codes::USER_REJECTED,
            Self::UnsupportedChain { .. } => codes::UNRECOGNIZED_CHAIN,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Timeout(_) => codes::REQUEST_TIMEOUT,
            Self::Relay(_) | Self::Transport(_) => codes::INTERNAL,
        }
    }

    /// Classify a relay-reported failure string. The relay reports rejection
    /// in free text, so this is substring matching on rejection-style
    /// phrasing; best-effort, not authoritative.
    pub fn from_relay(text: impl Into<String>) -> Self {
        let text = text.into();
        if is_rejection_phrasing(&text) {
            Self::UserRejected(text)
        } else {
            Self::Relay(text)
        }
    }
}

fn is_rejection_phrasing(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("reject") || lower.contains("denied") || lower.contains("cancel")
}
