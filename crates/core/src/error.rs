//! Error taxonomy: fatal configuration errors vs. typed exchange errors.
//!
//! The split matters to the monitoring loops: configuration errors abort
//! before any exchange call, exchange rejections are handled per-order, and
//! transient transport errors feed the back-off policy without ever ending a
//! loop.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by an [`crate::ExchangeClient`] implementation.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The exchange accepted the request transport but rejected the order
    /// (bad price, precision, insufficient margin, unknown order id).
    #[error("API error (code {code}): {message}")]
    Api {
        /// Exchange-assigned error code.
        code: i64,
        /// Human-readable rejection reason.
        message: String,
    },

    /// The request never reached the exchange or the response was lost.
    #[error("transport error: {0}")]
    Transport(String),

    /// A configured per-call deadline elapsed before the exchange answered.
    #[error("exchange call timed out")]
    Timeout,
}

impl ExchangeError {
    /// Whether a retry after back-off is reasonable.
    ///
    /// Rejections are deterministic and retrying them unchanged is futile;
    /// transport failures and timeouts are assumed recoverable.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Api { .. } => false,
            Self::Transport(_) | Self::Timeout => true,
        }
    }
}

/// Fatal startup errors. Reported and the process exits before any exchange
/// interaction.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required credential environment variable is not set.
    #[error("environment variable {0} must be set")]
    MissingCredentials(&'static str),

    /// Grid upper bound does not exceed the lower bound.
    #[error("invalid grid range: lower {lower} must be below upper {upper}")]
    InvalidGridRange { lower: Decimal, upper: Decimal },

    /// Grid count must be a positive integer.
    #[error("invalid grid count: {0} (must be > 0)")]
    InvalidGridCount(u32),

    /// Order quantity must be positive.
    #[error("invalid quantity: {0} (must be > 0)")]
    InvalidQuantity(Decimal),

    /// A price argument must be positive.
    #[error("invalid price: {0} (must be > 0)")]
    InvalidPrice(Decimal),

    /// TWAP duration must be positive.
    #[error("invalid duration: must be > 0")]
    InvalidDuration,

    /// TWAP slice count must be positive.
    #[error("invalid slice count: {0} (must be > 0)")]
    InvalidSliceCount(u32),
}
