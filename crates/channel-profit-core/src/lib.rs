pub mod calculator;
pub mod compute;
pub mod error;
pub mod formatter;
pub mod types;

#[cfg(feature = "display")]
pub mod display;

#[cfg(feature = "state")]
pub mod state;

pub use error::ChannelProfitError;
pub use types::*;

/// Standard result type for all channel-profit operations
pub type ChannelProfitResult<T> = Result<T, ChannelProfitError>;
