use thiserror::Error;

use crate::api::SubscriberId;
use crate::core::PaneId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Discrete scales only accept one uniform padding value.
    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    #[error("duplicate pane id: {0}")]
    DuplicatePaneId(PaneId),

    #[error("subscriber with id `{0}` is already registered")]
    DuplicateSubscriber(SubscriberId),
}
