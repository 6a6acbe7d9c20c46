//! Position monitor error types.

use laabhum_core::OmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("No price available for {0}")]
    PriceUnavailable(String),

    #[error(transparent)]
    Oms(#[from] OmsError),
}

pub type PositionResult<T> = Result<T, PositionError>;
