//! Error types for allocation arithmetic.

use thiserror::Error;

use crate::amount::AmountError;
use crate::model::AllocationId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("payment amount is invalid: {0}")]
    InvalidPaymentAmount(#[source] AmountError),

    #[error("allocation {allocation} has an invalid amount: {source}")]
    InvalidAmount {
        allocation: AllocationId,
        source: AmountError,
    },

    #[error("allocated total is out of range")]
    Overflow,
}
