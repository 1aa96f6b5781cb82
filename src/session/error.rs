//! Error types for session operations.

use thiserror::Error;

use crate::allocation::{AllocationError, AllocationValidation};
use crate::api::ApiError;
use crate::lifecycle::{PaymentStatus, StatusParseError, TransitionError};
use crate::model::{Allocation, PaymentId};

/// Top-level error returned by [`PaymentSession`](super::PaymentSession) operations.
///
/// Every variant is recoverable: the session's state is left as it was.
/// `Stale` is the one case where the backend did change; retrying would repeat it.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("allocation rejected: {0}")]
    Validation(AllocationValidation),

    #[error("{0}")]
    Guard(#[from] TransitionError),

    #[error("cancellation reason is required")]
    MissingReason,

    #[error("payment {0} is {1}; allocations can only change while it is a draft")]
    Locked(PaymentId, PaymentStatus),

    #[error(transparent)]
    Calculation(#[from] AllocationError),

    #[error("request failed: {0}")]
    Api(#[from] ApiError),

    #[error("backend returned {0}")]
    UnexpectedStatus(#[from] StatusParseError),

    /// The change went through but the payment could not be reloaded afterwards.
    #[error(
        "allocation {} was created but the payment could not be reloaded: {source}",
        .created.id
    )]
    Stale {
        created: Allocation,
        source: Box<SessionError>,
    },
}
