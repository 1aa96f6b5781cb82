//! The backend boundary.
//!
//! The crate ships no HTTP client: callers implement these traits over whatever
//! transport they use. Credentials travel explicitly in an [`ApiContext`] rather
//! than being read from ambient state.

use std::future::Future;
use thiserror::Error;

use crate::lifecycle::{Action, DocumentKind};
use crate::model::{
    Allocation, AllocationId, DocumentId, Invoice, InvoiceId, NewAllocation, Payment, PaymentId,
};

/// Per-call request context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiContext {
    token: Option<String>,
}

impl ApiContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value for an `Authorization` header, if a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

/// A failed backend call. None of these are fatal: the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("not authorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// The backend refused the request, e.g. a transition its own rules forbid.
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Payment and allocation endpoints.
pub trait PaymentApi {
    /// Payment with its nested allocations.
    fn get_payment(
        &self,
        ctx: &ApiContext,
        id: PaymentId,
    ) -> impl Future<Output = Result<Payment, ApiError>>;

    fn get_invoice(
        &self,
        ctx: &ApiContext,
        id: InvoiceId,
    ) -> impl Future<Output = Result<Invoice, ApiError>>;

    fn create_allocation(
        &self,
        ctx: &ApiContext,
        payment: PaymentId,
        body: &NewAllocation,
    ) -> impl Future<Output = Result<Allocation, ApiError>>;

    fn delete_allocation(
        &self,
        ctx: &ApiContext,
        id: AllocationId,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn confirm_payment(
        &self,
        ctx: &ApiContext,
        id: PaymentId,
    ) -> impl Future<Output = Result<Payment, ApiError>>;

    fn cancel_payment(
        &self,
        ctx: &ApiContext,
        id: PaymentId,
        reason: &str,
    ) -> impl Future<Output = Result<Payment, ApiError>>;
}

/// Status transition endpoints for every document kind.
pub trait DocumentApi {
    /// Apply `action` and return the document's new status as the backend spells it.
    fn transition(
        &self,
        ctx: &ApiContext,
        kind: DocumentKind,
        id: DocumentId,
        action: Action,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<String, ApiError>>;
}
