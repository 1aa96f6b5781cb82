//! Payment editing session.
//!
//! Runs the allocation and lifecycle rules against a backend: validate locally,
//! send the request, then adopt the backend's view of the payment. The backend is
//! the source of truth, so derived state (the unallocated amount) is always
//! recomputed from what it returns, never patched locally.
//!
//! Every call is bounded by [`Config::request_timeout`], so sessions must be driven
//! from within a Tokio runtime.

use std::future::Future;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::allocation::validate_allocation;
use crate::amount::Rounding;
use crate::api::{ApiContext, ApiError, DocumentApi, PaymentApi};
use crate::config::Config;
use crate::lifecycle::{Action, Document, DocumentStatus, Permissions};
use crate::model::{
    Allocation, AllocationId, DocumentId, InvoiceId, NewAllocation, Payment, PaymentId,
};
use crate::money::MoneyValue;
use crate::validation::validate_cancellation_reason;

mod error;
pub use error::SessionError;

/// One requested allocation in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationDraft {
    pub invoice_id: InvoiceId,
    pub amount: MoneyValue,
}

impl AllocationDraft {
    pub fn new(invoice_id: InvoiceId, amount: impl Into<MoneyValue>) -> Self {
        Self {
            invoice_id,
            amount: amount.into(),
        }
    }
}

/// A payment being worked on by one user.
///
/// Holds the last payment snapshot returned by the backend and the unallocated
/// amount derived from it. Both only change after a successful round trip.
pub struct PaymentSession<A> {
    api: A,
    ctx: ApiContext,
    config: Config,
    payment: Payment,
    unallocated: Amount,
}

/// Public API
impl<A: PaymentApi> PaymentSession<A> {
    /// Fetch a payment and start a session on it.
    pub async fn load(
        api: A,
        ctx: ApiContext,
        config: Config,
        id: PaymentId,
    ) -> Result<Self, SessionError> {
        let payment = with_timeout(
            config.request_timeout(),
            "get_payment",
            api.get_payment(&ctx, id),
        )
        .await?;
        let unallocated = payment.unallocated_amount()?;

        info!(payment = id, status = %payment.status, unallocated = %unallocated, "payment loaded");

        Ok(Self {
            api,
            ctx,
            config,
            payment,
            unallocated,
        })
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    /// Unallocated amount of the current snapshot. Negative when over-allocated.
    pub fn unallocated(&self) -> Amount {
        self.unallocated
    }

    pub fn permissions(&self) -> Permissions {
        self.payment.permissions()
    }

    /// Validate and create one allocation, then reload the payment.
    ///
    /// If the allocation is created but the reload fails, the result is
    /// [`SessionError::Stale`]: do not retry the allocation, call
    /// [`refresh`](Self::refresh) instead.
    pub async fn allocate(
        &mut self,
        invoice_id: InvoiceId,
        amount: impl Into<MoneyValue>,
    ) -> Result<Allocation, SessionError> {
        let amount = amount.into();
        let result = self.apply_allocation(invoice_id, &amount).await;
        self.log_result("allocation", Some(invoice_id), &result);
        result
    }

    /// Apply a stream of allocation drafts in order.
    ///
    /// A failed draft does not stop the ones after it; every outcome is returned.
    pub async fn allocate_all(
        &mut self,
        mut drafts: impl Stream<Item = AllocationDraft> + Unpin,
    ) -> Vec<Result<Allocation, SessionError>> {
        let mut outcomes = Vec::new();
        while let Some(draft) = drafts.next().await {
            outcomes.push(self.allocate(draft.invoice_id, draft.amount).await);
        }
        outcomes
    }

    /// Delete one allocation, then reload the payment.
    pub async fn remove_allocation(&mut self, id: AllocationId) -> Result<(), SessionError> {
        let result = self.apply_removal(id).await;
        self.log_result("allocation removal", None, &result);
        result
    }

    /// Confirm the payment. Allocations are frozen from here on.
    pub async fn confirm(&mut self) -> Result<(), SessionError> {
        let result = self.apply_confirm().await;
        self.log_result("confirm", None, &result);
        result
    }

    /// Cancel the payment. A non-blank reason is required.
    pub async fn cancel(&mut self, reason: &str) -> Result<(), SessionError> {
        let result = self.apply_cancel(reason).await;
        self.log_result("cancel", None, &result);
        result
    }

    /// Reload the payment from the backend.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let payment = self
            .request(
                "get_payment",
                self.api.get_payment(&self.ctx, self.payment.id),
            )
            .await?;
        self.adopt(payment)
    }
}

/// Private API
impl<A: PaymentApi> PaymentSession<A> {
    async fn request<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        with_timeout(self.config.request_timeout(), operation, call).await
    }

    /// Replace the snapshot, but only if its derived state can be computed.
    fn adopt(&mut self, payment: Payment) -> Result<(), SessionError> {
        let unallocated = payment.unallocated_amount()?;
        self.payment = payment;
        self.unallocated = unallocated;
        Ok(())
    }

    fn ensure_draft(&self) -> Result<(), SessionError> {
        if !self.payment.can_allocate() {
            return Err(SessionError::Locked(self.payment.id, self.payment.status));
        }
        Ok(())
    }

    /// Allocate:
    /// - Ensure the payment is still a draft
    /// - Fetch the invoice's current balance
    /// - Validate against both ceilings
    /// - Create the allocation and reload
    async fn apply_allocation(
        &mut self,
        invoice_id: InvoiceId,
        amount: &MoneyValue,
    ) -> Result<Allocation, SessionError> {
        self.ensure_draft()?;

        let invoice = self
            .request("get_invoice", self.api.get_invoice(&self.ctx, invoice_id))
            .await?;

        let validation = validate_allocation(amount, self.unallocated, &invoice.balance_due);
        let allocated_amount = match amount.to_amount_with(Rounding::Exact) {
            Ok(value) if validation.is_valid() => value,
            _ => return Err(SessionError::Validation(validation)),
        };

        let body = NewAllocation {
            invoice_id,
            allocated_amount,
        };
        let created = self
            .request(
                "create_allocation",
                self.api.create_allocation(&self.ctx, self.payment.id, &body),
            )
            .await?;

        // the allocation exists now; a failed reload must not look like a failed create
        if let Err(source) = self.refresh().await {
            return Err(SessionError::Stale {
                created,
                source: Box::new(source),
            });
        }
        Ok(created)
    }

    async fn apply_removal(&mut self, id: AllocationId) -> Result<(), SessionError> {
        self.ensure_draft()?;
        self.request("delete_allocation", self.api.delete_allocation(&self.ctx, id))
            .await?;
        self.refresh().await
    }

    async fn apply_confirm(&mut self) -> Result<(), SessionError> {
        self.payment.status.transition(Action::Submit)?;
        let payment = self
            .request(
                "confirm_payment",
                self.api.confirm_payment(&self.ctx, self.payment.id),
            )
            .await?;
        self.adopt(payment)
    }

    async fn apply_cancel(&mut self, reason: &str) -> Result<(), SessionError> {
        validate_cancellation_reason(reason).map_err(|_| SessionError::MissingReason)?;
        self.payment.status.transition(Action::Cancel)?;
        let payment = self
            .request(
                "cancel_payment",
                self.api.cancel_payment(&self.ctx, self.payment.id, reason.trim()),
            )
            .await?;
        self.adopt(payment)
    }

    /// Small helper to log operation results
    fn log_result<T>(
        &self,
        operation: &str,
        invoice: Option<InvoiceId>,
        result: &Result<T, SessionError>,
    ) {
        let payment = self.payment.id;
        match (result, invoice) {
            (Ok(_), Some(invoice)) => {
                info!(
                    payment,
                    invoice,
                    unallocated = %self.unallocated,
                    "{operation} applied"
                );
            }
            (Ok(_), None) => {
                info!(
                    payment,
                    status = %self.payment.status,
                    unallocated = %self.unallocated,
                    "{operation} applied"
                );
            }
            (Err(SessionError::Api(e)), _) => {
                warn!(payment, reason = %e, "{operation} failed");
            }
            (Err(SessionError::Stale { created, source }), _) => {
                warn!(
                    payment,
                    allocation = created.id,
                    reason = %source,
                    "{operation} applied but payment reload failed; snapshot is stale"
                );
            }
            (Err(e), _) => {
                info!(payment, reason = %e, "{operation} skipped");
            }
        }
    }
}

/// Move any status-gated document through `action` on the backend.
///
/// The action is checked against the local status first; the returned status is
/// parsed through the document kind's vocabulary.
pub async fn apply_transition<S, A>(
    api: &A,
    ctx: &ApiContext,
    config: &Config,
    id: DocumentId,
    current: S,
    action: Action,
    reason: Option<&str>,
) -> Result<S, SessionError>
where
    S: DocumentStatus,
    A: DocumentApi,
{
    let expected = current.transition(action)?;

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if action == Action::Cancel && S::REQUIRES_CANCEL_REASON && reason.is_none() {
        return Err(SessionError::MissingReason);
    }

    let raw = with_timeout(
        config.request_timeout(),
        "transition",
        api.transition(ctx, S::KIND, id, action, reason),
    )
    .await?;
    let status: S = raw.parse()?;

    if status != expected {
        warn!(
            kind = %S::KIND,
            document = id,
            expected = %expected,
            actual = %status,
            "backend reported a different status than expected"
        );
    }
    info!(
        kind = %S::KIND,
        document = id,
        %action,
        from = %current,
        to = %status,
        "transition applied"
    );

    Ok(status)
}

async fn with_timeout<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(operation)),
    }
}
