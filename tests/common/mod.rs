#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use pay_alloc::api::{ApiContext, ApiError, DocumentApi, PaymentApi};
use pay_alloc::lifecycle::{Action, DocumentKind, PaymentStatus};
use pay_alloc::model::{
    AllocationId, DocumentId, InvoiceId, InvoiceStatus, NewAllocation, PaymentId,
};
use pay_alloc::{Allocation, Amount, Invoice, MoneyValue, Payment, PaymentMode};
use tracing_subscriber::EnvFilter;

pub const PAYMENT_ID: PaymentId = 1;
pub const OPEN_INVOICE: InvoiceId = 10;
pub const SMALL_INVOICE: InvoiceId = 11;
pub const PAID_INVOICE: InvoiceId = 12;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ctx() -> ApiContext {
    ApiContext::new("test-token")
}

pub fn amount(text: &str) -> Amount {
    text.parse().unwrap()
}

pub fn draft_payment() -> Payment {
    Payment {
        id: PAYMENT_ID,
        payment_type: None,
        party_id: Some(7),
        amount: MoneyValue::from("1000.00"),
        currency_code: "USD".to_string(),
        status: PaymentStatus::Draft,
        payment_mode: PaymentMode::BankTransfer,
        reference_no: Some("TRX-42".to_string()),
        payment_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        cancellation_reason: None,
        payment_references: Vec::new(),
    }
}

fn invoice(id: InvoiceId, balance: MoneyValue, status: InvoiceStatus) -> Invoice {
    Invoice {
        id,
        invoice_no: Some(format!("INV-{id}")),
        balance_due: balance,
        status,
    }
}

#[derive(Default)]
struct State {
    payments: HashMap<PaymentId, Payment>,
    invoices: HashMap<InvoiceId, Invoice>,
    documents: HashMap<(DocumentKind, DocumentId), String>,
    next_allocation_id: AllocationId,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, ApiError>,
    delays: HashMap<&'static str, Duration>,
}

/// In-memory backend that enforces the same rules a real server would.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.payments.insert(PAYMENT_ID, draft_payment());
            state.invoices.insert(
                OPEN_INVOICE,
                invoice(OPEN_INVOICE, MoneyValue::from("600.00"), InvoiceStatus::Unpaid),
            );
            state.invoices.insert(
                SMALL_INVOICE,
                invoice(SMALL_INVOICE, MoneyValue::from(250.75), InvoiceStatus::PartiallyPaid),
            );
            state.invoices.insert(
                PAID_INVOICE,
                invoice(PAID_INVOICE, MoneyValue::from("0"), InvoiceStatus::Paid),
            );
            state.next_allocation_id = 100;
        }
        api
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: ApiError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Make every call to `operation` take `delay` before answering.
    pub fn delay(&self, operation: &'static str, delay: Duration) {
        self.state.lock().unwrap().delays.insert(operation, delay);
    }

    /// Status string the backend will report after the next transition of a document.
    pub fn script_transition(&self, kind: DocumentKind, id: DocumentId, status: &str) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert((kind, id), status.to_string());
    }

    pub fn set_payment_status(&self, status: PaymentStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(payment) = state.payments.get_mut(&PAYMENT_ID) {
            payment.status = status;
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn invoice_balance(&self, id: InvoiceId) -> Amount {
        let state = self.state.lock().unwrap();
        state.invoices[&id].balance_due.to_amount().unwrap()
    }

    async fn enter(&self, ctx: &ApiContext, operation: &'static str) -> Result<(), ApiError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(operation);
            state.delays.get(operation).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if ctx.token().is_none() {
            return Err(ApiError::Unauthorized);
        }
        match self.state.lock().unwrap().failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn conflict(message: &str) -> ApiError {
    ApiError::Rejected {
        status: 409,
        message: message.to_string(),
    }
}

impl PaymentApi for MockApi {
    async fn get_payment(&self, ctx: &ApiContext, id: PaymentId) -> Result<Payment, ApiError> {
        self.enter(ctx, "get_payment").await?;
        let state = self.state.lock().unwrap();
        state.payments.get(&id).cloned().ok_or(ApiError::NotFound)
    }

    async fn get_invoice(&self, ctx: &ApiContext, id: InvoiceId) -> Result<Invoice, ApiError> {
        self.enter(ctx, "get_invoice").await?;
        let state = self.state.lock().unwrap();
        state.invoices.get(&id).cloned().ok_or(ApiError::NotFound)
    }

    async fn create_allocation(
        &self,
        ctx: &ApiContext,
        payment: PaymentId,
        body: &NewAllocation,
    ) -> Result<Allocation, ApiError> {
        self.enter(ctx, "create_allocation").await?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_allocation_id;
        state.next_allocation_id += 1;

        let status = state
            .payments
            .get(&payment)
            .ok_or(ApiError::NotFound)?
            .status;
        if status != PaymentStatus::Draft {
            return Err(conflict("payment is not a draft"));
        }

        let invoice = state
            .invoices
            .get_mut(&body.invoice_id)
            .ok_or(ApiError::NotFound)?;
        let balance = invoice.balance_due.to_amount().unwrap();
        if body.allocated_amount > balance {
            return Err(conflict("allocation exceeds invoice balance"));
        }
        invoice.balance_due = MoneyValue::from(balance.checked_sub(body.allocated_amount).unwrap());

        let allocation = Allocation {
            id,
            payment_id: payment,
            invoice_id: body.invoice_id,
            allocated_amount: MoneyValue::from(body.allocated_amount),
        };
        state
            .payments
            .get_mut(&payment)
            .unwrap()
            .payment_references
            .push(allocation.clone());
        Ok(allocation)
    }

    async fn delete_allocation(&self, ctx: &ApiContext, id: AllocationId) -> Result<(), ApiError> {
        self.enter(ctx, "delete_allocation").await?;
        let mut state = self.state.lock().unwrap();
        let payment = state
            .payments
            .get_mut(&PAYMENT_ID)
            .ok_or(ApiError::NotFound)?;
        let index = payment
            .payment_references
            .iter()
            .position(|a| a.id == id)
            .ok_or(ApiError::NotFound)?;
        let removed = payment.payment_references.remove(index);

        let invoice = state.invoices.get_mut(&removed.invoice_id).unwrap();
        let balance = invoice.balance_due.to_amount().unwrap();
        let restored = balance
            .checked_add(removed.allocated_amount.to_amount().unwrap())
            .unwrap();
        invoice.balance_due = MoneyValue::from(restored);
        Ok(())
    }

    async fn confirm_payment(&self, ctx: &ApiContext, id: PaymentId) -> Result<Payment, ApiError> {
        self.enter(ctx, "confirm_payment").await?;
        let mut state = self.state.lock().unwrap();
        let payment = state.payments.get_mut(&id).ok_or(ApiError::NotFound)?;
        if payment.status != PaymentStatus::Draft {
            return Err(conflict("only draft payments can be confirmed"));
        }
        payment.status = PaymentStatus::Confirmed;
        Ok(payment.clone())
    }

    async fn cancel_payment(
        &self,
        ctx: &ApiContext,
        id: PaymentId,
        reason: &str,
    ) -> Result<Payment, ApiError> {
        self.enter(ctx, "cancel_payment").await?;
        let mut state = self.state.lock().unwrap();
        let payment = state.payments.get_mut(&id).ok_or(ApiError::NotFound)?;
        if payment.status == PaymentStatus::Cancelled {
            return Err(conflict("payment already cancelled"));
        }
        payment.status = PaymentStatus::Cancelled;
        payment.cancellation_reason = Some(reason.to_string());
        Ok(payment.clone())
    }
}

impl DocumentApi for MockApi {
    async fn transition(
        &self,
        ctx: &ApiContext,
        kind: DocumentKind,
        id: DocumentId,
        _action: Action,
        _reason: Option<&str>,
    ) -> Result<String, ApiError> {
        self.enter(ctx, "transition").await?;
        let state = self.state.lock().unwrap();
        state
            .documents
            .get(&(kind, id))
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}
