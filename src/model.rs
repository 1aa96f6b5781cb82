//! Core domain types: payments, their allocations, and the invoices they settle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Amount;
use crate::allocation::{self, AllocationError};
use crate::lifecycle::{Document, PaymentStatus, normalize_status};
use crate::money::MoneyValue;

/// Payment identifier.
pub type PaymentId = u64;

/// Allocation identifier.
pub type AllocationId = u64;

/// Invoice identifier.
pub type InvoiceId = u64;

/// Customer or supplier identifier.
pub type PartyId = u64;

/// Identifier of any status-gated document.
pub type DocumentId = u64;

/// A wire value that matches none of a field's known variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} '{raw}'")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub raw: String,
}

/// How a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMode {
    Cash,
    Check,
    BankTransfer,
    /// Any other mode the backend knows about (card, wallet, ...).
    Other(String),
}

impl PaymentMode {
    /// Check and bank transfer payments carry a reference number.
    pub fn requires_reference(&self) -> bool {
        matches!(self, PaymentMode::Check | PaymentMode::BankTransfer)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Check => "check",
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Other(raw) => raw,
        }
    }
}

impl From<&str> for PaymentMode {
    fn from(raw: &str) -> Self {
        match normalize_status(raw).as_str() {
            "cash" => PaymentMode::Cash,
            "check" | "cheque" => PaymentMode::Check,
            "bank_transfer" => PaymentMode::BankTransfer,
            _ => PaymentMode::Other(raw.trim().to_string()),
        }
    }
}

impl From<String> for PaymentMode {
    fn from(raw: String) -> Self {
        PaymentMode::from(raw.as_str())
    }
}

impl From<PaymentMode> for String {
    fn from(mode: PaymentMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PaymentType {
    /// Money received from a customer.
    Receive,
    /// Money paid to a supplier.
    Pay,
}

impl FromStr for PaymentType {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_status(raw).as_str() {
            "receive" => Ok(PaymentType::Receive),
            "pay" => Ok(PaymentType::Pay),
            _ => Err(UnknownVariant {
                field: "payment type",
                raw: raw.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PaymentType {
    type Error = UnknownVariant;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Settlement state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl FromStr for InvoiceStatus {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_status(raw).as_str() {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(UnknownVariant {
                field: "invoice status",
                raw: raw.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = UnknownVariant;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// The share of a payment applied to one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub allocated_amount: MoneyValue,
}

/// An invoice as seen by the allocation rules. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(default)]
    pub invoice_no: Option<String>,
    pub balance_due: MoneyValue,
    pub status: InvoiceStatus,
}

/// Body of an allocation create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAllocation {
    pub invoice_id: InvoiceId,
    pub allocated_amount: Amount,
}

/// A payment and its allocations, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub party_id: Option<PartyId>,
    pub amount: MoneyValue,
    pub currency_code: String,
    pub status: PaymentStatus,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub reference_no: Option<String>,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub payment_references: Vec<Allocation>,
}

impl Payment {
    /// Payment amount minus everything allocated so far. Negative when over-allocated.
    pub fn unallocated_amount(&self) -> Result<Amount, AllocationError> {
        let amount = self
            .amount
            .to_amount()
            .map_err(AllocationError::InvalidPaymentAmount)?;
        allocation::calculate_unallocated_amount(amount, &self.payment_references)
    }

    /// Allocations can only be added or removed while the payment is a draft.
    pub fn can_allocate(&self) -> bool {
        self.status == PaymentStatus::Draft
    }

    pub fn receipt_available(&self) -> bool {
        self.status == PaymentStatus::Confirmed
    }

    pub fn allocation(&self, id: AllocationId) -> Option<&Allocation> {
        self.payment_references.iter().find(|a| a.id == id)
    }
}

impl Document for Payment {
    type Status = PaymentStatus;

    fn status(&self) -> PaymentStatus {
        self.status
    }
}
