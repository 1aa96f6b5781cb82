//! Allocation arithmetic and validation.
//!
//! An allocation links two independent balances: what the payment still has to
//! give and what the invoice still owes. A candidate allocation is checked against
//! both, and every violated rule is reported.

use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::Amount;
use crate::amount::{AmountError, Rounding};
use crate::model::Allocation;
use crate::money::MoneyValue;

mod error;
pub use error::AllocationError;

pub const NON_POSITIVE_MESSAGE: &str = "Allocation amount must be greater than 0";
pub const PRECISION_MESSAGE: &str = "Allocation amount cannot have more than 4 decimal places";

/// Outcome of [`validate_allocation`]. Errors keep rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationValidation {
    pub errors: Vec<String>,
}

impl AllocationValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for AllocationValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.errors.join("; "))
    }
}

/// Payment amount minus the sum of all allocations.
///
/// The result is not clamped: a negative value means the payment is over-allocated.
pub fn calculate_unallocated_amount(
    payment_amount: Amount,
    allocations: &[Allocation],
) -> Result<Amount, AllocationError> {
    let mut allocated = Amount::ZERO;
    for allocation in allocations {
        let amount = allocation
            .allocated_amount
            .to_amount()
            .map_err(|source| AllocationError::InvalidAmount {
                allocation: allocation.id,
                source,
            })?;
        allocated = allocated
            .checked_add(amount)
            .ok_or(AllocationError::Overflow)?;
    }

    let unallocated = payment_amount
        .checked_sub(allocated)
        .ok_or(AllocationError::Overflow)?;

    if unallocated.is_negative() {
        warn!(
            payment_amount = %payment_amount,
            allocated = %allocated,
            "payment is over-allocated"
        );
    }

    Ok(unallocated)
}

/// Check a candidate allocation against the payment's unallocated amount and the
/// invoice's outstanding balance.
///
/// Rules run independently and in a fixed order:
/// 1. the candidate is a number greater than zero
/// 2. it does not exceed the unallocated amount
/// 3. it does not exceed the outstanding balance
///
/// A candidate with more than 4 decimals cannot be represented and is rejected
/// with its own message instead of being rounded. A ceiling that cannot be read
/// as a number counts as zero.
pub fn validate_allocation(
    candidate: impl Into<MoneyValue>,
    payment_unallocated: impl Into<MoneyValue>,
    invoice_outstanding: impl Into<MoneyValue>,
) -> AllocationValidation {
    let candidate = candidate.into().to_amount_with(Rounding::Exact);
    let unallocated = ceiling(payment_unallocated.into(), "unallocated amount");
    let outstanding = ceiling(invoice_outstanding.into(), "invoice outstanding balance");

    let mut errors = Vec::new();

    match &candidate {
        Ok(amount) if amount.is_positive() => {}
        Err(AmountError::Precision(_)) => errors.push(PRECISION_MESSAGE.to_string()),
        _ => errors.push(NON_POSITIVE_MESSAGE.to_string()),
    }

    if let Ok(amount) = candidate {
        if amount > unallocated {
            errors.push(format!(
                "Allocation amount cannot exceed unallocated amount of {}",
                unallocated.to_fixed(2)
            ));
        }
        if amount > outstanding {
            errors.push(format!(
                "Allocation amount cannot exceed invoice outstanding balance of {}",
                outstanding.to_fixed(2)
            ));
        }
    }

    AllocationValidation { errors }
}

/// Ceilings are floored to 4 decimals, which keeps `candidate <= ceiling` exact
/// for any candidate that fits in an [`Amount`].
fn ceiling(value: MoneyValue, name: &'static str) -> Amount {
    value.to_amount_with(Rounding::Floor).unwrap_or_else(|e| {
        warn!(ceiling = name, reason = %e, "unreadable ceiling treated as zero");
        Amount::ZERO
    })
}

/// `"<CODE> <amount with 2 decimals>"`. Missing or unreadable amounts print as zero.
pub fn format_allocation_amount(amount: Option<&MoneyValue>, currency_code: &str) -> String {
    let amount = amount
        .and_then(|value| value.to_amount().ok())
        .unwrap_or(Amount::ZERO);
    format!("{currency_code} {}", amount.to_fixed(2))
}
