//! Payment form validation.
//!
//! Every field is checked and all problems are collected into one map, so a form
//! can show each message next to its field after a single pass.

use chrono::{DateTime, Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::Amount;
use crate::amount::{AmountError, Rounding};
use crate::config::Config;
use crate::model::{PartyId, Payment, PaymentMode, PaymentType};
use crate::money::MoneyValue;

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern is valid"));

pub const CANCELLATION_REASON_REQUIRED: &str = "Cancellation reason is required";

/// Fields of the payment form that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentField {
    Amount,
    PaymentDate,
    CurrencyCode,
    ReferenceNo,
    PaymentType,
    PartyId,
    PaymentMode,
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentField::Amount => "amount",
            PaymentField::PaymentDate => "payment_date",
            PaymentField::CurrencyCode => "currency_code",
            PaymentField::ReferenceNo => "reference_no",
            PaymentField::PaymentType => "payment_type",
            PaymentField::PartyId => "party_id",
            PaymentField::PaymentMode => "payment_mode",
        };
        f.write_str(name)
    }
}

/// Whether the form creates a new payment or edits an existing one.
///
/// Type, party and mode are fixed once a payment exists, so they are only
/// required on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Raw payment form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub amount: String,
    pub payment_date: String,
    pub currency_code: String,
    pub reference_no: Option<String>,
    /// An unselected mode control sends `""`, which reads as no mode.
    #[serde(deserialize_with = "blank_as_none")]
    pub payment_mode: Option<PaymentMode>,
    pub payment_type: Option<PaymentType>,
    pub party_id: Option<PartyId>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<PaymentMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|mode| !mode.trim().is_empty())
        .map(PaymentMode::from))
}

impl PaymentForm {
    /// Prefill an edit form from a payment returned by the backend.
    pub fn from_payment(payment: &Payment) -> Self {
        let amount = match &payment.amount {
            MoneyValue::Number(value) => value.to_string(),
            MoneyValue::Text(text) => text.clone(),
        };
        Self {
            amount,
            payment_date: payment.payment_date.format("%Y-%m-%d").to_string(),
            currency_code: payment.currency_code.clone(),
            reference_no: payment.reference_no.clone(),
            payment_mode: Some(payment.payment_mode.clone()),
            payment_type: payment.payment_type,
            party_id: payment.party_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentValidation {
    pub errors: BTreeMap<PaymentField, String>,
}

impl PaymentValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: PaymentField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

/// Validates payment forms against a [`Config`].
///
/// Amounts must fit in an [`Amount`]: anything above roughly 922 trillion is
/// reported as too large rather than accepted.
#[derive(Debug, Clone, Default)]
pub struct PaymentValidator {
    config: Config,
}

impl PaymentValidator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn validate(
        &self,
        form: &PaymentForm,
        mode: FormMode,
        today: NaiveDate,
    ) -> PaymentValidation {
        let mut errors = BTreeMap::new();

        if let Some(message) = self.check_amount(&form.amount) {
            errors.insert(PaymentField::Amount, message);
        }
        if let Some(message) = self.check_payment_date(&form.payment_date, today) {
            errors.insert(PaymentField::PaymentDate, message);
        }
        if let Some(message) = check_currency_code(&form.currency_code) {
            errors.insert(PaymentField::CurrencyCode, message);
        }

        let payment_mode = form
            .payment_mode
            .as_ref()
            .filter(|m| !m.as_str().trim().is_empty());

        let needs_reference = payment_mode.is_some_and(PaymentMode::requires_reference);
        if needs_reference && is_blank(form.reference_no.as_deref()) {
            errors.insert(
                PaymentField::ReferenceNo,
                "Reference number is required for check and bank transfer payments".to_string(),
            );
        }

        if mode == FormMode::Create {
            if form.payment_type.is_none() {
                errors.insert(PaymentField::PaymentType, "Payment type is required".to_string());
            }
            if form.party_id.is_none() {
                errors.insert(PaymentField::PartyId, "Party is required".to_string());
            }
            if payment_mode.is_none() {
                errors.insert(PaymentField::PaymentMode, "Payment mode is required".to_string());
            }
        }

        PaymentValidation { errors }
    }

    fn check_amount(&self, raw: &str) -> Option<String> {
        let text = raw.trim();
        let places = self.config.amount_decimal_places;
        let amount = match Amount::parse_with(text, Rounding::Exact) {
            Ok(amount) => amount,
            Err(AmountError::Empty) => return Some("Amount is required".to_string()),
            Err(AmountError::Overflow) => return Some("Amount is too large".to_string()),
            Err(AmountError::Precision(_)) => {
                return Some(format!("Amount cannot have more than {places} decimal places"));
            }
            Err(_) => return Some("Amount must be a valid number".to_string()),
        };

        if !amount.is_positive() {
            return Some("Amount must be greater than 0".to_string());
        }

        if fraction_digits(text) > places as usize {
            return Some(format!("Amount cannot have more than {places} decimal places"));
        }

        None
    }

    fn check_payment_date(&self, raw: &str, today: NaiveDate) -> Option<String> {
        let text = raw.trim();
        if text.is_empty() {
            return Some("Payment date is required".to_string());
        }

        let Some(date) = parse_date(text) else {
            return Some("Payment date is invalid".to_string());
        };

        let days = self.config.max_future_days;
        // no lower bound: backdated payments are fine
        match today.checked_add_days(Days::new(u64::from(days))) {
            Some(limit) if date > limit => Some(format!(
                "Payment date cannot be more than {days} days in the future"
            )),
            _ => None,
        }
    }
}

/// Validate a payment form with the default rules.
pub fn validate_payment(
    form: &PaymentForm,
    mode: FormMode,
    today: NaiveDate,
) -> PaymentValidation {
    PaymentValidator::default().validate(form, mode, today)
}

/// Validate a payment form against the local calendar date.
pub fn validate_payment_today(form: &PaymentForm, mode: FormMode) -> PaymentValidation {
    validate_payment(form, mode, Local::now().date_naive())
}

/// A payment can only be cancelled with a non-blank reason.
pub fn validate_cancellation_reason(reason: &str) -> Result<(), &'static str> {
    if reason.trim().is_empty() {
        return Err(CANCELLATION_REASON_REQUIRED);
    }
    Ok(())
}

pub fn is_valid_currency_code(code: &str) -> bool {
    CURRENCY_CODE.is_match(code)
}

fn check_currency_code(code: &str) -> Option<String> {
    if code.trim().is_empty() {
        return Some("Currency code is required".to_string());
    }
    if !is_valid_currency_code(code) {
        return Some("Currency code must be 3 uppercase letters".to_string());
    }
    None
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

fn fraction_digits(text: &str) -> usize {
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
