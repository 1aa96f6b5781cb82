use chrono::{Days, NaiveDate};
use pay_alloc::allocation::{
    calculate_unallocated_amount, format_allocation_amount, validate_allocation,
};
use pay_alloc::lifecycle::{
    Action, Document, DocumentStatus, MaterialRequestStatus, PaymentStatus, Permissions,
    PurchaseOrderStatus, PurchaseReceiptStatus, RfqStatus,
};
use pay_alloc::validation::{
    FormMode, PaymentField, PaymentForm, is_valid_currency_code, validate_payment,
};
use pay_alloc::{Allocation, Amount, MoneyValue, PaymentMode};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn allocation(id: u64, amount: impl Into<MoneyValue>) -> Allocation {
    Allocation {
        id,
        payment_id: 1,
        invoice_id: 100 + id,
        allocated_amount: amount.into(),
    }
}

fn edit_form(mode: PaymentMode, reference: &str) -> PaymentForm {
    PaymentForm {
        amount: "150.00".to_string(),
        payment_date: "2026-10-18".to_string(),
        currency_code: "USD".to_string(),
        reference_no: Some(reference.to_string()),
        payment_mode: Some(mode),
        ..PaymentForm::default()
    }
}

#[test]
fn unallocated_is_exact_for_mixed_number_and_text_amounts() {
    let payment: Amount = "1000".parse().unwrap();
    let allocations = [
        allocation(1, 0.1),
        allocation(2, "0.2"),
        allocation(3, 333.33),
        allocation(4, "333.33"),
    ];

    let unallocated = calculate_unallocated_amount(payment, &allocations).unwrap();
    assert_eq!(unallocated, "333.04".parse::<Amount>().unwrap());

    let as_numbers: Vec<_> = [0.1, 0.2, 333.33, 333.33]
        .into_iter()
        .enumerate()
        .map(|(i, a)| allocation(i as u64, a))
        .collect();
    assert_eq!(
        calculate_unallocated_amount(payment, &as_numbers).unwrap(),
        unallocated
    );
}

#[test]
fn allocation_validation_reports_every_broken_rule() {
    let both = validate_allocation(500.0, 100.0, 200.0);
    assert_eq!(both.errors.len(), 2);

    assert!(!validate_allocation(0.0, 100.0, 100.0).is_valid());
    assert!(!validate_allocation(-5.0, 100.0, 100.0).is_valid());
    assert!(validate_allocation("100", 100.0, "100.00").is_valid());
}

#[test]
fn formatting_falls_back_to_zero() {
    assert_eq!(format_allocation_amount(None, "USD"), "USD 0.00");
    assert_eq!(
        format_allocation_amount(Some(&MoneyValue::from("abc")), "USD"),
        "USD 0.00"
    );
    assert_eq!(
        format_allocation_amount(Some(&MoneyValue::from(12.3)), "USD"),
        "USD 12.30"
    );
}

#[test]
fn payment_date_window() {
    let on_limit = today().checked_add_days(Days::new(30)).unwrap();
    let past_limit = today().checked_add_days(Days::new(31)).unwrap();
    let past = today().checked_sub_days(Days::new(400)).unwrap();

    for (date, valid) in [(on_limit, true), (past_limit, false), (past, true)] {
        let form = PaymentForm {
            payment_date: date.format("%Y-%m-%d").to_string(),
            ..edit_form(PaymentMode::Cash, "")
        };
        let result = validate_payment(&form, FormMode::Edit, today());
        assert_eq!(result.error(PaymentField::PaymentDate).is_none(), valid, "{date}");
    }
}

#[test]
fn reference_needed_for_check_only() {
    let check = validate_payment(&edit_form(PaymentMode::Check, ""), FormMode::Edit, today());
    assert!(check.error(PaymentField::ReferenceNo).is_some());

    let cash = validate_payment(&edit_form(PaymentMode::Cash, ""), FormMode::Edit, today());
    assert!(cash.is_valid());
}

#[test]
fn currency_codes() {
    assert!(is_valid_currency_code("USD"));
    for code in ["usd", "US1", "US", "USDT", ""] {
        assert!(!is_valid_currency_code(code), "{code}");
    }
}

struct Doc<S>(S);

impl<S: DocumentStatus> Document for Doc<S> {
    type Status = S;

    fn status(&self) -> S {
        self.0
    }
}

fn walk_guard_scenario<S: DocumentStatus>(draft: S) {
    let all = |value| Permissions {
        can_edit: value,
        can_submit: value,
        can_cancel: value,
        can_delete: value,
    };

    let mut doc = Doc(draft);
    assert_eq!(doc.permissions(), all(true), "{}", S::KIND);

    doc.0 = doc.0.transition(Action::Submit).unwrap();
    assert_eq!(
        doc.permissions(),
        Permissions {
            can_cancel: true,
            ..all(false)
        },
        "{}",
        S::KIND
    );

    doc.0 = doc.0.transition(Action::Cancel).unwrap();
    assert_eq!(doc.permissions(), all(false), "{}", S::KIND);
}

#[test]
fn guard_scenario_holds_for_every_kind() {
    walk_guard_scenario(PaymentStatus::Draft);
    walk_guard_scenario(MaterialRequestStatus::Draft);
    walk_guard_scenario(RfqStatus::Draft);
    walk_guard_scenario(PurchaseOrderStatus::Draft);
    walk_guard_scenario(PurchaseReceiptStatus::Draft);
}

#[test]
fn statuses_deserialize_case_insensitively() {
    let statuses: Vec<PurchaseOrderStatus> =
        serde_json::from_str(r#"["DRAFT", "submitted", "Partially Received", "fully-received"]"#)
            .unwrap();
    assert_eq!(
        statuses,
        vec![
            PurchaseOrderStatus::Draft,
            PurchaseOrderStatus::Submitted,
            PurchaseOrderStatus::PartiallyReceived,
            PurchaseOrderStatus::FullyReceived,
        ]
    );
}
