//! Canonical status vocabularies, one per document kind.
//!
//! Parsing is the case-normalization boundary: `DRAFT`, `Draft` and `draft` all
//! map to the same variant, as do `Partially Received` and `partially_received`.
//! Statuses are always written back in snake_case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Action, DocumentKind, DocumentStatus, Stage, StatusParseError, normalize_status};

macro_rules! status_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:expr) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "&'static str", try_from = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StatusParseError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match normalize_status(raw).as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(StatusParseError {
                        kind: $kind,
                        raw: raw.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = StatusParseError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(status: $name) -> Self {
                status.as_str()
            }
        }
    };
}

status_vocabulary! {
    /// Payment status. Confirming is the payment's submit action.
    PaymentStatus(DocumentKind::Payment) {
        Draft => "draft",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

status_vocabulary! {
    MaterialRequestStatus(DocumentKind::MaterialRequest) {
        Draft => "draft",
        Submitted => "submitted",
        PartiallyOrdered => "partially_ordered",
        Ordered => "ordered",
        Cancelled => "cancelled",
    }
}

status_vocabulary! {
    /// Request-for-quotation status. Submitting an RFQ sends it to suppliers.
    RfqStatus(DocumentKind::Rfq) {
        Draft => "draft",
        Sent => "sent",
        PartiallyResponded => "partially_responded",
        FullyResponded => "fully_responded",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

status_vocabulary! {
    PurchaseOrderStatus(DocumentKind::PurchaseOrder) {
        Draft => "draft",
        Submitted => "submitted",
        PartiallyReceived => "partially_received",
        FullyReceived => "fully_received",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

status_vocabulary! {
    PurchaseReceiptStatus(DocumentKind::PurchaseReceipt) {
        Draft => "draft",
        Submitted => "submitted",
        Cancelled => "cancelled",
    }
}

impl DocumentStatus for PaymentStatus {
    const KIND: DocumentKind = DocumentKind::Payment;
    const SUBMITTED: Self = PaymentStatus::Confirmed;
    const CANCELLED: Self = PaymentStatus::Cancelled;
    const REQUIRES_CANCEL_REASON: bool = true;

    fn stage(self) -> Stage {
        match self {
            PaymentStatus::Draft => Stage::Draft,
            PaymentStatus::Confirmed => Stage::Submitted,
            PaymentStatus::Cancelled => Stage::Cancelled,
        }
    }
}

impl DocumentStatus for MaterialRequestStatus {
    const KIND: DocumentKind = DocumentKind::MaterialRequest;
    const SUBMITTED: Self = MaterialRequestStatus::Submitted;
    const CANCELLED: Self = MaterialRequestStatus::Cancelled;

    fn stage(self) -> Stage {
        match self {
            MaterialRequestStatus::Draft => Stage::Draft,
            MaterialRequestStatus::Submitted => Stage::Submitted,
            MaterialRequestStatus::PartiallyOrdered => Stage::InProgress,
            MaterialRequestStatus::Ordered => Stage::Completed,
            MaterialRequestStatus::Cancelled => Stage::Cancelled,
        }
    }

    fn advance(self, action: Action) -> Option<Self> {
        use MaterialRequestStatus::*;

        match (self, action) {
            (Submitted | PartiallyOrdered, Action::Progress) => Some(PartiallyOrdered),
            (Submitted | PartiallyOrdered, Action::Complete) => Some(Ordered),
            _ => None,
        }
    }
}

impl DocumentStatus for RfqStatus {
    const KIND: DocumentKind = DocumentKind::Rfq;
    const SUBMITTED: Self = RfqStatus::Sent;
    const CANCELLED: Self = RfqStatus::Cancelled;

    fn stage(self) -> Stage {
        match self {
            RfqStatus::Draft => Stage::Draft,
            RfqStatus::Sent => Stage::Submitted,
            RfqStatus::PartiallyResponded => Stage::InProgress,
            RfqStatus::FullyResponded => Stage::Completed,
            RfqStatus::Closed => Stage::Closed,
            RfqStatus::Cancelled => Stage::Cancelled,
        }
    }

    fn advance(self, action: Action) -> Option<Self> {
        use RfqStatus::*;

        match (self, action) {
            (Sent | PartiallyResponded, Action::Progress) => Some(PartiallyResponded),
            (Sent | PartiallyResponded, Action::Complete) => Some(FullyResponded),
            (FullyResponded, Action::Close) => Some(Closed),
            _ => None,
        }
    }
}

impl PurchaseOrderStatus {
    /// Only a fully received order can be closed.
    pub fn can_close(self) -> bool {
        self == PurchaseOrderStatus::FullyReceived
    }
}

impl DocumentStatus for PurchaseOrderStatus {
    const KIND: DocumentKind = DocumentKind::PurchaseOrder;
    const SUBMITTED: Self = PurchaseOrderStatus::Submitted;
    const CANCELLED: Self = PurchaseOrderStatus::Cancelled;

    fn stage(self) -> Stage {
        match self {
            PurchaseOrderStatus::Draft => Stage::Draft,
            PurchaseOrderStatus::Submitted => Stage::Submitted,
            PurchaseOrderStatus::PartiallyReceived => Stage::InProgress,
            PurchaseOrderStatus::FullyReceived => Stage::Completed,
            PurchaseOrderStatus::Closed => Stage::Closed,
            PurchaseOrderStatus::Cancelled => Stage::Cancelled,
        }
    }

    fn advance(self, action: Action) -> Option<Self> {
        use PurchaseOrderStatus::*;

        match (self, action) {
            (Submitted | PartiallyReceived, Action::Progress) => Some(PartiallyReceived),
            (Submitted | PartiallyReceived, Action::Complete) => Some(FullyReceived),
            (status, Action::Close) if status.can_close() => Some(Closed),
            _ => None,
        }
    }
}

impl DocumentStatus for PurchaseReceiptStatus {
    const KIND: DocumentKind = DocumentKind::PurchaseReceipt;
    const SUBMITTED: Self = PurchaseReceiptStatus::Submitted;
    const CANCELLED: Self = PurchaseReceiptStatus::Cancelled;

    fn stage(self) -> Stage {
        match self {
            PurchaseReceiptStatus::Draft => Stage::Draft,
            PurchaseReceiptStatus::Submitted => Stage::Submitted,
            PurchaseReceiptStatus::Cancelled => Stage::Cancelled,
        }
    }
}
