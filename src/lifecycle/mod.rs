//! Status-gated action rules shared by every document kind.
//!
//! Each document kind has its own closed status vocabulary (see [`status`]), but
//! all of them map onto the same topology:
//!
//! ```text
//! Draft --submit--> Submitted --progress--> InProgress --complete--> Completed --close--> Closed
//!   |                   |
//!   +------cancel-------+------------------------------------------------------------> Cancelled
//! ```
//!
//! The predicates here only decide which actions are offered. The backend is the
//! authority on every transition, so a rejection of an action allowed here is an
//! ordinary error, not a bug.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

mod error;
pub mod status;

pub use error::{StatusParseError, TransitionError};
pub use status::{
    MaterialRequestStatus, PaymentStatus, PurchaseOrderStatus, PurchaseReceiptStatus, RfqStatus,
};

/// The document kinds whose actions are status-gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Payment,
    MaterialRequest,
    Rfq,
    PurchaseOrder,
    PurchaseReceipt,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Payment => "payment",
            DocumentKind::MaterialRequest => "material_request",
            DocumentKind::Rfq => "rfq",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::PurchaseReceipt => "purchase_receipt",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a status in the shared topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Editable, not yet in any server-side workflow.
    Draft,
    /// Immediately after submission (`Submitted`, `Sent`, `Confirmed`).
    Submitted,
    /// Partially fulfilled.
    InProgress,
    /// Fully fulfilled.
    Completed,
    Closed,
    Cancelled,
}

/// A status-changing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Submit,
    Cancel,
    Close,
    /// Partial fulfilment, driven by the backend.
    Progress,
    /// Full fulfilment, driven by the backend.
    Complete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Submit => "submit",
            Action::Cancel => "cancel",
            Action::Close => "close",
            Action::Progress => "progress",
            Action::Complete => "complete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed status vocabulary for one document kind.
pub trait DocumentStatus:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = StatusParseError> + Into<&'static str>
{
    const KIND: DocumentKind;
    /// Status reached by submitting a draft.
    const SUBMITTED: Self;
    const CANCELLED: Self;
    /// Whether cancelling requires a reason.
    const REQUIRES_CANCEL_REASON: bool = false;

    fn stage(self) -> Stage;

    /// Edges of the topology beyond submit and cancel.
    fn advance(self, _action: Action) -> Option<Self> {
        None
    }

    fn transition(self, action: Action) -> Result<Self, TransitionError> {
        let next = match action {
            Action::Submit => can_submit(self).then_some(Self::SUBMITTED),
            Action::Cancel => can_cancel(self).then_some(Self::CANCELLED),
            _ => self.advance(action),
        };
        next.ok_or(TransitionError {
            kind: Self::KIND,
            action,
            from: self.into(),
        })
    }
}

pub fn can_edit<S: DocumentStatus>(status: S) -> bool {
    status.stage() == Stage::Draft
}

pub fn can_submit<S: DocumentStatus>(status: S) -> bool {
    status.stage() == Stage::Draft
}

/// Draft documents and documents that were just submitted can be cancelled.
pub fn can_cancel<S: DocumentStatus>(status: S) -> bool {
    matches!(status.stage(), Stage::Draft | Stage::Submitted)
}

/// Only drafts are deletable: nothing that left the draft stage is removed.
pub fn can_delete<S: DocumentStatus>(status: S) -> bool {
    status.stage() == Stage::Draft
}

/// The answer to "what can be done with this document right now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub can_edit: bool,
    pub can_submit: bool,
    pub can_cancel: bool,
    pub can_delete: bool,
}

impl Permissions {
    pub fn of<S: DocumentStatus>(status: S) -> Self {
        Self {
            can_edit: can_edit(status),
            can_submit: can_submit(status),
            can_cancel: can_cancel(status),
            can_delete: can_delete(status),
        }
    }
}

/// Anything that carries a status gets the guard predicates for free.
pub trait Document {
    type Status: DocumentStatus;

    fn status(&self) -> Self::Status;

    fn permissions(&self) -> Permissions {
        Permissions::of(self.status())
    }

    fn can_edit(&self) -> bool {
        self.permissions().can_edit
    }

    fn can_submit(&self) -> bool {
        self.permissions().can_submit
    }

    fn can_cancel(&self) -> bool {
        self.permissions().can_cancel
    }

    fn can_delete(&self) -> bool {
        self.permissions().can_delete
    }
}

/// Normalize a raw status string: trimmed, lowercase, spaces and hyphens as underscores.
pub(crate) fn normalize_status(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
