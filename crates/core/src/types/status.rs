//! Status enums for ERPNext selling documents.
//!
//! ERPNext reports statuses as human-readable strings ("To Deliver and
//! Bill"). Statuses added by newer ERPNext versions or custom apps
//! deserialize as `Other` instead of failing the whole document.

use serde::{Deserialize, Serialize};

/// Sales Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SalesOrderStatus {
    #[default]
    Draft,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "To Deliver and Bill")]
    ToDeliverAndBill,
    #[serde(rename = "To Bill")]
    ToBill,
    #[serde(rename = "To Deliver")]
    ToDeliver,
    Completed,
    Cancelled,
    Closed,
    #[serde(other)]
    Other,
}

impl SalesOrderStatus {
    /// Whether the order still needs action from the shop.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            Self::Draft | Self::OnHold | Self::ToDeliverAndBill | Self::ToBill | Self::ToDeliver
        )
    }
}

/// Sales Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Submitted,
    Unpaid,
    #[serde(rename = "Partly Paid")]
    PartlyPaid,
    Paid,
    Overdue,
    Return,
    #[serde(rename = "Credit Note Issued")]
    CreditNoteIssued,
    Cancelled,
    #[serde(other)]
    Other,
}

impl InvoiceStatus {
    /// Whether money is still owed on the invoice.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Unpaid | Self::PartlyPaid | Self::Overdue)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Unpaid => "Unpaid",
            Self::PartlyPaid => "Partly Paid",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Return => "Return",
            Self::CreditNoteIssued => "Credit Note Issued",
            Self::Cancelled => "Cancelled",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}
