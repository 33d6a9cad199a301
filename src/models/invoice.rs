//! Invoice model and status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status.
///
/// `paid` is terminal and only reachable through the mark-paid operation.
/// `cancelled` is terminal for the generic update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => InvoiceStatus::Sent,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Draft,
        }
    }

    /// Legal edges for the generic update path. Entering `paid` is never
    /// legal here; that transition belongs to the mark-paid operation.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Cancelled) | (Sent, Overdue) | (Sent, Cancelled)
                | (Overdue, Cancelled)
        )
    }

    /// States from which the mark-paid operation may start.
    pub fn can_be_paid(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Draft | InvoiceStatus::Sent | InvoiceStatus::Overdue
        )
    }
}

/// Format an invoice number for a given year and 1-based sequence value.
/// Sequence numbers are scoped per owner per year.
pub fn format_invoice_number(year: i32, seq: i64) -> String {
    format!("INV-{}-{:03}", year, seq)
}

/// A single line on an invoice, stored as JSONB alongside the invoice row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub amount: Decimal,
}

/// Invoice row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub amount: Decimal,
    pub description: String,
    pub line_items: Json<Vec<LineItem>>,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub income_record_id: Option<Uuid>,
    pub predicted_payment_date: Option<NaiveDate>,
    pub prediction_confidence: Option<f64>,
    pub notes: Option<String>,
    pub terms: String,
    pub created_utc: DateTime<Utc>,
}

impl Invoice {
    pub fn status(&self) -> InvoiceStatus {
        InvoiceStatus::from_string(&self.status)
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub client_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub line_items: Vec<LineItem>,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

/// Input for updating a non-paid invoice. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub line_items: Option<Vec<LineItem>>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone)]
pub struct ListInvoicesFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_size: i32,
    pub page_token: Option<Uuid>,
}

impl Default for ListInvoicesFilter {
    fn default() -> Self {
        Self {
            status: None,
            client_id: None,
            start_date: None,
            end_date: None,
            page_size: 50,
            page_token: None,
        }
    }
}

/// Fully-joined invoice view consumed by the PDF and email collaborators.
/// Owner profile resolution stays with the auth service; only the id travels.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub client: super::Client,
    pub income: Option<super::IncomeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_number_is_zero_padded() {
        assert_eq!(format_invoice_number(2025, 1), "INV-2025-001");
        assert_eq!(format_invoice_number(2025, 42), "INV-2025-042");
        assert_eq!(format_invoice_number(2026, 1234), "INV-2026-1234");
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(InvoiceStatus::from_string(status.as_str()), status);
        }
        assert_eq!(InvoiceStatus::from_string("garbage"), InvoiceStatus::Draft);
    }

    #[test]
    fn update_path_never_enters_paid() {
        for from in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(InvoiceStatus::Paid));
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for to in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert!(!InvoiceStatus::Paid.can_transition_to(to));
            assert!(!InvoiceStatus::Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn mark_paid_starts_from_open_states_only() {
        assert!(InvoiceStatus::Draft.can_be_paid());
        assert!(InvoiceStatus::Sent.can_be_paid());
        assert!(InvoiceStatus::Overdue.can_be_paid());
        assert!(!InvoiceStatus::Paid.can_be_paid());
        assert!(!InvoiceStatus::Cancelled.can_be_paid());
    }
}
