//! Narrow data-access contract consumed by the registry and lifecycle
//! services. The production implementation is [`Database`]; tests provide an
//! in-memory implementation with failure injection.
//!
//! [`Database`]: crate::services::Database

use crate::error::AppError;
use crate::models::{
    Client, CreateClient, CreateInvoice, IncomeRecord, Invoice, InvoiceDetails,
    ListInvoicesFilter, PaymentSample, UpdateClient, UpdateInvoice,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait FinanceStore: Send + Sync {
    // Clients -----------------------------------------------------------

    async fn insert_client(&self, input: &CreateClient) -> Result<Client, AppError>;

    async fn get_client(&self, owner_id: Uuid, client_id: Uuid)
        -> Result<Option<Client>, AppError>;

    async fn list_clients(&self, owner_id: Uuid) -> Result<Vec<Client>, AppError>;

    async fn update_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        input: &UpdateClient,
    ) -> Result<Option<Client>, AppError>;

    async fn delete_client(&self, owner_id: Uuid, client_id: Uuid) -> Result<bool, AppError>;

    async fn count_invoices_for_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<i64, AppError>;

    // Invoices ----------------------------------------------------------

    /// Insert an invoice, allocating its sequence number atomically with the
    /// insert. A duplicate number surfaces as `Conflict`.
    async fn insert_invoice(
        &self,
        owner_id: Uuid,
        issue_date: NaiveDate,
        input: &CreateInvoice,
        terms: &str,
    ) -> Result<Invoice, AppError>;

    async fn get_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, AppError>;

    async fn list_invoices(
        &self,
        owner_id: Uuid,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError>;

    /// Apply a field update. The store refuses to touch a paid row even if
    /// the caller's precondition check raced with a concurrent mark-paid.
    async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, AppError>;

    /// Delete a non-paid invoice. Returns whether a row was removed.
    async fn delete_invoice(&self, owner_id: Uuid, invoice_id: Uuid) -> Result<bool, AppError>;

    /// Attach prediction fields after the invoice row is committed. Separate
    /// write by design: absence of prediction data is always a valid state.
    async fn attach_prediction(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        predicted_payment_date: NaiveDate,
        confidence: f64,
    ) -> Result<Option<Invoice>, AppError>;

    /// Issue/paid date pairs for a client's paid invoices, oldest first.
    async fn paid_payment_samples(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<PaymentSample>, AppError>;

    /// Atomically create the income record and flip the invoice to paid.
    /// All-or-nothing: a failure anywhere leaves neither write visible.
    /// `Conflict` when already paid, `PreconditionFailed` when cancelled,
    /// `NotFound` when absent or owned by someone else.
    async fn mark_invoice_paid(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        paid_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<(Invoice, IncomeRecord), AppError>;

    /// Joined view for the PDF/email collaborators.
    async fn invoice_details(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceDetails>, AppError>;
}
