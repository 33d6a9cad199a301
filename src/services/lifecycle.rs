//! Invoice lifecycle manager.
//!
//! Orchestrates invoice creation with sequence numbering, the best-effort
//! payment-prediction side path, status transitions, and the transactional
//! mark-paid flow that writes the linked income record.

use crate::error::AppError;
use crate::models::{
    Client, CreateInvoice, IncomeRecord, Invoice, InvoiceDetails, InvoiceStatus, LineItem,
    ListInvoicesFilter, UpdateInvoice,
};
use crate::services::metrics::{ERRORS_TOTAL, INCOME_RECORDS_TOTAL, INVOICES_TOTAL};
use crate::services::predictor::PredictorClient;
use crate::services::stats::compute_stats;
use crate::services::store::FinanceStore;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const DEFAULT_TERMS: &str = "Net 30";

#[derive(Clone)]
pub struct InvoiceLifecycle {
    store: Arc<dyn FinanceStore>,
    predictor: PredictorClient,
}

impl InvoiceLifecycle {
    pub fn new(store: Arc<dyn FinanceStore>, predictor: PredictorClient) -> Self {
        Self { store, predictor }
    }

    /// Resolve a client owned by the caller, or `NotFound`. Ownership
    /// failures are indistinguishable from absence.
    async fn require_owned_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Client, AppError> {
        self.store
            .get_client(owner_id, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))
    }

    /// Resolve an invoice owned by the caller, or `NotFound`.
    async fn require_owned_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Invoice, AppError> {
        self.store
            .get_invoice(owner_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))
    }

    /// When line items are present, the invoice amount must equal their sum.
    fn validate_line_items(amount: Decimal, line_items: &[LineItem]) -> Result<(), AppError> {
        if line_items.is_empty() {
            return Ok(());
        }
        let sum: Decimal = line_items.iter().map(|li| li.amount).sum();
        if sum != amount {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invoice amount {} does not match line item total {}",
                amount,
                sum
            )));
        }
        Ok(())
    }

    /// Create an invoice for an owned client.
    ///
    /// The invoice is issued immediately (status `draft`, dated today) with a
    /// sequence number allocated atomically by the store. The prediction
    /// side path runs after the row is committed and can only enrich the
    /// result, never fail the creation.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, client_id = %input.client_id))]
    pub async fn create_invoice(
        &self,
        owner_id: Uuid,
        input: CreateInvoice,
    ) -> Result<Invoice, AppError> {
        self.require_owned_client(owner_id, input.client_id).await?;
        Self::validate_line_items(input.amount, &input.line_items)?;

        let issue_date = Utc::now().date_naive();
        let terms = input.terms.clone().unwrap_or_else(|| DEFAULT_TERMS.to_string());

        let invoice = self
            .store
            .insert_invoice(owner_id, issue_date, &input, &terms)
            .await?;

        INVOICES_TOTAL.with_label_values(&["draft"]).inc();

        Ok(self.attach_prediction_best_effort(invoice).await)
    }

    /// Post-commit prediction enrichment. Any failure is logged and
    /// swallowed; the committed invoice is returned unchanged.
    async fn attach_prediction_best_effort(&self, invoice: Invoice) -> Invoice {
        let samples = match self
            .store
            .paid_payment_samples(invoice.owner_id, invoice.client_id)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, invoice_id = %invoice.invoice_id,
                    "Failed to load payment history, skipping prediction");
                ERRORS_TOTAL.with_label_values(&["payment_history"]).inc();
                return invoice;
            }
        };

        let stats = compute_stats(&samples);
        if stats.total_invoices == 0 {
            return invoice;
        }

        let prediction = match self
            .predictor
            .predict_payment_time(&stats, invoice.amount, invoice.issue_date)
            .await
        {
            Some(p) => p,
            None => return invoice,
        };

        match self
            .store
            .attach_prediction(
                invoice.owner_id,
                invoice.invoice_id,
                prediction.predicted_payment_date,
                prediction.confidence_score,
            )
            .await
        {
            Ok(Some(updated)) => {
                info!(
                    invoice_id = %updated.invoice_id,
                    predicted_payment_date = %prediction.predicted_payment_date,
                    "Prediction attached"
                );
                updated
            }
            Ok(None) => invoice,
            Err(e) => {
                warn!(error = %e, invoice_id = %invoice.invoice_id,
                    "Failed to persist prediction");
                ERRORS_TOTAL.with_label_values(&["attach_prediction"]).inc();
                invoice
            }
        }
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Invoice, AppError> {
        self.require_owned_invoice(owner_id, invoice_id).await
    }

    #[instrument(skip(self, filter), fields(owner_id = %owner_id))]
    pub async fn list_invoices(
        &self,
        owner_id: Uuid,
        filter: ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        self.store.list_invoices(owner_id, &filter).await
    }

    /// Joined invoice view for the PDF and email collaborators.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn get_invoice_details(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<InvoiceDetails, AppError> {
        self.store
            .invoice_details(owner_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))
    }

    /// Update a non-paid invoice. Status changes follow the explicit
    /// transition graph; `paid` is only reachable through
    /// [`mark_invoice_paid`](Self::mark_invoice_paid).
    #[instrument(skip(self, input), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        input: UpdateInvoice,
    ) -> Result<Invoice, AppError> {
        let existing = self.require_owned_invoice(owner_id, invoice_id).await?;

        if existing.status() == InvoiceStatus::Paid {
            return Err(AppError::PreconditionFailed(anyhow::anyhow!(
                "Cannot modify paid invoice"
            )));
        }

        if let Some(next) = input.status {
            if next == InvoiceStatus::Paid {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Use the mark-paid operation to set an invoice to paid"
                )));
            }
            if next != existing.status() && !existing.status().can_transition_to(next) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Illegal status transition {} -> {}",
                    existing.status().as_str(),
                    next.as_str()
                )));
            }
        }

        // Re-check the amount/line-item invariant against the merged state.
        let amount = input.amount.unwrap_or(existing.amount);
        let line_items = input
            .line_items
            .as_deref()
            .unwrap_or(&existing.line_items.0);
        Self::validate_line_items(amount, line_items)?;

        let updated = self
            .store
            .update_invoice(owner_id, invoice_id, &input)
            .await?
            .ok_or_else(|| {
                // The row existed a moment ago; a concurrent mark-paid won.
                AppError::PreconditionFailed(anyhow::anyhow!("Cannot modify paid invoice"))
            })?;

        if let Some(next) = input.status {
            INVOICES_TOTAL.with_label_values(&[next.as_str()]).inc();
        }

        Ok(updated)
    }

    /// Mark an invoice paid, atomically writing the income ledger entry.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn mark_invoice_paid(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        paid_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<(Invoice, IncomeRecord), AppError> {
        let (invoice, income) = self
            .store
            .mark_invoice_paid(owner_id, invoice_id, paid_date, notes.as_deref())
            .await?;

        INVOICES_TOTAL.with_label_values(&["paid"]).inc();
        INCOME_RECORDS_TOTAL.with_label_values(&["invoice"]).inc();

        info!(
            invoice_number = %invoice.invoice_number,
            income_id = %income.income_id,
            "Invoice paid and income recorded"
        );

        Ok((invoice, income))
    }

    /// Delete a non-paid invoice. Paid invoices are never hard-deleted.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn delete_invoice(&self, owner_id: Uuid, invoice_id: Uuid) -> Result<(), AppError> {
        let existing = self.require_owned_invoice(owner_id, invoice_id).await?;

        if existing.status() == InvoiceStatus::Paid {
            return Err(AppError::PreconditionFailed(anyhow::anyhow!(
                "Cannot delete paid invoice"
            )));
        }

        if !self.store.delete_invoice(owner_id, invoice_id).await? {
            // Guarded delete found a freshly-paid row.
            return Err(AppError::PreconditionFailed(anyhow::anyhow!(
                "Cannot delete paid invoice"
            )));
        }
        Ok(())
    }
}
