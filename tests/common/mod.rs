//! Shared test fixtures: an in-memory `FinanceStore` with failure injection.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use fintrack_service::config::PredictorConfig;
use fintrack_service::error::AppError;
use fintrack_service::models::{
    format_invoice_number, Client, CreateClient, CreateInvoice, IncomeRecord, Invoice,
    InvoiceDetails, InvoiceStatus, ListInvoicesFilter, PaymentSample, UpdateClient, UpdateInvoice,
};
use fintrack_service::services::{FinanceStore, InvoiceLifecycle, PredictorClient};
use rust_decimal::Decimal;
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    clients: HashMap<Uuid, Client>,
    invoices: HashMap<Uuid, Invoice>,
    incomes: HashMap<Uuid, IncomeRecord>,
    sequences: HashMap<(Uuid, i32), i64>,
}

/// In-memory store. `fail_mark_paid` simulates a transaction failure between
/// the income insert and the invoice update: the call errors and no state
/// changes, mirroring a database rollback.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    pub fail_mark_paid: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn income_count(&self) -> usize {
        self.inner.lock().unwrap().incomes.len()
    }

    pub fn inject_mark_paid_failure(&self, enabled: bool) {
        self.fail_mark_paid.store(enabled, Ordering::SeqCst);
    }
}

fn db_err(msg: &str) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("{}", msg))
}

#[async_trait]
impl FinanceStore for MemoryStore {
    async fn insert_client(&self, input: &CreateClient) -> Result<Client, AppError> {
        let client = Client {
            client_id: Uuid::new_v4(),
            owner_id: input.owner_id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            company: input.company.clone(),
            created_utc: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .clients
            .insert(client.client_id, client.clone());
        Ok(client)
    }

    async fn get_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .clients
            .get(&client_id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn list_clients(&self, owner_id: Uuid) -> Result<Vec<Client>, AppError> {
        let mut clients: Vec<Client> = self
            .inner
            .lock()
            .unwrap()
            .clients
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn update_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        input: &UpdateClient,
    ) -> Result<Option<Client>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(client) = inner
            .clients
            .get_mut(&client_id)
            .filter(|c| c.owner_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            client.name = name.clone();
        }
        if let Some(email) = &input.email {
            client.email = Some(email.clone());
        }
        if let Some(phone) = &input.phone {
            client.phone = Some(phone.clone());
        }
        if let Some(company) = &input.company {
            client.company = Some(company.clone());
        }
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, owner_id: Uuid, client_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let owned = inner
            .clients
            .get(&client_id)
            .is_some_and(|c| c.owner_id == owner_id);
        if owned {
            inner.clients.remove(&client_id);
        }
        Ok(owned)
    }

    async fn count_invoices_for_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<i64, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .invoices
            .values()
            .filter(|i| i.owner_id == owner_id && i.client_id == client_id)
            .count() as i64)
    }

    async fn insert_invoice(
        &self,
        owner_id: Uuid,
        issue_date: NaiveDate,
        input: &CreateInvoice,
        terms: &str,
    ) -> Result<Invoice, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let year = issue_date.year();
        let seq = inner.sequences.entry((owner_id, year)).or_insert(0);
        *seq += 1;
        let invoice_number = format_invoice_number(year, *seq);

        let invoice = Invoice {
            invoice_id: Uuid::new_v4(),
            owner_id,
            client_id: input.client_id,
            invoice_number,
            amount: input.amount,
            description: input.description.clone(),
            line_items: Json(input.line_items.clone()),
            status: "draft".to_string(),
            issue_date,
            due_date: input.due_date,
            paid_date: None,
            income_record_id: None,
            predicted_payment_date: None,
            prediction_confidence: None,
            notes: input.notes.clone(),
            terms: terms.to_string(),
            created_utc: Utc::now(),
        };
        inner.invoices.insert(invoice.invoice_id, invoice.clone());
        Ok(invoice)
    }

    async fn get_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .invoices
            .get(&invoice_id)
            .filter(|i| i.owner_id == owner_id)
            .cloned())
    }

    async fn list_invoices(
        &self,
        owner_id: Uuid,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut invoices: Vec<Invoice> = inner
            .invoices
            .values()
            .filter(|i| i.owner_id == owner_id)
            .filter(|i| filter.status.map_or(true, |s| i.status == s.as_str()))
            .filter(|i| filter.client_id.map_or(true, |c| i.client_id == c))
            .filter(|i| filter.start_date.map_or(true, |d| i.issue_date >= d))
            .filter(|i| filter.end_date.map_or(true, |d| i.issue_date <= d))
            .filter(|i| filter.page_token.map_or(true, |t| i.invoice_id > t))
            .cloned()
            .collect();
        invoices.sort_by_key(|i| i.invoice_id);
        invoices.truncate(filter.page_size.clamp(1, 100) as usize);
        Ok(invoices)
    }

    async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(invoice) = inner
            .invoices
            .get_mut(&invoice_id)
            .filter(|i| i.owner_id == owner_id && i.status != "paid")
        else {
            return Ok(None);
        };
        if let Some(amount) = input.amount {
            invoice.amount = amount;
        }
        if let Some(description) = &input.description {
            invoice.description = description.clone();
        }
        if let Some(line_items) = &input.line_items {
            invoice.line_items = Json(line_items.clone());
        }
        if let Some(due_date) = input.due_date {
            invoice.due_date = due_date;
        }
        if let Some(status) = input.status {
            invoice.status = status.as_str().to_string();
        }
        if let Some(notes) = &input.notes {
            invoice.notes = Some(notes.clone());
        }
        if let Some(terms) = &input.terms {
            invoice.terms = terms.clone();
        }
        Ok(Some(invoice.clone()))
    }

    async fn delete_invoice(&self, owner_id: Uuid, invoice_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let deletable = inner
            .invoices
            .get(&invoice_id)
            .is_some_and(|i| i.owner_id == owner_id && i.status != "paid");
        if deletable {
            inner.invoices.remove(&invoice_id);
        }
        Ok(deletable)
    }

    async fn attach_prediction(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        predicted_payment_date: NaiveDate,
        confidence: f64,
    ) -> Result<Option<Invoice>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(invoice) = inner
            .invoices
            .get_mut(&invoice_id)
            .filter(|i| i.owner_id == owner_id)
        else {
            return Ok(None);
        };
        invoice.predicted_payment_date = Some(predicted_payment_date);
        invoice.prediction_confidence = Some(confidence);
        Ok(Some(invoice.clone()))
    }

    async fn paid_payment_samples(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<PaymentSample>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut samples: Vec<PaymentSample> = inner
            .invoices
            .values()
            .filter(|i| i.owner_id == owner_id && i.client_id == client_id && i.status == "paid")
            .map(|i| PaymentSample {
                issue_date: i.issue_date,
                paid_date: i.paid_date,
            })
            .collect();
        samples.sort_by_key(|s| s.paid_date);
        Ok(samples)
    }

    async fn mark_invoice_paid(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        paid_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<(Invoice, IncomeRecord), AppError> {
        let mut inner = self.inner.lock().unwrap();

        let existing = inner
            .invoices
            .get(&invoice_id)
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

        match InvoiceStatus::from_string(&existing.status) {
            InvoiceStatus::Paid => {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} is already paid",
                    existing.invoice_number
                )));
            }
            InvoiceStatus::Cancelled => {
                return Err(AppError::PreconditionFailed(anyhow::anyhow!(
                    "Cannot mark a cancelled invoice as paid"
                )));
            }
            _ => {}
        }

        let client_name = inner
            .clients
            .get(&existing.client_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| db_err("client row missing"))?;

        let income = IncomeRecord {
            income_id: Uuid::new_v4(),
            owner_id,
            amount: existing.amount,
            client_id: Some(existing.client_id),
            client_name,
            project_name: existing.description.clone(),
            source: "invoice".to_string(),
            logged_at: paid_date,
            notes: notes.map(str::to_string),
            created_utc: Utc::now(),
        };

        // Injected failure between the income insert and the invoice update;
        // nothing written so far becomes visible, as with a real rollback.
        if self.fail_mark_paid.load(Ordering::SeqCst) {
            return Err(db_err("simulated failure during mark-paid transaction"));
        }

        inner.incomes.insert(income.income_id, income.clone());
        let invoice = inner.invoices.get_mut(&invoice_id).unwrap();
        invoice.status = "paid".to_string();
        invoice.paid_date = Some(paid_date);
        invoice.income_record_id = Some(income.income_id);
        if let Some(n) = notes {
            invoice.notes = Some(n.to_string());
        }

        Ok((invoice.clone(), income))
    }

    async fn invoice_details(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceDetails>, AppError> {
        let inner = self.inner.lock().unwrap();
        let Some(invoice) = inner
            .invoices
            .get(&invoice_id)
            .filter(|i| i.owner_id == owner_id)
            .cloned()
        else {
            return Ok(None);
        };
        let Some(client) = inner.clients.get(&invoice.client_id).cloned() else {
            return Ok(None);
        };
        let income = invoice
            .income_record_id
            .and_then(|id| inner.incomes.get(&id).cloned());
        Ok(Some(InvoiceDetails {
            invoice,
            client,
            income,
        }))
    }
}

/// Predictor client that is disabled (no base URL configured).
pub fn disabled_predictor() -> PredictorClient {
    PredictorClient::new(PredictorConfig {
        base_url: String::new(),
        timeout_secs: 10,
    })
}

/// Predictor client pointed at a test server, with a short timeout.
pub fn predictor_at(base_url: &str) -> PredictorClient {
    PredictorClient::new(PredictorConfig {
        base_url: base_url.to_string(),
        timeout_secs: 1,
    })
}

/// Lifecycle manager over a fresh in-memory store with no predictor.
pub fn test_lifecycle() -> (Arc<MemoryStore>, InvoiceLifecycle) {
    let store = MemoryStore::new();
    let lifecycle = InvoiceLifecycle::new(store.clone(), disabled_predictor());
    (store, lifecycle)
}

/// Create a client and return its id.
pub async fn create_client(store: &Arc<MemoryStore>, owner_id: Uuid, name: &str) -> Uuid {
    store
        .insert_client(&CreateClient {
            owner_id,
            name: name.to_string(),
            email: None,
            phone: None,
            company: None,
        })
        .await
        .expect("Failed to create client")
        .client_id
}

/// A minimal invoice input with no line items.
pub fn invoice_input(client_id: Uuid, amount: i64, description: &str) -> CreateInvoice {
    CreateInvoice {
        client_id,
        amount: Decimal::from(amount),
        description: description.to_string(),
        line_items: Vec::new(),
        due_date: Utc::now().date_naive() + chrono::Duration::days(30),
        notes: None,
        terms: None,
    }
}
