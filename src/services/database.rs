//! Postgres-backed store for fintrack-service.

use crate::error::AppError;
use crate::models::{
    format_invoice_number, Client, CreateClient, CreateInvoice, IncomeRecord, Invoice,
    InvoiceDetails, InvoiceStatus, ListInvoicesFilter, PaymentSample, UpdateClient, UpdateInvoice,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::FinanceStore;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const INVOICE_COLUMNS: &str = "invoice_id, owner_id, client_id, invoice_number, amount, \
    description, line_items, status, issue_date, due_date, paid_date, income_record_id, \
    predicted_payment_date, prediction_confidence, notes, terms, created_utc";

const CLIENT_COLUMNS: &str =
    "client_id, owner_id, name, email, phone, company, created_utc";

const INCOME_COLUMNS: &str = "income_id, owner_id, amount, client_id, client_name, \
    project_name, source, logged_at, notes, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "fintrack-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl FinanceStore for Database {
    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    async fn insert_client(&self, input: &CreateClient) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_client"])
            .start_timer();

        let client_id = Uuid::new_v4();
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (client_id, owner_id, name, email, phone, company)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(client_id)
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.company)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)))?;

        timer.observe_duration();

        info!(client_id = %client.client_id, "Client created");

        Ok(client)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    async fn get_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE owner_id = $1 AND client_id = $2
            "#,
        ))
        .bind(owner_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn list_clients(&self, owner_id: Uuid) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let clients = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE owner_id = $1
            ORDER BY name
            "#,
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();

        Ok(clients)
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id, client_id = %client_id))]
    async fn update_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        input: &UpdateClient,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                company = COALESCE($6, company)
            WHERE owner_id = $1 AND client_id = $2
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(client_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.company)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    async fn delete_client(&self, owner_id: Uuid, client_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_client"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM clients
            WHERE owner_id = $1 AND client_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete client: {}", e)))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(client_id = %client_id, "Client deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    async fn count_invoices_for_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM invoices
            WHERE owner_id = $1 AND client_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
        })?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Insert an invoice with a race-free sequence number.
    ///
    /// The per-(owner, year) counter row is advanced inside the same
    /// transaction as the invoice insert, so two concurrent creations cannot
    /// observe the same sequence value. The unique index on
    /// (owner_id, invoice_number) is the backstop.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, client_id = %input.client_id))]
    async fn insert_invoice(
        &self,
        owner_id: Uuid,
        issue_date: NaiveDate,
        input: &CreateInvoice,
        terms: &str,
    ) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();

        let year = issue_date.year();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_sequences (owner_id, year, last_seq)
            VALUES ($1, $2, 1)
            ON CONFLICT (owner_id, year)
            DO UPDATE SET last_seq = invoice_sequences.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(owner_id)
        .bind(year)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to allocate sequence: {}", e))
        })?;

        let invoice_number = format_invoice_number(year, seq);
        let invoice_id = Uuid::new_v4();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                invoice_id, owner_id, client_id, invoice_number, amount, description,
                line_items, status, issue_date, due_date, notes, terms
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', $8, $9, $10, $11)
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(invoice_id)
        .bind(owner_id)
        .bind(input.client_id)
        .bind(&invoice_number)
        .bind(input.amount)
        .bind(&input.description)
        .bind(sqlx::types::Json(&input.line_items))
        .bind(issue_date)
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(terms)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice number {} already allocated",
                    invoice_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.invoice_number,
            "Invoice created"
        );

        Ok(invoice)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn get_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE owner_id = $1 AND invoice_id = $2
            "#,
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self, filter), fields(owner_id = %owner_id))]
    async fn list_invoices(
        &self,
        owner_id: Uuid,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let limit = filter.page_size.clamp(1, 100) as i64;
        let status_str = filter.status.map(|s| s.as_str().to_string());

        let invoices = if let Some(cursor) = filter.page_token {
            sqlx::query_as::<_, Invoice>(&format!(
                r#"
                SELECT {INVOICE_COLUMNS}
                FROM invoices
                WHERE owner_id = $1
                  AND ($2::varchar IS NULL OR status = $2)
                  AND ($3::uuid IS NULL OR client_id = $3)
                  AND ($4::date IS NULL OR issue_date >= $4)
                  AND ($5::date IS NULL OR issue_date <= $5)
                  AND invoice_id > $6
                ORDER BY invoice_id
                LIMIT $7
                "#,
            ))
            .bind(owner_id)
            .bind(&status_str)
            .bind(filter.client_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Invoice>(&format!(
                r#"
                SELECT {INVOICE_COLUMNS}
                FROM invoices
                WHERE owner_id = $1
                  AND ($2::varchar IS NULL OR status = $2)
                  AND ($3::uuid IS NULL OR client_id = $3)
                  AND ($4::date IS NULL OR issue_date >= $4)
                  AND ($5::date IS NULL OR issue_date <= $5)
                ORDER BY invoice_id
                LIMIT $6
                "#,
            ))
            .bind(owner_id)
            .bind(&status_str)
            .bind(filter.client_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Apply a field update to a non-paid invoice. The `status <> 'paid'`
    /// guard holds even when the caller's precondition check raced with a
    /// concurrent mark-paid.
    #[instrument(skip(self, input), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let status_str = input.status.map(|s| s.as_str().to_string());
        let line_items = input.line_items.as_ref().map(sqlx::types::Json);

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET amount = COALESCE($3, amount),
                description = COALESCE($4, description),
                line_items = COALESCE($5, line_items),
                due_date = COALESCE($6, due_date),
                status = COALESCE($7, status),
                notes = COALESCE($8, notes),
                terms = COALESCE($9, terms)
            WHERE owner_id = $1 AND invoice_id = $2 AND status <> 'paid'
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .bind(input.amount)
        .bind(&input.description)
        .bind(line_items)
        .bind(input.due_date)
        .bind(&status_str)
        .bind(&input.notes)
        .bind(&input.terms)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.invoice_id, "Invoice updated");
        }

        Ok(invoice)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn delete_invoice(&self, owner_id: Uuid, invoice_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM invoices
            WHERE owner_id = $1 AND invoice_id = $2 AND status <> 'paid'
            "#,
        )
        .bind(owner_id)
        .bind(invoice_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e)))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(invoice_id = %invoice_id, "Invoice deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn attach_prediction(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        predicted_payment_date: NaiveDate,
        confidence: f64,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["attach_prediction"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET predicted_payment_date = $3,
                prediction_confidence = $4
            WHERE owner_id = $1 AND invoice_id = $2
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .bind(predicted_payment_date)
        .bind(confidence)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to attach prediction: {}", e))
        })?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    async fn paid_payment_samples(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<PaymentSample>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["paid_payment_samples"])
            .start_timer();

        let samples = sqlx::query_as::<_, PaymentSample>(
            r#"
            SELECT issue_date, paid_date
            FROM invoices
            WHERE owner_id = $1 AND client_id = $2 AND status = 'paid'
            ORDER BY paid_date
            "#,
        )
        .bind(owner_id)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get payment history: {}", e))
        })?;

        timer.observe_duration();

        Ok(samples)
    }

    /// Mark an invoice paid and write its income record in one transaction.
    ///
    /// The invoice row is locked up front; the status-guarded update detects
    /// a concurrent mark-paid that slipped in before the lock. Both writes
    /// commit together or not at all.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn mark_invoice_paid(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        paid_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<(Invoice, IncomeRecord), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_invoice_paid"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let existing = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE owner_id = $1 AND invoice_id = $2
            FOR UPDATE
            "#,
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock invoice: {}", e)))?;

        let existing = match existing {
            Some(inv) => inv,
            None => {
                return Err(AppError::NotFound(anyhow::anyhow!("Invoice not found")));
            }
        };

        match existing.status() {
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

        let client_name: String =
            sqlx::query_scalar("SELECT name FROM clients WHERE owner_id = $1 AND client_id = $2")
                .bind(owner_id)
                .bind(existing.client_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to resolve client: {}", e))
                })?;

        let income_id = Uuid::new_v4();
        let income = sqlx::query_as::<_, IncomeRecord>(&format!(
            r#"
            INSERT INTO income_records (
                income_id, owner_id, amount, client_id, client_name,
                project_name, source, logged_at, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'invoice', $7, $8)
            RETURNING {INCOME_COLUMNS}
            "#,
        ))
        .bind(income_id)
        .bind(owner_id)
        .bind(existing.amount)
        .bind(existing.client_id)
        .bind(&client_name)
        .bind(&existing.description)
        .bind(paid_date)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create income record: {}", e))
        })?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET status = 'paid',
                paid_date = $3,
                income_record_id = $4,
                notes = COALESCE($5, notes)
            WHERE owner_id = $1 AND invoice_id = $2 AND status <> 'paid'
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(invoice_id)
        .bind(paid_date)
        .bind(income_id)
        .bind(notes)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to mark invoice paid: {}", e))
        })?;

        let invoice = match invoice {
            Some(inv) => inv,
            None => {
                // Concurrent caller won the race; the dropped transaction
                // rolls our income insert back with it.
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} is already paid",
                    existing.invoice_number
                )));
            }
        };

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.invoice_number,
            income_id = %income.income_id,
            amount = %income.amount,
            "Invoice marked paid"
        );

        Ok((invoice, income))
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    async fn invoice_details(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceDetails>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_details"])
            .start_timer();

        let invoice = match self.get_invoice(owner_id, invoice_id).await? {
            Some(inv) => inv,
            None => return Ok(None),
        };

        let client = match self.get_client(owner_id, invoice.client_id).await? {
            Some(c) => c,
            None => return Ok(None),
        };

        let income = match invoice.income_record_id {
            Some(income_id) => sqlx::query_as::<_, IncomeRecord>(&format!(
                r#"
                SELECT {INCOME_COLUMNS}
                FROM income_records
                WHERE owner_id = $1 AND income_id = $2
                "#,
            ))
            .bind(owner_id)
            .bind(income_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get income record: {}", e))
            })?,
            None => None,
        };

        timer.observe_duration();

        Ok(Some(InvoiceDetails {
            invoice,
            client,
            income,
        }))
    }
}
