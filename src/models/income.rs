//! Income ledger entry model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An income event. Entries created by the invoice lifecycle carry
/// `source = "invoice"` and are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IncomeRecord {
    pub income_id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub project_name: String,
    pub source: String,
    pub logged_at: NaiveDate,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}
