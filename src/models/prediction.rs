//! Derived payment-behavior types. Neither is persisted as its own entity;
//! statistics are recomputed per invoice and only the predicted date and
//! confidence are written back to the invoice row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One paid invoice's dates, the raw input to the statistics calculator.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct PaymentSample {
    pub issue_date: NaiveDate,
    /// Defensive: the paid-history query only selects paid invoices, but a
    /// missing date is tolerated and the sample skipped.
    pub paid_date: Option<NaiveDate>,
}

/// Aggregate payment-behavior metrics for one client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClientPaymentStats {
    pub avg_payment_days: f64,
    pub payment_std_dev: f64,
    pub late_payment_rate: f64,
    pub total_invoices: u32,
    /// Overall mean minus the mean of the most recent samples; positive
    /// means recent payments arrive faster than the historical average.
    pub payment_trend: f64,
}

impl ClientPaymentStats {
    pub fn zero() -> Self {
        Self {
            avg_payment_days: 0.0,
            payment_std_dev: 0.0,
            late_payment_rate: 0.0,
            total_invoices: 0,
            payment_trend: 0.0,
        }
    }
}

/// Response from the external payment-time predictor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentPrediction {
    pub predicted_payment_days: f64,
    pub confidence_score: f64,
    pub predicted_payment_date: NaiveDate,
    #[serde(default)]
    pub feature_importance: serde_json::Value,
}
