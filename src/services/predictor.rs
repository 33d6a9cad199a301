//! Payment-time predictor gateway.
//!
//! Fault-tolerant client for the external prediction service. The call sits
//! on a best-effort side path of invoice creation: every failure mode is
//! logged and absorbed, and the caller only ever sees `Option`.

use crate::config::PredictorConfig;
use crate::models::{ClientPaymentStats, PaymentPrediction};
use crate::services::metrics::PREDICTIONS_TOTAL;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// Wire request for `POST /predict/payment-time`.
#[derive(Debug, Serialize)]
struct PredictRequest {
    client_avg_payment_days: f64,
    client_late_payment_rate: f64,
    client_payment_std: f64,
    client_total_invoices: u32,
    client_payment_trend: f64,
    amount: f64,
    /// ISO-8601 date.
    issue_date: NaiveDate,
}

/// Client for the external payment-time prediction service.
#[derive(Clone)]
pub struct PredictorClient {
    client: Client,
    config: PredictorConfig,
}

impl PredictorClient {
    pub fn new(config: PredictorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    /// Check if a predictor endpoint is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.base_url.is_empty()
    }

    /// Request a payment-time prediction. Single attempt, hard timeout.
    ///
    /// Returns `None` on any failure (unconfigured, timeout, non-2xx,
    /// malformed body); the failure is logged with context and counted, and
    /// never propagates to the invoice creation path.
    pub async fn predict_payment_time(
        &self,
        stats: &ClientPaymentStats,
        amount: Decimal,
        issue_date: NaiveDate,
    ) -> Option<PaymentPrediction> {
        if !self.is_configured() {
            PREDICTIONS_TOTAL.with_label_values(&["skipped"]).inc();
            return None;
        }

        match self.request_prediction(stats, amount, issue_date).await {
            Ok(prediction) => {
                tracing::info!(
                    predicted_payment_days = prediction.predicted_payment_days,
                    confidence = prediction.confidence_score,
                    "Payment prediction received"
                );
                PREDICTIONS_TOTAL.with_label_values(&["attached"]).inc();
                Some(prediction)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    total_invoices = stats.total_invoices,
                    "Payment prediction failed, continuing without one"
                );
                PREDICTIONS_TOTAL.with_label_values(&["failed"]).inc();
                None
            }
        }
    }

    async fn request_prediction(
        &self,
        stats: &ClientPaymentStats,
        amount: Decimal,
        issue_date: NaiveDate,
    ) -> Result<PaymentPrediction> {
        let request = PredictRequest {
            client_avg_payment_days: stats.avg_payment_days,
            client_late_payment_rate: stats.late_payment_rate,
            client_payment_std: stats.payment_std_dev,
            client_total_invoices: stats.total_invoices,
            client_payment_trend: stats.payment_trend,
            amount: amount.to_f64().unwrap_or(0.0),
            issue_date,
        };

        let url = format!("{}/predict/payment-time", self.config.base_url);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, "Predictor response");

        if !status.is_success() {
            return Err(anyhow!("predictor returned {}: {}", status, body));
        }

        let prediction: PaymentPrediction = serde_json::from_str(&body)
            .map_err(|e| anyhow!("malformed predictor response: {}", e))?;
        Ok(prediction)
    }
}
