//! Payment statistics calculator.
//!
//! Pure aggregation over a client's paid-invoice history; the lifecycle
//! manager feeds the result to the payment-time predictor.

use crate::models::{ClientPaymentStats, PaymentSample};

/// Invoices taking longer than this many days count as late. Fixed
/// threshold, not derived from each invoice's due date.
const LATE_THRESHOLD_DAYS: i64 = 30;

/// How many of the most recent samples feed the trend metric.
const TREND_WINDOW: usize = 5;

/// Compute aggregate payment-behavior metrics from a client's paid invoices.
///
/// `samples` must be ordered oldest to newest; samples without a paid date
/// are skipped. Returns all-zero statistics for an empty history.
pub fn compute_stats(samples: &[PaymentSample]) -> ClientPaymentStats {
    let payment_days: Vec<i64> = samples
        .iter()
        .filter_map(|s| s.paid_date.map(|paid| (paid - s.issue_date).num_days()))
        .collect();

    if payment_days.is_empty() {
        return ClientPaymentStats::zero();
    }

    let n = payment_days.len();
    let avg = payment_days.iter().sum::<i64>() as f64 / n as f64;

    let late = payment_days
        .iter()
        .filter(|&&d| d > LATE_THRESHOLD_DAYS)
        .count();
    let late_rate = late as f64 / n as f64;

    // Population standard deviation (denominator N).
    let variance = payment_days
        .iter()
        .map(|&d| {
            let diff = d as f64 - avg;
            diff * diff
        })
        .sum::<f64>()
        / n as f64;
    let std_dev = variance.sqrt();

    let window = TREND_WINDOW.min(n);
    let recent_avg =
        payment_days[n - window..].iter().sum::<i64>() as f64 / window as f64;
    let trend = avg - recent_avg;

    ClientPaymentStats {
        avg_payment_days: avg,
        payment_std_dev: std_dev,
        late_payment_rate: late_rate,
        total_invoices: n as u32,
        payment_trend: trend,
    }
}
