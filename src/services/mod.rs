//! Services module for fintrack-service.

pub mod clients;
pub mod database;
pub mod lifecycle;
pub mod metrics;
pub mod predictor;
pub mod stats;
pub mod store;

pub use clients::ClientRegistry;
pub use database::Database;
pub use lifecycle::InvoiceLifecycle;
pub use metrics::{get_metrics, init_metrics};
pub use predictor::PredictorClient;
pub use store::FinanceStore;
