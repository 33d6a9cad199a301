use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub predictor: PredictorConfig,
    pub observability: ObservabilityConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PredictorConfig {
    /// Base URL of the payment-time prediction service. Empty means the
    /// predictor is disabled and invoices are created without predictions.
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// OTLP collector endpoint; empty disables span export.
    pub otlp_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let db_url = env::var("FINTRACK_DATABASE_URL").expect("FINTRACK_DATABASE_URL must be set");
        let max_connections = env::var("FINTRACK_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("FINTRACK_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        let predictor_url = env::var("FINTRACK_PREDICTOR_URL").unwrap_or_default();
        let predictor_timeout = env::var("FINTRACK_PREDICTOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        let log_level = env::var("FINTRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let otlp_endpoint = env::var("FINTRACK_OTLP_ENDPOINT").unwrap_or_default();

        Ok(Self {
            database: DatabaseConfig {
                url: Secret::new(db_url),
                max_connections,
                min_connections,
            },
            predictor: PredictorConfig {
                base_url: predictor_url,
                timeout_secs: predictor_timeout,
            },
            observability: ObservabilityConfig {
                log_level,
                otlp_endpoint,
            },
            service_name: "fintrack-service".to_string(),
        })
    }
}
