//! fintrack-service: financial-tracking backend for freelancers.
//!
//! This crate owns the invoice lifecycle: client records, sequence-numbered
//! invoice creation, payment-time prediction enrichment, and the atomic
//! mark-paid flow that writes the income ledger. The HTTP transport, auth,
//! and rendering layers live outside and consume the services exposed here.

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
