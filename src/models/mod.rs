//! Domain models for fintrack-service.

mod client;
mod income;
mod invoice;
mod prediction;

pub use client::{Client, CreateClient, UpdateClient};
pub use income::IncomeRecord;
pub use invoice::{
    format_invoice_number, CreateInvoice, Invoice, InvoiceDetails, InvoiceStatus, LineItem,
    ListInvoicesFilter, UpdateInvoice,
};
pub use prediction::{ClientPaymentStats, PaymentPrediction, PaymentSample};
