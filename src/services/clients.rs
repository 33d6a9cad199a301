//! Client registry: owner-scoped CRUD over client records.
//!
//! Ownership failures are reported as `NotFound` so callers cannot probe for
//! other users' clients.

use crate::error::AppError;
use crate::models::{Client, CreateClient, UpdateClient};
use crate::services::store::FinanceStore;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct ClientRegistry {
    store: Arc<dyn FinanceStore>,
}

impl ClientRegistry {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn create_client(&self, input: CreateClient) -> Result<Client, AppError> {
        self.store.insert_client(&input).await
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn get_client(&self, owner_id: Uuid, client_id: Uuid) -> Result<Client, AppError> {
        self.store
            .get_client(owner_id, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_clients(&self, owner_id: Uuid) -> Result<Vec<Client>, AppError> {
        self.store.list_clients(owner_id).await
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn update_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        input: UpdateClient,
    ) -> Result<Client, AppError> {
        self.store
            .update_client(owner_id, client_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))
    }

    /// Delete a client. Clients with invoices cannot be removed; invoices
    /// reference them for their whole lifetime.
    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn delete_client(&self, owner_id: Uuid, client_id: Uuid) -> Result<(), AppError> {
        let invoice_count = self
            .store
            .count_invoices_for_client(owner_id, client_id)
            .await?;
        if invoice_count > 0 {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Client has {} invoice(s) and cannot be deleted",
                invoice_count
            )));
        }

        if !self.store.delete_client(owner_id, client_id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Client not found")));
        }
        Ok(())
    }
}
