use crate::models::{Client, ClientPayload, ClientView};
use crate::store::Stores;

use super::{sync, DomainError};

pub struct ClientService {
    stores: Stores,
}

impl ClientService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn find_all(&self) -> Result<Vec<ClientView>, DomainError> {
        let clients = self.stores.clients.find_all().await?;
        let mut views = Vec::with_capacity(clients.len());
        for client in clients {
            views.push(self.view(client).await?);
        }
        Ok(views)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<ClientView, DomainError> {
        let client = self
            .stores
            .clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ClientNotFound(format!("Client with id: {id} not found")))?;
        self.view(client).await
    }

    pub async fn find_by_surname(&self, surname: &str) -> Result<Vec<ClientView>, DomainError> {
        let clients = self.stores.clients.find_by_surname(surname).await?;
        let mut views = Vec::with_capacity(clients.len());
        for client in clients {
            views.push(self.view(client).await?);
        }
        Ok(views)
    }

    /// Create-or-replace. Without an id (or with an unknown one) a new row is
    /// inserted; with an existing id every scalar field is replaced. The
    /// vehicle association is reconciled only when the payload includes it.
    pub async fn save(&self, mut payload: ClientPayload) -> Result<ClientView, DomainError> {
        let vehicles = payload.vehicles.take();

        let existing = match payload.id {
            Some(id) => self.stores.clients.find_by_id(id).await?,
            None => None,
        };

        let client = match existing {
            Some(current) => {
                let client = payload.into_client(current.id);
                self.stores.clients.update(&client).await?;
                if let Some(refs) = &vehicles {
                    sync::set_vehicles_for_client(&self.stores, client.id, refs).await?;
                }
                client
            }
            None => {
                // resolve references up front so a dangling id persists nothing
                if let Some(refs) = &vehicles {
                    sync::ensure_vehicles_exist(&self.stores, refs).await?;
                }
                let client = self.stores.clients.insert(payload.into_client(0)).await?;
                if let Some(refs) = &vehicles {
                    sync::set_vehicles_for_client(&self.stores, client.id, refs).await?;
                }
                client
            }
        };

        self.view(client).await
    }

    /// Replace every scalar field; the stored association is preserved.
    pub async fn full_update(
        &self,
        id: i64,
        payload: ClientPayload,
    ) -> Result<ClientView, DomainError> {
        if self.stores.clients.find_by_id(id).await?.is_none() {
            return Err(DomainError::ClientNotFound(format!(
                "Cannot update client with id: {id}"
            )));
        }

        let client = payload.into_client(id);
        self.stores.clients.update(&client).await?;
        self.view(client).await
    }

    /// Merge the fields present in the payload; an included vehicle list
    /// (even an empty one) is reconciled, an absent one is left untouched.
    pub async fn partial_update(
        &self,
        id: i64,
        payload: ClientPayload,
    ) -> Result<ClientView, DomainError> {
        let mut existing = self
            .stores
            .clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ClientNotFound(format!("Cannot update client with id: {id}")))?;

        if let Some(refs) = &payload.vehicles {
            sync::ensure_vehicles_exist(&self.stores, refs).await?;
        }

        payload.apply_scalars(&mut existing);
        self.stores.clients.update(&existing).await?;

        if let Some(refs) = &payload.vehicles {
            sync::set_vehicles_for_client(&self.stores, id, refs).await?;
        }

        self.view(existing).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if self.stores.clients.find_by_id(id).await?.is_none() {
            return Err(DomainError::ClientNotFound(format!(
                "Client with id: {id} not found"
            )));
        }

        sync::set_vehicles_for_client(&self.stores, id, &[]).await?;
        self.stores.clients.delete(id).await?;
        Ok(())
    }

    async fn view(&self, client: Client) -> Result<ClientView, DomainError> {
        let vehicle_ids = self.stores.links.vehicle_ids_for_client(client.id).await?;
        let vehicles = self.stores.vehicles.find_by_ids(&vehicle_ids).await?;
        Ok(ClientView { client, vehicles })
    }
}
