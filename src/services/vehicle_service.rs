use crate::models::{Vehicle, VehiclePayload, VehicleView};
use crate::store::Stores;

use super::{sync, DomainError};

pub struct VehicleService {
    stores: Stores,
}

impl VehicleService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn find_all(&self) -> Result<Vec<VehicleView>, DomainError> {
        let vehicles = self.stores.vehicles.find_all().await?;
        let mut views = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            views.push(self.view(vehicle).await?);
        }
        Ok(views)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<VehicleView, DomainError> {
        let vehicle = self.stores.vehicles.find_by_id(id).await?.ok_or_else(|| {
            DomainError::VehicleNotFound(format!("Vehicle with id: {id} not found"))
        })?;
        self.view(vehicle).await
    }

    pub async fn find_by_vin(&self, vin: &str) -> Result<VehicleView, DomainError> {
        let vehicle = self.stores.vehicles.find_by_vin(vin).await?.ok_or_else(|| {
            DomainError::VehicleNotFound(format!("Vehicle with vin: {vin} not found"))
        })?;
        self.view(vehicle).await
    }

    pub async fn find_by_licence_plate(&self, plate: &str) -> Result<VehicleView, DomainError> {
        let vehicle = self
            .stores
            .vehicles
            .find_by_licence_plate(plate)
            .await?
            .ok_or_else(|| {
                DomainError::VehicleNotFound(format!(
                    "Vehicle with licence plate: {plate} not found"
                ))
            })?;
        self.view(vehicle).await
    }

    /// Create-or-replace with the same association policy as the client
    /// side: the client list is reconciled only when the payload includes it.
    pub async fn save(&self, mut payload: VehiclePayload) -> Result<VehicleView, DomainError> {
        let clients = payload.clients.take();

        let existing = match payload.id {
            Some(id) => self.stores.vehicles.find_by_id(id).await?,
            None => None,
        };

        let vehicle = match existing {
            Some(current) => {
                let fuel_type = payload.fuel_type.unwrap_or(current.fuel_type);
                let vehicle = payload.into_vehicle(current.id, fuel_type);
                self.stores.vehicles.update(&vehicle).await?;
                if let Some(refs) = &clients {
                    sync::set_clients_for_vehicle(&self.stores, vehicle.id, refs).await?;
                }
                vehicle
            }
            None => {
                let fuel_type = payload
                    .fuel_type
                    .ok_or_else(|| DomainError::Validation("fuelType is required".to_string()))?;
                if let Some(refs) = &clients {
                    sync::ensure_clients_exist(&self.stores, refs).await?;
                }
                let vehicle = self
                    .stores
                    .vehicles
                    .insert(payload.into_vehicle(0, fuel_type))
                    .await?;
                if let Some(refs) = &clients {
                    sync::set_clients_for_vehicle(&self.stores, vehicle.id, refs).await?;
                }
                vehicle
            }
        };

        self.view(vehicle).await
    }

    /// Replace every scalar field; the stored association is preserved.
    pub async fn full_update(
        &self,
        id: i64,
        payload: VehiclePayload,
    ) -> Result<VehicleView, DomainError> {
        let current = self.stores.vehicles.find_by_id(id).await?.ok_or_else(|| {
            DomainError::VehicleNotFound(format!("Cannot update vehicle with id: {id}"))
        })?;

        let fuel_type = payload.fuel_type.unwrap_or(current.fuel_type);
        let vehicle = payload.into_vehicle(id, fuel_type);
        self.stores.vehicles.update(&vehicle).await?;
        self.view(vehicle).await
    }

    pub async fn partial_update(
        &self,
        id: i64,
        payload: VehiclePayload,
    ) -> Result<VehicleView, DomainError> {
        let mut existing = self.stores.vehicles.find_by_id(id).await?.ok_or_else(|| {
            DomainError::VehicleNotFound(format!("Cannot update vehicle with id: {id}"))
        })?;

        if let Some(refs) = &payload.clients {
            sync::ensure_clients_exist(&self.stores, refs).await?;
        }

        payload.apply_scalars(&mut existing);
        self.stores.vehicles.update(&existing).await?;

        if let Some(refs) = &payload.clients {
            sync::set_clients_for_vehicle(&self.stores, id, refs).await?;
        }

        self.view(existing).await
    }

    /// Refuses while repairs still reference the vehicle.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if self.stores.vehicles.find_by_id(id).await?.is_none() {
            return Err(DomainError::VehicleNotFound(format!(
                "Vehicle with id: {id} not found"
            )));
        }
        if self.stores.repairs.exists_for_vehicle(id).await? {
            return Err(DomainError::Validation(format!(
                "Vehicle with id: {id} is still referenced by repairs"
            )));
        }

        sync::set_clients_for_vehicle(&self.stores, id, &[]).await?;
        self.stores.vehicles.delete(id).await?;
        Ok(())
    }

    async fn view(&self, vehicle: Vehicle) -> Result<VehicleView, DomainError> {
        let client_ids = self.stores.links.client_ids_for_vehicle(vehicle.id).await?;
        let clients = self.stores.clients.find_by_ids(&client_ids).await?;
        Ok(VehicleView { vehicle, clients })
    }
}
