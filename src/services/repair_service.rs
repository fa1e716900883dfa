use std::sync::Arc;

use crate::models::{
    Repair, RepairPayload, RepairView, RepairWithClientsView, Vehicle,
};
use crate::store::Stores;

use super::{DomainError, FileStorageService};

pub struct RepairService {
    stores: Stores,
    files: Arc<FileStorageService>,
}

impl RepairService {
    pub fn new(stores: Stores, files: Arc<FileStorageService>) -> Self {
        Self { stores, files }
    }

    pub async fn find_all(&self) -> Result<Vec<RepairView>, DomainError> {
        let repairs = self.stores.repairs.find_all().await?;
        let mut views = Vec::with_capacity(repairs.len());
        for repair in repairs {
            views.push(self.view(repair).await?);
        }
        Ok(views)
    }

    /// Views extended with the derived client set: the vehicle's clients at
    /// read time, never a stored field.
    pub async fn find_all_with_clients(&self) -> Result<Vec<RepairWithClientsView>, DomainError> {
        let repairs = self.stores.repairs.find_all().await?;
        let mut views = Vec::with_capacity(repairs.len());
        for repair in repairs {
            views.push(self.view_with_clients(repair).await?);
        }
        Ok(views)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<RepairView, DomainError> {
        let repair = self
            .stores
            .repairs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::RepairNotFound(format!("Repair with id: {id} not found")))?;
        self.view(repair).await
    }

    pub async fn find_by_id_with_clients(
        &self,
        id: i64,
    ) -> Result<RepairWithClientsView, DomainError> {
        let repair = self
            .stores
            .repairs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::RepairNotFound(format!("Repair with id: {id} not found")))?;
        self.view_with_clients(repair).await
    }

    pub async fn find_by_number(&self, number: &str) -> Result<RepairView, DomainError> {
        let repair = self
            .stores
            .repairs
            .find_by_number(number)
            .await?
            .ok_or_else(|| {
                DomainError::RepairNotFound(format!("Repair with number: {number} not found"))
            })?;
        self.view(repair).await
    }

    /// Create-or-replace. A new repair requires a resolvable vehicle
    /// reference and a type; on replace an absent reference keeps the
    /// current vehicle.
    pub async fn save(&self, payload: RepairPayload) -> Result<RepairView, DomainError> {
        let existing = match payload.id {
            Some(id) => self.stores.repairs.find_by_id(id).await?,
            None => None,
        };

        match existing {
            Some(current) => {
                let vehicle = match payload.vehicle {
                    Some(reference) => self.resolve_vehicle(reference.id).await?,
                    None => self.vehicle_of(&current).await?,
                };
                let repair_type = payload.repair_type.unwrap_or(current.repair_type);
                let repair = payload.into_repair(current.id, repair_type, vehicle.id);
                self.stores.repairs.update(&repair).await?;
                Ok(RepairView::new(repair, vehicle))
            }
            None => {
                let reference = payload.vehicle.ok_or_else(|| {
                    DomainError::Validation("vehicle is required".to_string())
                })?;
                let vehicle = self.resolve_vehicle(reference.id).await?;
                let repair_type = payload
                    .repair_type
                    .ok_or_else(|| DomainError::Validation("type is required".to_string()))?;
                let repair = self
                    .stores
                    .repairs
                    .insert(payload.into_repair(0, repair_type, vehicle.id))
                    .await?;
                Ok(RepairView::new(repair, vehicle))
            }
        }
    }

    pub async fn partial_update(
        &self,
        id: i64,
        payload: RepairPayload,
    ) -> Result<RepairView, DomainError> {
        let mut existing = self
            .stores
            .repairs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::RepairNotFound(format!("Cannot update repair with id: {id}")))?;

        if let Some(reference) = payload.vehicle {
            let vehicle = self.resolve_vehicle(reference.id).await?;
            existing.vehicle_id = vehicle.id;
        }

        payload.apply_scalars(&mut existing);
        self.stores.repairs.update(&existing).await?;
        self.view(existing).await
    }

    /// Deletes the repair's files first (bytes, then metadata, one by one),
    /// then the repair row itself.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if self.stores.repairs.find_by_id(id).await?.is_none() {
            return Err(DomainError::RepairNotFound(format!(
                "Cannot delete repair with id: {id}"
            )));
        }

        self.files.delete_all_by_repair(id).await?;
        self.stores.repairs.delete(id).await?;
        Ok(())
    }

    async fn resolve_vehicle(&self, id: i64) -> Result<Vehicle, DomainError> {
        self.stores.vehicles.find_by_id(id).await?.ok_or_else(|| {
            DomainError::VehicleNotFound(format!("Vehicle with id: {id} not found"))
        })
    }

    async fn vehicle_of(&self, repair: &Repair) -> Result<Vehicle, DomainError> {
        self.stores
            .vehicles
            .find_by_id(repair.vehicle_id)
            .await?
            .ok_or_else(|| {
                DomainError::Internal(format!(
                    "vehicle row {} missing for repair {}",
                    repair.vehicle_id, repair.id
                ))
            })
    }

    async fn view(&self, repair: Repair) -> Result<RepairView, DomainError> {
        let vehicle = self.vehicle_of(&repair).await?;
        Ok(RepairView::new(repair, vehicle))
    }

    async fn view_with_clients(&self, repair: Repair) -> Result<RepairWithClientsView, DomainError> {
        let vehicle = self.vehicle_of(&repair).await?;
        let client_ids = self.stores.links.client_ids_for_vehicle(vehicle.id).await?;
        let clients = self.stores.clients.find_by_ids(&client_ids).await?;
        Ok(RepairWithClientsView::new(repair, vehicle, clients))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, EntityRef, FuelType, RepairType, VehiclePayload};
    use crate::services::{sync, VehicleService};
    use crate::store::memory::MemoryStore;

    async fn setup() -> (RepairService, Stores, i64, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let stores = MemoryStore::new().stores();
        let files = Arc::new(FileStorageService::new(
            dir.path().to_path_buf(),
            "http://localhost:8080/".to_string(),
            stores.clone(),
        ));
        let service = RepairService::new(stores.clone(), files);

        let vehicle = VehicleService::new(stores.clone())
            .save(VehiclePayload {
                fuel_type: Some(FuelType::Petrol),
                ..Default::default()
            })
            .await
            .unwrap();

        (service, stores, vehicle.vehicle.id, dir)
    }

    fn new_repair(vehicle_id: i64, number: &str) -> RepairPayload {
        RepairPayload {
            number: Some(number.to_string()),
            repair_type: Some(RepairType::Normal),
            vehicle: Some(EntityRef::new(vehicle_id)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_requires_existing_vehicle() {
        let (service, stores, _, _dir) = setup().await;

        let err = service.save(new_repair(404, "21G-01-2024")).await.unwrap_err();
        assert!(matches!(err, DomainError::VehicleNotFound(_)));
        assert!(stores.repairs.find_all().await.unwrap().is_empty());

        let err = service
            .save(RepairPayload {
                repair_type: Some(RepairType::Normal),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn clients_are_derived_from_the_vehicle() {
        let (service, stores, vehicle_id, _dir) = setup().await;
        let created = service
            .save(new_repair(vehicle_id, "21G-01-2024"))
            .await
            .unwrap();

        let before = service
            .find_by_id_with_clients(created.id)
            .await
            .unwrap();
        assert!(before.clients.is_empty());

        let client = stores
            .clients
            .insert(Client {
                id: 0,
                firstname: Some("John".to_string()),
                surname: Some("Doe".to_string()),
                pesel: None,
                nip: None,
                phone_number: None,
                email: None,
                country: None,
                postal_code: None,
                city: None,
                address: None,
                birth_date: None,
            })
            .await
            .unwrap();
        sync::set_clients_for_vehicle(&stores, vehicle_id, &[EntityRef::new(client.id)])
            .await
            .unwrap();

        let after = service.find_by_id_with_clients(created.id).await.unwrap();
        assert_eq!(after.clients.len(), 1);
        assert_eq!(after.clients[0].id, client.id);
    }

    #[tokio::test]
    async fn patch_with_missing_vehicle_reference_fails() {
        let (service, _, vehicle_id, _dir) = setup().await;
        let created = service
            .save(new_repair(vehicle_id, "21G-01-2024"))
            .await
            .unwrap();

        let err = service
            .partial_update(
                created.id,
                RepairPayload {
                    vehicle: Some(EntityRef::new(404)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VehicleNotFound(_)));

        // the stored vehicle reference is unchanged
        let unchanged = service.find_by_id(created.id).await.unwrap();
        assert_eq!(unchanged.vehicle.id, vehicle_id);
    }

    #[tokio::test]
    async fn delete_removes_files_first() {
        let (service, stores, vehicle_id, _dir) = setup().await;
        let created = service
            .save(new_repair(vehicle_id, "21G-01-2024"))
            .await
            .unwrap();

        service
            .files
            .upload(created.id, "a.pdf", Some("application/pdf"), b"a")
            .await
            .unwrap();
        service
            .files
            .upload(created.id, "b.pdf", Some("application/pdf"), b"b")
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();

        assert!(stores
            .files
            .find_by_repair_id(created.id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            service.find_by_id(created.id).await.unwrap_err(),
            DomainError::RepairNotFound(_)
        ));
    }

    #[tokio::test]
    async fn duplicate_number_is_a_duplicate_error() {
        let (service, _, vehicle_id, _dir) = setup().await;
        service.save(new_repair(vehicle_id, "21G-01-2024")).await.unwrap();

        let err = service
            .save(new_repair(vehicle_id, "21G-01-2024"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));
    }
}
