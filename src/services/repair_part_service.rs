use crate::models::{Part, RepairPart, RepairPartPayload, RepairPartView};
use crate::store::Stores;

use super::DomainError;

pub struct RepairPartService {
    stores: Stores,
}

impl RepairPartService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn find_all(&self) -> Result<Vec<RepairPartView>, DomainError> {
        let repair_parts = self.stores.repair_parts.find_all().await?;
        let mut views = Vec::with_capacity(repair_parts.len());
        for repair_part in repair_parts {
            views.push(self.view(repair_part).await?);
        }
        Ok(views)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<RepairPartView, DomainError> {
        let repair_part = self
            .stores
            .repair_parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DomainError::RepairPartNotFound(format!("Repair part with id: {id} not found"))
            })?;
        self.view(repair_part).await
    }

    pub async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<RepairPartView>, DomainError> {
        if self.stores.repairs.find_by_id(repair_id).await?.is_none() {
            return Err(DomainError::RepairNotFound(format!(
                "Repair with id: {repair_id} not found"
            )));
        }

        let repair_parts = self.stores.repair_parts.find_by_repair_id(repair_id).await?;
        let mut views = Vec::with_capacity(repair_parts.len());
        for repair_part in repair_parts {
            views.push(self.view(repair_part).await?);
        }
        Ok(views)
    }

    /// Create-or-replace. A new line item requires resolvable repair and
    /// part references and a work type.
    pub async fn save(&self, payload: RepairPartPayload) -> Result<RepairPartView, DomainError> {
        let existing = match payload.id {
            Some(id) => self.stores.repair_parts.find_by_id(id).await?,
            None => None,
        };

        match existing {
            Some(current) => {
                let repair_id = match payload.repair {
                    Some(reference) => self.resolve_repair(reference.id).await?,
                    None => current.repair_id,
                };
                let part = match payload.part {
                    Some(reference) => self.resolve_part(reference.id).await?,
                    None => self.part_of(&current).await?,
                };
                let work_type = payload.work_type.unwrap_or(current.work_type);
                let repair_part =
                    payload.into_repair_part(current.id, repair_id, part.id, work_type);
                self.stores.repair_parts.update(&repair_part).await?;
                Ok(RepairPartView::new(repair_part, part))
            }
            None => {
                let repair_ref = payload
                    .repair
                    .ok_or_else(|| DomainError::Validation("repair is required".to_string()))?;
                let part_ref = payload
                    .part
                    .ok_or_else(|| DomainError::Validation("part is required".to_string()))?;
                let work_type = payload
                    .work_type
                    .ok_or_else(|| DomainError::Validation("workType is required".to_string()))?;

                let repair_id = self.resolve_repair(repair_ref.id).await?;
                let part = self.resolve_part(part_ref.id).await?;
                let repair_part = self
                    .stores
                    .repair_parts
                    .insert(payload.into_repair_part(0, repair_id, part.id, work_type))
                    .await?;
                Ok(RepairPartView::new(repair_part, part))
            }
        }
    }

    pub async fn partial_update(
        &self,
        id: i64,
        payload: RepairPartPayload,
    ) -> Result<RepairPartView, DomainError> {
        let mut existing = self
            .stores
            .repair_parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DomainError::RepairPartNotFound(format!("Cannot update repair part with id: {id}"))
            })?;

        if let Some(reference) = payload.repair {
            existing.repair_id = self.resolve_repair(reference.id).await?;
        }
        if let Some(reference) = payload.part {
            existing.part_id = self.resolve_part(reference.id).await?.id;
        }

        payload.apply_scalars(&mut existing);
        self.stores.repair_parts.update(&existing).await?;
        self.view(existing).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if !self.stores.repair_parts.delete(id).await? {
            return Err(DomainError::RepairPartNotFound(format!(
                "Cannot delete repair part with id: {id}"
            )));
        }
        Ok(())
    }

    async fn resolve_repair(&self, id: i64) -> Result<i64, DomainError> {
        self.stores
            .repairs
            .find_by_id(id)
            .await?
            .map(|r| r.id)
            .ok_or_else(|| DomainError::RepairNotFound(format!("Repair with id: {id} not found")))
    }

    async fn resolve_part(&self, id: i64) -> Result<Part, DomainError> {
        self.stores
            .parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(format!("Part with id: {id} not found")))
    }

    async fn part_of(&self, repair_part: &RepairPart) -> Result<Part, DomainError> {
        self.stores
            .parts
            .find_by_id(repair_part.part_id)
            .await?
            .ok_or_else(|| {
                DomainError::Internal(format!(
                    "part row {} missing for repair part {}",
                    repair_part.part_id, repair_part.id
                ))
            })
    }

    async fn view(&self, repair_part: RepairPart) -> Result<RepairPartView, DomainError> {
        let part = self.part_of(&repair_part).await?;
        Ok(RepairPartView::new(repair_part, part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityRef, FuelType, PartPayload, RepairPayload, RepairType, VehiclePayload, WorkType};
    use crate::services::{PartService, RepairService, VehicleService, FileStorageService};
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    async fn setup() -> (RepairPartService, i64, i64, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let stores = MemoryStore::new().stores();

        let vehicle = VehicleService::new(stores.clone())
            .save(VehiclePayload {
                fuel_type: Some(FuelType::Petrol),
                ..Default::default()
            })
            .await
            .unwrap();

        let files = Arc::new(FileStorageService::new(
            dir.path().to_path_buf(),
            "http://localhost:8080/".to_string(),
            stores.clone(),
        ));
        let repair = RepairService::new(stores.clone(), files)
            .save(RepairPayload {
                number: Some("21G-01-2024".to_string()),
                repair_type: Some(RepairType::Normal),
                vehicle: Some(EntityRef::new(vehicle.vehicle.id)),
                ..Default::default()
            })
            .await
            .unwrap();

        let part = PartService::new(stores.clone())
            .save(PartPayload {
                part_name: Some("Brake pad".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        (RepairPartService::new(stores), repair.id, part.id, dir)
    }

    #[tokio::test]
    async fn save_resolves_both_references() {
        let (service, repair_id, part_id, _dir) = setup().await;

        let created = service
            .save(RepairPartPayload {
                repair: Some(EntityRef::new(repair_id)),
                part: Some(EntityRef::new(part_id)),
                work_type: Some(WorkType::Replacement),
                quantity: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.repair_id, repair_id);
        assert_eq!(created.part.id, part_id);
        assert_eq!(created.quantity, Some(2));

        let err = service
            .save(RepairPartPayload {
                repair: Some(EntityRef::new(999)),
                part: Some(EntityRef::new(part_id)),
                work_type: Some(WorkType::Repair),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RepairNotFound(_)));
    }

    #[tokio::test]
    async fn listing_by_repair_checks_the_repair_exists() {
        let (service, repair_id, part_id, _dir) = setup().await;
        service
            .save(RepairPartPayload {
                repair: Some(EntityRef::new(repair_id)),
                part: Some(EntityRef::new(part_id)),
                work_type: Some(WorkType::Diagnostics),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(service.find_by_repair_id(repair_id).await.unwrap().len(), 1);
        assert!(matches!(
            service.find_by_repair_id(999).await.unwrap_err(),
            DomainError::RepairNotFound(_)
        ));
    }

    #[tokio::test]
    async fn patch_with_missing_part_reference_fails() {
        let (service, repair_id, part_id, _dir) = setup().await;
        let created = service
            .save(RepairPartPayload {
                repair: Some(EntityRef::new(repair_id)),
                part: Some(EntityRef::new(part_id)),
                work_type: Some(WorkType::Replacement),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = service
            .partial_update(
                created.id,
                RepairPartPayload {
                    part: Some(EntityRef::new(999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PartNotFound(_)));
    }

    #[tokio::test]
    async fn patch_is_idempotent() {
        let (service, repair_id, part_id, _dir) = setup().await;
        let created = service
            .save(RepairPartPayload {
                repair: Some(EntityRef::new(repair_id)),
                part: Some(EntityRef::new(part_id)),
                work_type: Some(WorkType::Replacement),
                quantity: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        let patch = RepairPartPayload {
            quantity: Some(4),
            ..Default::default()
        };
        let once = service.partial_update(created.id, patch.clone()).await.unwrap();
        let twice = service.partial_update(created.id, patch).await.unwrap();

        assert_eq!(once.quantity, Some(4));
        assert_eq!(twice.quantity, Some(4));
        assert_eq!(twice.work_type, WorkType::Replacement);
    }

    #[tokio::test]
    async fn delete_missing_line_item_is_not_found() {
        let (service, _, _, _dir) = setup().await;
        assert!(matches!(
            service.delete(12345).await.unwrap_err(),
            DomainError::RepairPartNotFound(_)
        ));
    }
}
