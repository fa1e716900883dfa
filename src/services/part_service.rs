use crate::models::{Part, PartPayload};
use crate::store::Stores;

use super::DomainError;

pub struct PartService {
    stores: Stores,
}

impl PartService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn find_all(&self) -> Result<Vec<Part>, DomainError> {
        Ok(self.stores.parts.find_all().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Part, DomainError> {
        self.stores
            .parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(format!("Part with id: {id} not found")))
    }

    /// Case-insensitive contains on each given field, ANDed; blank values
    /// match everything.
    pub async fn find_by_filter(
        &self,
        part_name: Option<&str>,
        serial_number: Option<&str>,
        manufacturer: Option<&str>,
    ) -> Result<Vec<Part>, DomainError> {
        Ok(self
            .stores
            .parts
            .filter(part_name, serial_number, manufacturer)
            .await?)
    }

    pub async fn save(&self, payload: PartPayload) -> Result<Part, DomainError> {
        let existing = match payload.id {
            Some(id) => self.stores.parts.find_by_id(id).await?,
            None => None,
        };

        match existing {
            Some(current) => {
                let part = payload.into_part(current.id);
                self.stores.parts.update(&part).await?;
                Ok(part)
            }
            None => Ok(self.stores.parts.insert(payload.into_part(0)).await?),
        }
    }

    pub async fn partial_update(&self, id: i64, payload: PartPayload) -> Result<Part, DomainError> {
        let mut existing = self
            .stores
            .parts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(format!("Cannot update part with id: {id}")))?;

        payload.apply_scalars(&mut existing);
        self.stores.parts.update(&existing).await?;
        Ok(existing)
    }

    /// Refuses while repair line items still reference the part.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if self.stores.parts.find_by_id(id).await?.is_none() {
            return Err(DomainError::PartNotFound(format!(
                "Part with id: {id} not found"
            )));
        }
        if self.stores.repair_parts.exists_for_part(id).await? {
            return Err(DomainError::Validation(format!(
                "Part with id: {id} is still referenced by repair parts"
            )));
        }

        self.stores.parts.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> PartService {
        PartService::new(MemoryStore::new().stores())
    }

    fn payload(name: &str, serial: &str, manufacturer: &str) -> PartPayload {
        PartPayload {
            part_name: Some(name.to_string()),
            serial_number: Some(serial.to_string()),
            manufacturer: Some(manufacturer.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn blank_filter_returns_every_part() {
        let service = service();
        service.save(payload("Brake pad", "BP-100", "Bosch")).await.unwrap();
        service.save(payload("Oil filter", "OF-220", "Mann")).await.unwrap();

        let all = service.find_by_filter(None, None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let blank = service
            .find_by_filter(Some(""), Some("  "), None)
            .await
            .unwrap();
        assert_eq!(blank.len(), 2);
    }

    #[tokio::test]
    async fn manufacturer_filter_is_case_insensitive_contains() {
        let service = service();
        service.save(payload("Brake pad", "BP-100", "Bosch")).await.unwrap();
        service
            .save(payload("Wiper blade", "WB-3", "Robert Bosch GmbH"))
            .await
            .unwrap();
        service.save(payload("Oil filter", "OF-220", "Mann")).await.unwrap();

        let matched = service
            .find_by_filter(None, None, Some("bosch"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
        assert!(matched
            .iter()
            .all(|p| p.manufacturer.as_deref().unwrap().to_lowercase().contains("bosch")));
    }

    #[tokio::test]
    async fn filters_are_anded() {
        let service = service();
        service.save(payload("Brake pad", "BP-100", "Bosch")).await.unwrap();
        service.save(payload("Brake disc", "BD-7", "Brembo")).await.unwrap();

        let matched = service
            .find_by_filter(Some("brake"), None, Some("bosch"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].serial_number.as_deref(), Some("BP-100"));
    }

    #[tokio::test]
    async fn patch_merges_only_present_fields() {
        let service = service();
        let created = service.save(payload("Brake pad", "BP-100", "Bosch")).await.unwrap();

        let patched = service
            .partial_update(
                created.id,
                PartPayload {
                    manufacturer: Some("Brembo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.part_name.as_deref(), Some("Brake pad"));
        assert_eq!(patched.manufacturer.as_deref(), Some("Brembo"));
    }
}
