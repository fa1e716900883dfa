//! Persistence interfaces. Services only ever talk to these traits; the
//! Postgres backend is the production path and the memory backend serves
//! development and tests.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Client, File, Part, Repair, RepairPart, Token, User, Vehicle};

pub mod memory;
pub mod postgres;

/// Errors from the storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a {entity} with this {field} already exists")]
    Duplicate { entity: &'static str, field: String },

    #[error("stored value could not be decoded: {0}")]
    Decode(String),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One client↔vehicle association pair in the join representation. Storing
/// the pair exactly once is what keeps the two sides symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Link {
    pub client_id: i64,
    pub vehicle_id: i64,
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Client>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, StoreError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Client>, StoreError>;
    async fn find_by_surname(&self, surname: &str) -> Result<Vec<Client>, StoreError>;
    /// Insert a new row; the id on the argument is ignored and the stored
    /// row with its assigned id is returned.
    async fn insert(&self, client: Client) -> Result<Client, StoreError>;
    async fn update(&self, client: &Client) -> Result<(), StoreError>;
    /// Returns false when no row with the id existed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Vehicle>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Vehicle>, StoreError>;
    async fn find_by_vin(&self, vin: &str) -> Result<Option<Vehicle>, StoreError>;
    async fn find_by_licence_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError>;
    async fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, StoreError>;
    async fn update(&self, vehicle: &Vehicle) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// The client↔vehicle join representation. `apply` commits adds and removes
/// in one transaction so the association can never be half-updated.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn vehicle_ids_for_client(&self, client_id: i64) -> Result<Vec<i64>, StoreError>;
    async fn client_ids_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<i64>, StoreError>;
    async fn apply(&self, add: &[Link], remove: &[Link]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RepairStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Repair>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Repair>, StoreError>;
    async fn find_by_number(&self, number: &str) -> Result<Option<Repair>, StoreError>;
    async fn exists_for_vehicle(&self, vehicle_id: i64) -> Result<bool, StoreError>;
    async fn insert(&self, repair: Repair) -> Result<Repair, StoreError>;
    async fn update(&self, repair: &Repair) -> Result<(), StoreError>;
    /// Deleting a repair also removes its line items at store level.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait PartStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Part>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Part>, StoreError>;
    /// Case-insensitive substring match on each given field; blank or absent
    /// parameters match every row; predicates are ANDed.
    async fn filter(
        &self,
        part_name: Option<&str>,
        serial_number: Option<&str>,
        manufacturer: Option<&str>,
    ) -> Result<Vec<Part>, StoreError>;
    async fn insert(&self, part: Part) -> Result<Part, StoreError>;
    async fn update(&self, part: &Part) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RepairPartStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<RepairPart>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RepairPart>, StoreError>;
    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<RepairPart>, StoreError>;
    async fn exists_for_part(&self, part_id: i64) -> Result<bool, StoreError>;
    async fn insert(&self, repair_part: RepairPart) -> Result<RepairPart, StoreError>;
    async fn update(&self, repair_part: &RepairPart) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<File>, StoreError>;
    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<File>, StoreError>;
    async fn insert(&self, file: File) -> Result<File, StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: User) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: Token) -> Result<Token, StoreError>;
}

/// Bundle of every store trait, handed to the services as one unit.
#[derive(Clone)]
pub struct Stores {
    pub clients: Arc<dyn ClientStore>,
    pub vehicles: Arc<dyn VehicleStore>,
    pub links: Arc<dyn LinkStore>,
    pub repairs: Arc<dyn RepairStore>,
    pub parts: Arc<dyn PartStore>,
    pub repair_parts: Arc<dyn RepairPartStore>,
    pub files: Arc<dyn FileStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
}

/// True when the field value matches the filter under the contract of
/// [`PartStore::filter`]: blank filters match everything, otherwise a
/// case-insensitive contains on the field (absent fields match only blank
/// filters).
pub(crate) fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    let filter = filter.unwrap_or("").trim();
    if filter.is_empty() {
        return true;
    }
    value
        .map(|v| v.to_lowercase().contains(&filter.to_lowercase()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::matches_filter;

    #[test]
    fn blank_filter_matches_everything() {
        assert!(matches_filter(Some("Bosch"), None));
        assert!(matches_filter(Some("Bosch"), Some("")));
        assert!(matches_filter(Some("Bosch"), Some("   ")));
        assert!(matches_filter(None, Some("")));
    }

    #[test]
    fn filter_is_case_insensitive_contains() {
        assert!(matches_filter(Some("Bosch"), Some("bosch")));
        assert!(matches_filter(Some("Robert Bosch GmbH"), Some("BOSCH")));
        assert!(!matches_filter(Some("Valeo"), Some("bosch")));
        assert!(!matches_filter(None, Some("bosch")));
    }
}
