//! In-process store backend. Serves development runs and tests the same way
//! the original system used an embedded database; one mutex stands in for
//! the transactional scope of the relational store.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{Client, File, Part, Repair, RepairPart, Token, User, Vehicle};

use super::{
    matches_filter, ClientStore, FileStore, Link, LinkStore, PartStore, RepairPartStore,
    RepairStore, StoreError, Stores, TokenStore, UserStore, VehicleStore,
};

#[derive(Default)]
struct Inner {
    clients: BTreeMap<i64, Client>,
    vehicles: BTreeMap<i64, Vehicle>,
    repairs: BTreeMap<i64, Repair>,
    parts: BTreeMap<i64, Part>,
    repair_parts: BTreeMap<i64, RepairPart>,
    files: BTreeMap<i64, File>,
    users: BTreeMap<i64, User>,
    tokens: BTreeMap<i64, Token>,
    links: BTreeSet<(i64, i64)>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundle this backend behind every store trait.
    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            clients: self.clone(),
            vehicles: self.clone(),
            links: self.clone(),
            repairs: self.clone(),
            parts: self.clone(),
            repair_parts: self.clone(),
            files: self.clone(),
            users: self.clone(),
            tokens: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

/// Uniqueness check for nullable unique columns: only non-null values
/// collide, and a row never collides with itself.
fn unique_violation(
    existing: Option<&str>,
    candidate: Option<&str>,
    entity: &'static str,
    field: &str,
) -> Result<(), StoreError> {
    match (existing, candidate) {
        (Some(a), Some(b)) if a == b => Err(StoreError::Duplicate {
            entity,
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_client_uniques(inner: &Inner, client: &Client) -> Result<(), StoreError> {
    for other in inner.clients.values().filter(|c| c.id != client.id) {
        unique_violation(other.pesel.as_deref(), client.pesel.as_deref(), "client", "pesel")?;
        unique_violation(other.nip.as_deref(), client.nip.as_deref(), "client", "nip")?;
        unique_violation(other.email.as_deref(), client.email.as_deref(), "client", "email")?;
    }
    Ok(())
}

fn check_repair_uniques(inner: &Inner, repair: &Repair) -> Result<(), StoreError> {
    for other in inner.repairs.values().filter(|r| r.id != repair.id) {
        unique_violation(other.number.as_deref(), repair.number.as_deref(), "repair", "number")?;
    }
    Ok(())
}

fn check_user_uniques(inner: &Inner, user: &User) -> Result<(), StoreError> {
    for other in inner.users.values().filter(|u| u.id != user.id) {
        if other.username == user.username {
            return Err(StoreError::Duplicate {
                entity: "user",
                field: "username".to_string(),
            });
        }
        unique_violation(other.email.as_deref(), user.email.as_deref(), "user", "email")?;
    }
    Ok(())
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.lock().clients.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, StoreError> {
        Ok(self.lock().clients.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Client>, StoreError> {
        let inner = self.lock();
        Ok(ids.iter().filter_map(|id| inner.clients.get(id).cloned()).collect())
    }

    async fn find_by_surname(&self, surname: &str) -> Result<Vec<Client>, StoreError> {
        Ok(self
            .lock()
            .clients
            .values()
            .filter(|c| c.surname.as_deref() == Some(surname))
            .cloned()
            .collect())
    }

    async fn insert(&self, mut client: Client) -> Result<Client, StoreError> {
        let mut inner = self.lock();
        client.id = inner.next_id();
        check_client_uniques(&inner, &client)?;
        inner.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        let mut inner = self.lock();
        check_client_uniques(&inner, client)?;
        inner.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let removed = inner.clients.remove(&id).is_some();
        if removed {
            inner.links.retain(|(client_id, _)| *client_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.lock().vehicles.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.lock().vehicles.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Vehicle>, StoreError> {
        let inner = self.lock();
        Ok(ids.iter().filter_map(|id| inner.vehicles.get(id).cloned()).collect())
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .lock()
            .vehicles
            .values()
            .find(|v| v.vin.as_deref() == Some(vin))
            .cloned())
    }

    async fn find_by_licence_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .lock()
            .vehicles
            .values()
            .find(|v| v.licence_plate.as_deref() == Some(plate))
            .cloned())
    }

    async fn insert(&self, mut vehicle: Vehicle) -> Result<Vehicle, StoreError> {
        let mut inner = self.lock();
        vehicle.id = inner.next_id();
        inner.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.lock().vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let removed = inner.vehicles.remove(&id).is_some();
        if removed {
            inner.links.retain(|(_, vehicle_id)| *vehicle_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn vehicle_ids_for_client(&self, client_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(self
            .lock()
            .links
            .iter()
            .filter(|(c, _)| *c == client_id)
            .map(|(_, v)| *v)
            .collect())
    }

    async fn client_ids_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(self
            .lock()
            .links
            .iter()
            .filter(|(_, v)| *v == vehicle_id)
            .map(|(c, _)| *c)
            .collect())
    }

    async fn apply(&self, add: &[Link], remove: &[Link]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for link in remove {
            inner.links.remove(&(link.client_id, link.vehicle_id));
        }
        for link in add {
            inner.links.insert((link.client_id, link.vehicle_id));
        }
        Ok(())
    }
}

#[async_trait]
impl RepairStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Repair>, StoreError> {
        Ok(self.lock().repairs.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Repair>, StoreError> {
        Ok(self.lock().repairs.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Repair>, StoreError> {
        Ok(self
            .lock()
            .repairs
            .values()
            .find(|r| r.number.as_deref() == Some(number))
            .cloned())
    }

    async fn exists_for_vehicle(&self, vehicle_id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().repairs.values().any(|r| r.vehicle_id == vehicle_id))
    }

    async fn insert(&self, mut repair: Repair) -> Result<Repair, StoreError> {
        let mut inner = self.lock();
        repair.id = inner.next_id();
        check_repair_uniques(&inner, &repair)?;
        inner.repairs.insert(repair.id, repair.clone());
        Ok(repair)
    }

    async fn update(&self, repair: &Repair) -> Result<(), StoreError> {
        let mut inner = self.lock();
        check_repair_uniques(&inner, repair)?;
        inner.repairs.insert(repair.id, repair.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let removed = inner.repairs.remove(&id).is_some();
        if removed {
            inner.repair_parts.retain(|_, rp| rp.repair_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl PartStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Part>, StoreError> {
        Ok(self.lock().parts.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Part>, StoreError> {
        Ok(self.lock().parts.get(&id).cloned())
    }

    async fn filter(
        &self,
        part_name: Option<&str>,
        serial_number: Option<&str>,
        manufacturer: Option<&str>,
    ) -> Result<Vec<Part>, StoreError> {
        Ok(self
            .lock()
            .parts
            .values()
            .filter(|p| {
                matches_filter(p.part_name.as_deref(), part_name)
                    && matches_filter(p.serial_number.as_deref(), serial_number)
                    && matches_filter(p.manufacturer.as_deref(), manufacturer)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, mut part: Part) -> Result<Part, StoreError> {
        let mut inner = self.lock();
        part.id = inner.next_id();
        inner.parts.insert(part.id, part.clone());
        Ok(part)
    }

    async fn update(&self, part: &Part) -> Result<(), StoreError> {
        self.lock().parts.insert(part.id, part.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().parts.remove(&id).is_some())
    }
}

#[async_trait]
impl RepairPartStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<RepairPart>, StoreError> {
        Ok(self.lock().repair_parts.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepairPart>, StoreError> {
        Ok(self.lock().repair_parts.get(&id).cloned())
    }

    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<RepairPart>, StoreError> {
        Ok(self
            .lock()
            .repair_parts
            .values()
            .filter(|rp| rp.repair_id == repair_id)
            .cloned()
            .collect())
    }

    async fn exists_for_part(&self, part_id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().repair_parts.values().any(|rp| rp.part_id == part_id))
    }

    async fn insert(&self, mut repair_part: RepairPart) -> Result<RepairPart, StoreError> {
        let mut inner = self.lock();
        repair_part.id = inner.next_id();
        inner.repair_parts.insert(repair_part.id, repair_part.clone());
        Ok(repair_part)
    }

    async fn update(&self, repair_part: &RepairPart) -> Result<(), StoreError> {
        self.lock().repair_parts.insert(repair_part.id, repair_part.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().repair_parts.remove(&id).is_some())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<File>, StoreError> {
        Ok(self.lock().files.get(&id).cloned())
    }

    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<File>, StoreError> {
        Ok(self
            .lock()
            .files
            .values()
            .filter(|f| f.repair_id == repair_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, mut file: File) -> Result<File, StoreError> {
        let mut inner = self.lock();
        file.id = inner.next_id();
        inner.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().files.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let mut inner = self.lock();
        user.id = inner.next_id();
        check_user_uniques(&inner, &user)?;
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, mut token: Token) -> Result<Token, StoreError> {
        let mut inner = self.lock();
        token.id = inner.next_id();
        inner.tokens.insert(token.id, token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;

    fn client(pesel: &str) -> Client {
        Client {
            id: 0,
            firstname: Some("John".to_string()),
            surname: Some("Doe".to_string()),
            pesel: Some(pesel.to_string()),
            nip: None,
            phone_number: None,
            email: None,
            country: None,
            postal_code: None,
            city: None,
            address: None,
            birth_date: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = ClientStore::insert(store.as_ref(), client("11111111111")).await.unwrap();
        let b = ClientStore::insert(store.as_ref(), client("22222222222")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn duplicate_pesel_is_rejected() {
        let store = MemoryStore::new();
        ClientStore::insert(store.as_ref(), client("11111111111")).await.unwrap();
        let err = ClientStore::insert(store.as_ref(), client("11111111111"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "client", .. }));
    }

    #[tokio::test]
    async fn deleting_vehicle_drops_its_links() {
        let store = MemoryStore::new();
        let c = ClientStore::insert(store.as_ref(), client("11111111111")).await.unwrap();
        let v = VehicleStore::insert(
            store.as_ref(),
            Vehicle {
                id: 0,
                vin: None,
                manufacturer: None,
                model: None,
                licence_plate: None,
                production_date: None,
                color: None,
                engine_capacity: None,
                fuel_type: FuelType::Petrol,
                power: None,
            },
        )
        .await
        .unwrap();

        LinkStore::apply(
            store.as_ref(),
            &[Link { client_id: c.id, vehicle_id: v.id }],
            &[],
        )
        .await
        .unwrap();
        assert_eq!(store.vehicle_ids_for_client(c.id).await.unwrap(), vec![v.id]);

        VehicleStore::delete(store.as_ref(), v.id).await.unwrap();
        assert!(store.vehicle_ids_for_client(c.id).await.unwrap().is_empty());
    }
}
