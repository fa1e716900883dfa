//! Relationship synchronizer for the client↔vehicle association.
//!
//! The association lives in a single join representation, so "both sides" of
//! the relationship are two views of the same set of pairs and can never
//! diverge. Reconciling a requested id set against the current one resolves
//! every referenced id first; a dangling reference fails the whole operation
//! before any pair is written.

use std::collections::BTreeSet;

use crate::models::EntityRef;
use crate::store::{Link, Stores};

use super::DomainError;

/// Fail with the vehicle's not-found error unless every reference resolves.
pub async fn ensure_vehicles_exist(
    stores: &Stores,
    refs: &[EntityRef],
) -> Result<(), DomainError> {
    for reference in refs {
        if stores.vehicles.find_by_id(reference.id).await?.is_none() {
            return Err(DomainError::VehicleNotFound(format!(
                "Vehicle with id: {} not found",
                reference.id
            )));
        }
    }
    Ok(())
}

/// Fail with the client's not-found error unless every reference resolves.
pub async fn ensure_clients_exist(stores: &Stores, refs: &[EntityRef]) -> Result<(), DomainError> {
    for reference in refs {
        if stores.clients.find_by_id(reference.id).await?.is_none() {
            return Err(DomainError::ClientNotFound(format!(
                "Client with id: {} not found",
                reference.id
            )));
        }
    }
    Ok(())
}

/// Reconcile the client's vehicle set to exactly `requested`. Vehicles
/// currently linked but absent from the request are unlinked; requested
/// vehicles not yet linked are linked. Duplicate references collapse.
pub async fn set_vehicles_for_client(
    stores: &Stores,
    client_id: i64,
    requested: &[EntityRef],
) -> Result<(), DomainError> {
    ensure_vehicles_exist(stores, requested).await?;

    let wanted: BTreeSet<i64> = requested.iter().map(|r| r.id).collect();
    let current: BTreeSet<i64> = stores
        .links
        .vehicle_ids_for_client(client_id)
        .await?
        .into_iter()
        .collect();

    let add: Vec<Link> = wanted
        .difference(&current)
        .map(|&vehicle_id| Link { client_id, vehicle_id })
        .collect();
    let remove: Vec<Link> = current
        .difference(&wanted)
        .map(|&vehicle_id| Link { client_id, vehicle_id })
        .collect();

    if !add.is_empty() || !remove.is_empty() {
        stores.links.apply(&add, &remove).await?;
    }
    Ok(())
}

/// Reconcile the vehicle's client set to exactly `requested`.
pub async fn set_clients_for_vehicle(
    stores: &Stores,
    vehicle_id: i64,
    requested: &[EntityRef],
) -> Result<(), DomainError> {
    ensure_clients_exist(stores, requested).await?;

    let wanted: BTreeSet<i64> = requested.iter().map(|r| r.id).collect();
    let current: BTreeSet<i64> = stores
        .links
        .client_ids_for_vehicle(vehicle_id)
        .await?
        .into_iter()
        .collect();

    let add: Vec<Link> = wanted
        .difference(&current)
        .map(|&client_id| Link { client_id, vehicle_id })
        .collect();
    let remove: Vec<Link> = current
        .difference(&wanted)
        .map(|&client_id| Link { client_id, vehicle_id })
        .collect();

    if !add.is_empty() || !remove.is_empty() {
        stores.links.apply(&add, &remove).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, FuelType, Vehicle};
    use crate::store::memory::MemoryStore;

    fn blank_client() -> Client {
        Client {
            id: 0,
            firstname: None,
            surname: None,
            pesel: None,
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

    fn blank_vehicle() -> Vehicle {
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
        }
    }

    async fn setup() -> (Stores, i64, i64) {
        let stores = MemoryStore::new().stores();
        let client = stores.clients.insert(blank_client()).await.unwrap();
        let vehicle = stores.vehicles.insert(blank_vehicle()).await.unwrap();
        (stores, client.id, vehicle.id)
    }

    #[tokio::test]
    async fn linking_is_visible_from_both_sides() {
        let (stores, client_id, vehicle_id) = setup().await;

        set_vehicles_for_client(&stores, client_id, &[EntityRef::new(vehicle_id)])
            .await
            .unwrap();

        assert_eq!(
            stores.links.vehicle_ids_for_client(client_id).await.unwrap(),
            vec![vehicle_id]
        );
        assert_eq!(
            stores.links.client_ids_for_vehicle(vehicle_id).await.unwrap(),
            vec![client_id]
        );
    }

    #[tokio::test]
    async fn unlinking_removes_both_sides() {
        let (stores, client_id, vehicle_id) = setup().await;
        set_vehicles_for_client(&stores, client_id, &[EntityRef::new(vehicle_id)])
            .await
            .unwrap();

        set_vehicles_for_client(&stores, client_id, &[]).await.unwrap();

        assert!(stores.links.vehicle_ids_for_client(client_id).await.unwrap().is_empty());
        assert!(stores.links.client_ids_for_vehicle(vehicle_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_reference_leaves_links_untouched() {
        let (stores, client_id, vehicle_id) = setup().await;
        set_vehicles_for_client(&stores, client_id, &[EntityRef::new(vehicle_id)])
            .await
            .unwrap();

        let err = set_vehicles_for_client(
            &stores,
            client_id,
            &[EntityRef::new(vehicle_id), EntityRef::new(9999)],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::VehicleNotFound(_)));
        assert_eq!(
            stores.links.vehicle_ids_for_client(client_id).await.unwrap(),
            vec![vehicle_id]
        );
    }

    #[tokio::test]
    async fn duplicate_references_collapse_to_one_link() {
        let (stores, client_id, vehicle_id) = setup().await;

        set_vehicles_for_client(
            &stores,
            client_id,
            &[EntityRef::new(vehicle_id), EntityRef::new(vehicle_id)],
        )
        .await
        .unwrap();

        assert_eq!(
            stores.links.vehicle_ids_for_client(client_id).await.unwrap(),
            vec![vehicle_id]
        );
    }

    #[tokio::test]
    async fn reconcile_swaps_membership() {
        let (stores, client_id, first) = setup().await;
        let second = stores.vehicles.insert(blank_vehicle()).await.unwrap().id;
        set_vehicles_for_client(&stores, client_id, &[EntityRef::new(first)])
            .await
            .unwrap();

        set_vehicles_for_client(&stores, client_id, &[EntityRef::new(second)])
            .await
            .unwrap();

        assert_eq!(
            stores.links.vehicle_ids_for_client(client_id).await.unwrap(),
            vec![second]
        );
        assert!(stores.links.client_ids_for_vehicle(first).await.unwrap().is_empty());
    }
}
