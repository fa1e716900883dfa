use serde::{Deserialize, Serialize};

pub mod client;
pub mod file;
pub mod part;
pub mod patch;
pub mod repair;
pub mod repair_part;
pub mod user;
pub mod vehicle;

pub use client::{Client, ClientPayload, ClientView};
pub use file::{File, FileTag, FileView, TemplateInfo};
pub use part::{Part, PartPayload};
pub use repair::{Repair, RepairPayload, RepairType, RepairView, RepairWithClientsView};
pub use repair_part::{RepairPart, RepairPartPayload, RepairPartView, WorkType};
pub use user::{Token, User, UserRole};
pub use vehicle::{FuelType, Vehicle, VehiclePayload, VehicleView};

/// An id-only reference to another entity, as it appears in request payloads.
/// Extra fields a caller sends alongside the id are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}

impl EntityRef {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}
