use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{patch, Client, EntityRef, Vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairType {
    Normal,
    Warranty,
    Complaint,
}

impl RepairType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairType::Normal => "NORMAL",
            RepairType::Warranty => "WARRANTY",
            RepairType::Complaint => "COMPLAINT",
        }
    }
}

impl fmt::Display for RepairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepairType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(RepairType::Normal),
            "WARRANTY" => Ok(RepairType::Warranty),
            "COMPLAINT" => Ok(RepairType::Complaint),
            other => Err(format!("unknown repair type: {other}")),
        }
    }
}

/// A work order. References exactly one vehicle; the client list is always
/// derived from that vehicle's current association, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    pub id: i64,
    /// Human-readable repair number, e.g. `21G-01-2024`.
    pub number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub repair_type: RepairType,
    pub vehicle_id: i64,
}

/// Request body for repair create, full update and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairPayload {
    pub id: Option<i64>,
    pub number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub repair_type: Option<RepairType>,
    pub vehicle: Option<EntityRef>,
}

impl RepairPayload {
    pub fn into_repair(self, id: i64, repair_type: RepairType, vehicle_id: i64) -> Repair {
        Repair {
            id,
            number: self.number,
            start_date: self.start_date,
            expected_end_date: self.expected_end_date,
            repair_type,
            vehicle_id,
        }
    }

    pub fn apply_scalars(&self, existing: &mut Repair) {
        patch::apply(&mut existing.number, &self.number);
        patch::apply(&mut existing.start_date, &self.start_date);
        patch::apply(&mut existing.expected_end_date, &self.expected_end_date);
        patch::apply_required(&mut existing.repair_type, &self.repair_type);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairView {
    pub id: i64,
    pub number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub repair_type: RepairType,
    pub vehicle: Vehicle,
}

impl RepairView {
    pub fn new(repair: Repair, vehicle: Vehicle) -> Self {
        Self {
            id: repair.id,
            number: repair.number,
            start_date: repair.start_date,
            expected_end_date: repair.expected_end_date,
            repair_type: repair.repair_type,
            vehicle,
        }
    }
}

/// Repair view extended with the derived client set (the vehicle's current
/// clients at read time).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairWithClientsView {
    pub id: i64,
    pub number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub repair_type: RepairType,
    pub vehicle: Vehicle,
    pub clients: Vec<Client>,
}

impl RepairWithClientsView {
    pub fn new(repair: Repair, vehicle: Vehicle, clients: Vec<Client>) -> Self {
        Self {
            id: repair.id,
            number: repair.number,
            start_date: repair.start_date,
            expected_end_date: repair.expected_end_date,
            repair_type: repair.repair_type,
            vehicle,
            clients,
        }
    }
}
