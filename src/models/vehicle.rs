use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{patch, Client, EntityRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Petrol,
    Diesel,
    Lpg,
    Hybrid,
    Electric,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "PETROL",
            FuelType::Diesel => "DIESEL",
            FuelType::Lpg => "LPG",
            FuelType::Hybrid => "HYBRID",
            FuelType::Electric => "ELECTRIC",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PETROL" => Ok(FuelType::Petrol),
            "DIESEL" => Ok(FuelType::Diesel),
            "LPG" => Ok(FuelType::Lpg),
            "HYBRID" => Ok(FuelType::Hybrid),
            "ELECTRIC" => Ok(FuelType::Electric),
            other => Err(format!("unknown fuel type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub vin: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub licence_plate: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub engine_capacity: Option<f32>,
    pub fuel_type: FuelType,
    /// Power in kW
    pub power: Option<i32>,
}

/// Request body for vehicle create, full update and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    pub id: Option<i64>,
    pub vin: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub licence_plate: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub engine_capacity: Option<f32>,
    pub fuel_type: Option<FuelType>,
    pub power: Option<i32>,
    pub clients: Option<Vec<EntityRef>>,
}

impl VehiclePayload {
    /// Build a full row from the payload. `fuel_type` is the only required
    /// scalar; the caller validates its presence before conversion.
    pub fn into_vehicle(self, id: i64, fuel_type: FuelType) -> Vehicle {
        Vehicle {
            id,
            vin: self.vin,
            manufacturer: self.manufacturer,
            model: self.model,
            licence_plate: self.licence_plate,
            production_date: self.production_date,
            color: self.color,
            engine_capacity: self.engine_capacity,
            fuel_type,
            power: self.power,
        }
    }

    pub fn apply_scalars(&self, existing: &mut Vehicle) {
        patch::apply(&mut existing.vin, &self.vin);
        patch::apply(&mut existing.manufacturer, &self.manufacturer);
        patch::apply(&mut existing.model, &self.model);
        patch::apply(&mut existing.licence_plate, &self.licence_plate);
        patch::apply(&mut existing.production_date, &self.production_date);
        patch::apply(&mut existing.color, &self.color);
        patch::apply(&mut existing.engine_capacity, &self.engine_capacity);
        patch::apply_required(&mut existing.fuel_type, &self.fuel_type);
        patch::apply(&mut existing.power, &self.power);
    }
}

/// Wire view of a vehicle with its clients; the nested clients carry no
/// vehicle list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub clients: Vec<Client>,
}
