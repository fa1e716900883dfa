use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{patch, EntityRef, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    Replacement,
    Repair,
    Diagnostics,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Replacement => "REPLACEMENT",
            WorkType::Repair => "REPAIR",
            WorkType::Diagnostics => "DIAGNOSTICS",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPLACEMENT" => Ok(WorkType::Replacement),
            "REPAIR" => Ok(WorkType::Repair),
            "DIAGNOSTICS" => Ok(WorkType::Diagnostics),
            other => Err(format!("unknown work type: {other}")),
        }
    }
}

/// Line item linking one repair to one part.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairPart {
    pub id: i64,
    pub repair_id: i64,
    pub part_id: i64,
    pub work_type: WorkType,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairPartPayload {
    pub id: Option<i64>,
    pub repair: Option<EntityRef>,
    pub part: Option<EntityRef>,
    pub work_type: Option<WorkType>,
    pub quantity: Option<i32>,
}

impl RepairPartPayload {
    pub fn into_repair_part(
        self,
        id: i64,
        repair_id: i64,
        part_id: i64,
        work_type: WorkType,
    ) -> RepairPart {
        RepairPart {
            id,
            repair_id,
            part_id,
            work_type,
            quantity: self.quantity,
        }
    }

    pub fn apply_scalars(&self, existing: &mut RepairPart) {
        patch::apply_required(&mut existing.work_type, &self.work_type);
        patch::apply(&mut existing.quantity, &self.quantity);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairPartView {
    pub id: i64,
    pub repair_id: i64,
    pub part: Part,
    pub work_type: WorkType,
    pub quantity: Option<i32>,
}

impl RepairPartView {
    pub fn new(repair_part: RepairPart, part: Part) -> Self {
        Self {
            id: repair_part.id,
            repair_id: repair_part.repair_id,
            part,
            work_type: repair_part.work_type,
            quantity: repair_part.quantity,
        }
    }
}
