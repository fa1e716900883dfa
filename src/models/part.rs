use serde::{Deserialize, Serialize};

use super::patch;

/// Catalog part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: i64,
    pub part_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPayload {
    pub id: Option<i64>,
    pub part_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
}

impl PartPayload {
    pub fn into_part(self, id: i64) -> Part {
        Part {
            id,
            part_name: self.part_name,
            serial_number: self.serial_number,
            manufacturer: self.manufacturer,
        }
    }

    pub fn apply_scalars(&self, existing: &mut Part) {
        patch::apply(&mut existing.part_name, &self.part_name);
        patch::apply(&mut existing.serial_number, &self.serial_number);
        patch::apply(&mut existing.manufacturer, &self.manufacturer);
    }
}
