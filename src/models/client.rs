use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{patch, EntityRef, Vehicle};

/// Workshop customer. The vehicle association is kept in a separate join
/// representation and surfaced through [`ClientView`], never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub pesel: Option<String>,
    pub nip: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Request body for client create, full update and partial update.
/// `vehicles` carries id-only references; when the field is absent the
/// stored association is left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub id: Option<i64>,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub pesel: Option<String>,
    pub nip: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub vehicles: Option<Vec<EntityRef>>,
}

impl ClientPayload {
    /// Build a full row from the payload, replacing every scalar field.
    pub fn into_client(self, id: i64) -> Client {
        Client {
            id,
            firstname: self.firstname,
            surname: self.surname,
            pesel: self.pesel,
            nip: self.nip,
            phone_number: self.phone_number,
            email: self.email,
            country: self.country,
            postal_code: self.postal_code,
            city: self.city,
            address: self.address,
            birth_date: self.birth_date,
        }
    }

    /// Merge only the fields present in the payload onto an existing row.
    pub fn apply_scalars(&self, existing: &mut Client) {
        patch::apply(&mut existing.firstname, &self.firstname);
        patch::apply(&mut existing.surname, &self.surname);
        patch::apply(&mut existing.pesel, &self.pesel);
        patch::apply(&mut existing.nip, &self.nip);
        patch::apply(&mut existing.phone_number, &self.phone_number);
        patch::apply(&mut existing.email, &self.email);
        patch::apply(&mut existing.country, &self.country);
        patch::apply(&mut existing.postal_code, &self.postal_code);
        patch::apply(&mut existing.city, &self.city);
        patch::apply(&mut existing.address, &self.address);
        patch::apply(&mut existing.birth_date, &self.birth_date);
    }
}

/// Wire view of a client with its vehicles; the nested vehicles carry no
/// client list, which keeps the output acyclic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    #[serde(flatten)]
    pub client: Client,
    pub vehicles: Vec<Vehicle>,
}
