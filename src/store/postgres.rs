//! Postgres store backend. Queries are bound at runtime through
//! `sqlx::query_as`; enum and tag columns are stored as text and decoded
//! through row structs.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{
    Client, File, FileTag, FuelType, Part, Repair, RepairPart, RepairType, Token, User, UserRole,
    Vehicle, WorkType,
};

use super::{
    ClientStore, FileStore, Link, LinkStore, PartStore, RepairPartStore, RepairStore, StoreError,
    Stores, TokenStore, UserStore, VehicleStore,
};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, run pending migrations and return the backend.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<Self>, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Arc::new(Self { pool }))
    }

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
}

/// Translate unique-constraint violations into a duplicate error carrying
/// the violated field, taken from the constraint name (`uq_<table>_<field>`).
fn map_err(entity: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let field = db
                .constraint()
                .and_then(|c| c.rsplit('_').next())
                .unwrap_or("unique field")
                .to_string();
            return StoreError::Duplicate { entity, field };
        }
    }
    StoreError::Sqlx(err)
}

fn decode<T: FromStr<Err = String>>(value: &str) -> Result<T, StoreError> {
    value.parse().map_err(StoreError::Decode)
}

fn decode_list<T: FromStr<Err = String>>(value: &str) -> Result<Vec<T>, StoreError> {
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(decode)
        .collect()
}

fn encode_list<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: i64,
    vin: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    licence_plate: Option<String>,
    production_date: Option<chrono::NaiveDate>,
    color: Option<String>,
    engine_capacity: Option<f32>,
    fuel_type: String,
    power: Option<i32>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, StoreError> {
        Ok(Vehicle {
            id: row.id,
            vin: row.vin,
            manufacturer: row.manufacturer,
            model: row.model,
            licence_plate: row.licence_plate,
            production_date: row.production_date,
            color: row.color,
            engine_capacity: row.engine_capacity,
            fuel_type: decode::<FuelType>(&row.fuel_type)?,
            power: row.power,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RepairRow {
    id: i64,
    number: Option<String>,
    start_date: Option<chrono::NaiveDate>,
    expected_end_date: Option<chrono::NaiveDate>,
    repair_type: String,
    vehicle_id: i64,
}

impl TryFrom<RepairRow> for Repair {
    type Error = StoreError;

    fn try_from(row: RepairRow) -> Result<Self, StoreError> {
        Ok(Repair {
            id: row.id,
            number: row.number,
            start_date: row.start_date,
            expected_end_date: row.expected_end_date,
            repair_type: decode::<RepairType>(&row.repair_type)?,
            vehicle_id: row.vehicle_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RepairPartRow {
    id: i64,
    repair_id: i64,
    part_id: i64,
    work_type: String,
    quantity: Option<i32>,
}

impl TryFrom<RepairPartRow> for RepairPart {
    type Error = StoreError;

    fn try_from(row: RepairPartRow) -> Result<Self, StoreError> {
        Ok(RepairPart {
            id: row.id,
            repair_id: row.repair_id,
            part_id: row.part_id,
            work_type: decode::<WorkType>(&row.work_type)?,
            quantity: row.quantity,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: i64,
    repair_id: i64,
    filename: String,
    content_type: String,
    file_path: String,
    file_url: String,
    size: i64,
    tags: String,
}

impl TryFrom<FileRow> for File {
    type Error = StoreError;

    fn try_from(row: FileRow) -> Result<Self, StoreError> {
        Ok(File {
            id: row.id,
            repair_id: row.repair_id,
            filename: row.filename,
            content_type: row.content_type,
            file_path: row.file_path,
            file_url: row.file_url,
            size: row.size,
            tags: decode_list::<FileTag>(&row.tags)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    firstname: Option<String>,
    surname: Option<String>,
    email: Option<String>,
    username: String,
    password_hash: String,
    account_locked: bool,
    roles: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        Ok(User {
            id: row.id,
            firstname: row.firstname,
            surname: row.surname,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            account_locked: row.account_locked,
            roles: decode_list::<UserRole>(&row.roles)?,
        })
    }
}

#[async_trait]
impl ClientStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Client>, StoreError> {
        Ok(sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, StoreError> {
        Ok(sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Client>, StoreError> {
        Ok(
            sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ANY($1) ORDER BY id")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_by_surname(&self, surname: &str) -> Result<Vec<Client>, StoreError> {
        Ok(
            sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE surname = $1 ORDER BY id")
                .bind(surname)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, client: Client) -> Result<Client, StoreError> {
        sqlx::query_as::<_, Client>(
            "INSERT INTO clients \
             (firstname, surname, pesel, nip, phone_number, email, country, postal_code, city, address, birth_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING *",
        )
        .bind(&client.firstname)
        .bind(&client.surname)
        .bind(&client.pesel)
        .bind(&client.nip)
        .bind(&client.phone_number)
        .bind(&client.email)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.city)
        .bind(&client.address)
        .bind(client.birth_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("client", e))
    }

    async fn update(&self, client: &Client) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE clients SET firstname = $2, surname = $3, pesel = $4, nip = $5, \
             phone_number = $6, email = $7, country = $8, postal_code = $9, city = $10, \
             address = $11, birth_date = $12 WHERE id = $1",
        )
        .bind(client.id)
        .bind(&client.firstname)
        .bind(&client.surname)
        .bind(&client.pesel)
        .bind(&client.nip)
        .bind(&client.phone_number)
        .bind(&client.email)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.city)
        .bind(&client.address)
        .bind(client.birth_date)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err("client", e))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VehicleStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Vehicle>, StoreError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ANY($1) ORDER BY id")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    async fn find_by_vin(&self, vin: &str) -> Result<Option<Vehicle>, StoreError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE vin = $1")
            .bind(vin)
            .fetch_optional(&self.pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn find_by_licence_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE licence_plate = $1")
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, StoreError> {
        sqlx::query_as::<_, VehicleRow>(
            "INSERT INTO vehicles \
             (vin, manufacturer, model, licence_plate, production_date, color, engine_capacity, fuel_type, power) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(&vehicle.vin)
        .bind(&vehicle.manufacturer)
        .bind(&vehicle.model)
        .bind(&vehicle.licence_plate)
        .bind(vehicle.production_date)
        .bind(&vehicle.color)
        .bind(vehicle.engine_capacity)
        .bind(vehicle.fuel_type.as_str())
        .bind(vehicle.power)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("vehicle", e))
        .and_then(Vehicle::try_from)
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE vehicles SET vin = $2, manufacturer = $3, model = $4, licence_plate = $5, \
             production_date = $6, color = $7, engine_capacity = $8, fuel_type = $9, power = $10 \
             WHERE id = $1",
        )
        .bind(vehicle.id)
        .bind(&vehicle.vin)
        .bind(&vehicle.manufacturer)
        .bind(&vehicle.model)
        .bind(&vehicle.licence_plate)
        .bind(vehicle.production_date)
        .bind(&vehicle.color)
        .bind(vehicle.engine_capacity)
        .bind(vehicle.fuel_type.as_str())
        .bind(vehicle.power)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err("vehicle", e))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LinkStore for PgStore {
    async fn vehicle_ids_for_client(&self, client_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT vehicle_id FROM client_vehicles WHERE client_id = $1 ORDER BY vehicle_id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn client_ids_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT client_id FROM client_vehicles WHERE vehicle_id = $1 ORDER BY client_id",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn apply(&self, add: &[Link], remove: &[Link]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for link in remove {
            sqlx::query("DELETE FROM client_vehicles WHERE client_id = $1 AND vehicle_id = $2")
                .bind(link.client_id)
                .bind(link.vehicle_id)
                .execute(&mut *tx)
                .await?;
        }
        for link in add {
            sqlx::query(
                "INSERT INTO client_vehicles (client_id, vehicle_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(link.client_id)
            .bind(link.vehicle_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RepairStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Repair>, StoreError> {
        sqlx::query_as::<_, RepairRow>("SELECT * FROM repairs ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Repair::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Repair>, StoreError> {
        sqlx::query_as::<_, RepairRow>("SELECT * FROM repairs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Repair::try_from)
            .transpose()
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Repair>, StoreError> {
        sqlx::query_as::<_, RepairRow>("SELECT * FROM repairs WHERE number = $1")
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .map(Repair::try_from)
            .transpose()
    }

    async fn exists_for_vehicle(&self, vehicle_id: i64) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM repairs WHERE vehicle_id = $1)",
        )
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert(&self, repair: Repair) -> Result<Repair, StoreError> {
        sqlx::query_as::<_, RepairRow>(
            "INSERT INTO repairs (number, start_date, expected_end_date, repair_type, vehicle_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&repair.number)
        .bind(repair.start_date)
        .bind(repair.expected_end_date)
        .bind(repair.repair_type.as_str())
        .bind(repair.vehicle_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("repair", e))
        .and_then(Repair::try_from)
    }

    async fn update(&self, repair: &Repair) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE repairs SET number = $2, start_date = $3, expected_end_date = $4, \
             repair_type = $5, vehicle_id = $6 WHERE id = $1",
        )
        .bind(repair.id)
        .bind(&repair.number)
        .bind(repair.start_date)
        .bind(repair.expected_end_date)
        .bind(repair.repair_type.as_str())
        .bind(repair.vehicle_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err("repair", e))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        // line items go with the repair via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM repairs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PartStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Part>, StoreError> {
        Ok(sqlx::query_as::<_, Part>("SELECT * FROM parts ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Part>, StoreError> {
        Ok(sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn filter(
        &self,
        part_name: Option<&str>,
        serial_number: Option<&str>,
        manufacturer: Option<&str>,
    ) -> Result<Vec<Part>, StoreError> {
        // blank parameters collapse to '%%', which matches every row
        Ok(sqlx::query_as::<_, Part>(
            "SELECT * FROM parts \
             WHERE lower(coalesce(part_name, '')) LIKE '%' || lower($1) || '%' \
             AND lower(coalesce(serial_number, '')) LIKE '%' || lower($2) || '%' \
             AND lower(coalesce(manufacturer, '')) LIKE '%' || lower($3) || '%' \
             ORDER BY id",
        )
        .bind(part_name.unwrap_or("").trim())
        .bind(serial_number.unwrap_or("").trim())
        .bind(manufacturer.unwrap_or("").trim())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(&self, part: Part) -> Result<Part, StoreError> {
        sqlx::query_as::<_, Part>(
            "INSERT INTO parts (part_name, serial_number, manufacturer) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&part.part_name)
        .bind(&part.serial_number)
        .bind(&part.manufacturer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("part", e))
    }

    async fn update(&self, part: &Part) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE parts SET part_name = $2, serial_number = $3, manufacturer = $4 WHERE id = $1",
        )
        .bind(part.id)
        .bind(&part.part_name)
        .bind(&part.serial_number)
        .bind(&part.manufacturer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RepairPartStore for PgStore {
    async fn find_all(&self) -> Result<Vec<RepairPart>, StoreError> {
        sqlx::query_as::<_, RepairPartRow>("SELECT * FROM repair_parts ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RepairPart::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepairPart>, StoreError> {
        sqlx::query_as::<_, RepairPartRow>("SELECT * FROM repair_parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(RepairPart::try_from)
            .transpose()
    }

    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<RepairPart>, StoreError> {
        sqlx::query_as::<_, RepairPartRow>(
            "SELECT * FROM repair_parts WHERE repair_id = $1 ORDER BY id",
        )
        .bind(repair_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(RepairPart::try_from)
        .collect()
    }

    async fn exists_for_part(&self, part_id: i64) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM repair_parts WHERE part_id = $1)",
        )
        .bind(part_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert(&self, repair_part: RepairPart) -> Result<RepairPart, StoreError> {
        sqlx::query_as::<_, RepairPartRow>(
            "INSERT INTO repair_parts (repair_id, part_id, work_type, quantity) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(repair_part.repair_id)
        .bind(repair_part.part_id)
        .bind(repair_part.work_type.as_str())
        .bind(repair_part.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("repair part", e))
        .and_then(RepairPart::try_from)
    }

    async fn update(&self, repair_part: &RepairPart) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE repair_parts SET repair_id = $2, part_id = $3, work_type = $4, quantity = $5 \
             WHERE id = $1",
        )
        .bind(repair_part.id)
        .bind(repair_part.repair_id)
        .bind(repair_part.part_id)
        .bind(repair_part.work_type.as_str())
        .bind(repair_part.quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM repair_parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FileStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<File>, StoreError> {
        sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(File::try_from)
            .transpose()
    }

    async fn find_by_repair_id(&self, repair_id: i64) -> Result<Vec<File>, StoreError> {
        sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE repair_id = $1 ORDER BY id")
            .bind(repair_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(File::try_from)
            .collect()
    }

    async fn insert(&self, file: File) -> Result<File, StoreError> {
        sqlx::query_as::<_, FileRow>(
            "INSERT INTO files (repair_id, filename, content_type, file_path, file_url, size, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(file.repair_id)
        .bind(&file.filename)
        .bind(&file.content_type)
        .bind(&file.file_path)
        .bind(&file.file_url)
        .bind(file.size)
        .bind(encode_list(&file.tags))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("file", e))
        .and_then(File::try_from)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (firstname, surname, email, username, password_hash, account_locked, roles) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&user.firstname)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.account_locked)
        .bind(encode_list(&user.roles))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("user", e))
        .and_then(User::try_from)
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert(&self, token: Token) -> Result<Token, StoreError> {
        Ok(sqlx::query_as::<_, Token>(
            "INSERT INTO tokens (token, created_at, expired_at, validated_at, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&token.token)
        .bind(token.created_at)
        .bind(token.expired_at)
        .bind(token.validated_at)
        .bind(token.user_id)
        .fetch_one(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lists_round_trip_through_text() {
        let encoded = encode_list(&[FileTag::Image]);
        assert_eq!(encoded, "IMAGE");
        let decoded: Vec<FileTag> = decode_list(&encoded).unwrap();
        assert_eq!(decoded, vec![FileTag::Image]);

        let empty: Vec<FileTag> = decode_list("").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn unknown_stored_enum_is_a_decode_error() {
        assert!(matches!(
            decode::<FuelType>("STEAM"),
            Err(StoreError::Decode(_))
        ));
    }
}
