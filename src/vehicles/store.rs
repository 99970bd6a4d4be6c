use axum::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::vehicles::dto::VehicleImportRecord;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: String,
    pub power: i32,
    pub mileage: i32,
    pub occupied: bool,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub license_plate: String,
    pub power: i32,
    pub mileage: i32,
    pub occupied: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reservation {
    pub id: i32,
    pub vehicle_id: i32,
    pub person_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub loan_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub return_date: OffsetDateTime,
}

/// Capability interface over Fahrzeuge, Personen and Ausleihungen, swappable
/// for an in-memory fake in tests. Bounds are not enforced here; the store
/// accepts any integer values.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError>;

    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, AppError>;

    /// Returns the assigned id.
    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<i32, AppError>;

    /// `NotFound` when no row matched the id.
    async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError>;

    /// Hard delete; historical reservations are not cascaded. `NotFound`
    /// when no row matched.
    async fn delete_vehicle(&self, id: i32) -> Result<(), AppError>;

    async fn insert_person(&self, name: &str, email: &str, user_id: i32)
        -> Result<i32, AppError>;

    async fn get_person(&self, id: i32) -> Result<Option<Person>, AppError>;

    async fn person_id_for_user(&self, user_id: i32) -> Result<Option<i32>, AppError>;

    /// Stamps the loan date as now and flips the vehicle occupied in the
    /// same transaction. Nothing serializes two sessions that both read the
    /// vehicle as free; both reservations insert.
    async fn insert_reservation(
        &self,
        vehicle_id: i32,
        person_id: i32,
        return_date: OffsetDateTime,
    ) -> Result<Reservation, AppError>;

    async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError>;

    /// Parse a JSON array of vehicle records and insert all of them in one
    /// transaction. Any parse or insert failure rolls the whole batch back;
    /// zero rows become visible. Returns the inserted count.
    async fn import_vehicles_json(&self, json: &str) -> Result<usize, AppError>;
}

pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT FId AS id, Kennzeichen AS license_plate, Leistung AS power,
                   Kilometerstand AS mileage, Belegt <> 0 AS occupied
            FROM Fahrzeuge
            ORDER BY FId
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT FId AS id, Kennzeichen AS license_plate, Leistung AS power,
                   Kilometerstand AS mileage, Belegt <> 0 AS occupied
            FROM Fahrzeuge
            WHERE FId = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vehicle)
    }

    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO Fahrzeuge (Kennzeichen, Leistung, Kilometerstand, Belegt)
            VALUES ($1, $2, $3, $4)
            RETURNING FId
            "#,
        )
        .bind(&vehicle.license_plate)
        .bind(vehicle.power)
        .bind(vehicle.mileage)
        .bind(if vehicle.occupied { 1_i32 } else { 0_i32 })
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE Fahrzeuge
            SET Kennzeichen = $1, Leistung = $2, Kilometerstand = $3, Belegt = $4
            WHERE FId = $5
            "#,
        )
        .bind(&vehicle.license_plate)
        .bind(vehicle.power)
        .bind(vehicle.mileage)
        .bind(if vehicle.occupied { 1_i32 } else { 0_i32 })
        .bind(vehicle.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn delete_vehicle(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM Fahrzeuge WHERE FId = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn insert_person(
        &self,
        name: &str,
        email: &str,
        user_id: i32,
    ) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO Personen (Name, EMail, userId)
            VALUES ($1, $2, $3)
            RETURNING PersonenId
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_person(&self, id: i32) -> Result<Option<Person>, AppError> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT PersonenId AS id, Name AS name, EMail AS email, userId AS user_id
            FROM Personen
            WHERE PersonenId = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    async fn person_id_for_user(&self, user_id: i32) -> Result<Option<i32>, AppError> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT PersonenId
            FROM Personen
            WHERE userId = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        debug!(user_id = %user_id, person_id = ?id, "person lookup by owning user");
        Ok(id)
    }

    async fn insert_reservation(
        &self,
        vehicle_id: i32,
        person_id: i32,
        return_date: OffsetDateTime,
    ) -> Result<Reservation, AppError> {
        let loan_date = OffsetDateTime::now_utc();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO Ausleihungen (FId, PersonenId, Ausleidatum, Rueckgabedatum)
            VALUES ($1, $2, $3, $4)
            RETURNING AusleiheId AS id, FId AS vehicle_id, PersonenId AS person_id,
                      Ausleidatum AS loan_date, Rueckgabedatum AS return_date
            "#,
        )
        .bind(vehicle_id)
        .bind(person_id)
        .bind(loan_date)
        .bind(return_date)
        .fetch_one(&mut *tx)
        .await;

        let reservation = match inserted {
            Ok(r) => r,
            Err(e) => {
                warn!(vehicle_id = %vehicle_id, error = %e, "reservation insert failed, rolling back");
                tx.rollback().await.ok();
                return Err(e.into());
            }
        };

        let flip = sqlx::query("UPDATE Fahrzeuge SET Belegt = 1 WHERE FId = $1")
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await;
        if let Err(e) = flip {
            warn!(vehicle_id = %vehicle_id, error = %e, "occupied flip failed, rolling back");
            tx.rollback().await.ok();
            return Err(e.into());
        }

        tx.commit().await?;
        Ok(reservation)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT AusleiheId AS id, FId AS vehicle_id, PersonenId AS person_id,
                   Ausleidatum AS loan_date, Rueckgabedatum AS return_date
            FROM Ausleihungen
            ORDER BY AusleiheId
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    async fn import_vehicles_json(&self, json: &str) -> Result<usize, AppError> {
        let records: Vec<VehicleImportRecord> = serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("malformed import payload: {e}")))?;

        let mut tx = self.pool.begin().await?;
        for record in &records {
            let inserted = sqlx::query(
                r#"
                INSERT INTO Fahrzeuge (Kennzeichen, Leistung, Kilometerstand, Belegt)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&record.license_plate)
            .bind(record.power)
            .bind(record.mileage)
            .bind(if record.occupied { 1_i32 } else { 0_i32 })
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                warn!(plate = %record.license_plate, error = %e, "import insert failed, rolling back batch");
                tx.rollback().await.ok();
                return Err(e.into());
            }
        }
        tx.commit().await?;

        debug!(count = records.len(), "vehicle import committed");
        Ok(records.len())
    }
}
