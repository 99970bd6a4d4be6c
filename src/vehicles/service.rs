use std::sync::Arc;

use time::OffsetDateTime;

use crate::error::AppError;
use crate::vehicles::dto::FleetOverview;
use crate::vehicles::store::{NewVehicle, Person, Reservation, Vehicle, VehicleStore};

/// Pure façade over the vehicle store: one-to-one forwarding, the fleet list
/// reshaped into a transfer object. No validation and no business rules.
#[derive(Clone)]
pub struct VehicleService {
    store: Arc<dyn VehicleStore>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn fleet(&self) -> Result<FleetOverview, AppError> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(FleetOverview {
            total: vehicles.len(),
            vehicles,
        })
    }

    pub async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, AppError> {
        self.store.get_vehicle(id).await
    }

    pub async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<i32, AppError> {
        self.store.insert_vehicle(vehicle).await
    }

    pub async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        self.store.update_vehicle(vehicle).await
    }

    pub async fn delete_vehicle(&self, id: i32) -> Result<(), AppError> {
        self.store.delete_vehicle(id).await
    }

    pub async fn insert_person(
        &self,
        name: &str,
        email: &str,
        user_id: i32,
    ) -> Result<i32, AppError> {
        self.store.insert_person(name, email, user_id).await
    }

    pub async fn get_person(&self, id: i32) -> Result<Option<Person>, AppError> {
        self.store.get_person(id).await
    }

    pub async fn person_id_for_user(&self, user_id: i32) -> Result<Option<i32>, AppError> {
        self.store.person_id_for_user(user_id).await
    }

    pub async fn insert_reservation(
        &self,
        vehicle_id: i32,
        person_id: i32,
        return_date: OffsetDateTime,
    ) -> Result<Reservation, AppError> {
        self.store
            .insert_reservation(vehicle_id, person_id, return_date)
            .await
    }

    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        self.store.list_reservations().await
    }

    pub async fn import_vehicles_json(&self, json: &str) -> Result<usize, AppError> {
        self.store.import_vehicles_json(json).await
    }
}
