use serde::{Deserialize, Serialize};

use crate::vehicles::store::Vehicle;

/// Vehicle fields as accepted from forms; bounds are checked by the
/// validation layer before the store sees them.
#[derive(Debug, Deserialize)]
pub struct VehicleInput {
    pub license_plate: String,
    pub power: i32,
    pub mileage: i32,
    #[serde(default)]
    pub occupied: bool,
}

/// Fleet transfer object shaped by the service from the raw list.
#[derive(Debug, Serialize)]
pub struct FleetOverview {
    pub total: usize,
    pub vehicles: Vec<Vehicle>,
}

/// Fleet overview plus the session echo shown on the landing page.
#[derive(Debug, Serialize)]
pub struct FleetResponse {
    pub username: Option<String>,
    pub role: Option<String>,
    pub total: usize,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Serialize)]
pub struct CreatedVehicleResponse {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
}

#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub image_path: String,
}

/// One record of the JSON bulk-import payload. Field names are the German
/// wire format of the import file.
#[derive(Debug, Deserialize)]
pub struct VehicleImportRecord {
    #[serde(rename = "FId", default)]
    pub id: Option<i32>,
    #[serde(rename = "Kennzeichen")]
    pub license_plate: String,
    #[serde(rename = "Leistung")]
    pub power: i32,
    #[serde(rename = "Kilometerstand")]
    pub mileage: i32,
    #[serde(rename = "Belegt")]
    pub occupied: bool,
}
