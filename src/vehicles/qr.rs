use std::path::Path;

use image::Luma;
use qrcode::QrCode;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::vehicles::store::Vehicle;

/// German label text encoded into the QR image. The booking link is only
/// present while the vehicle is free; the `€` suffix on Leistung is kept
/// verbatim because printed labels are scanned against it.
pub fn payload_text(vehicle: &Vehicle, base_url: &str) -> String {
    if vehicle.occupied {
        format!(
            "Kennzeichen: {}\nKilometer: {}\nLeistung: {}€\nBelegt: Ja",
            vehicle.license_plate, vehicle.mileage, vehicle.power
        )
    } else {
        format!(
            "Kennzeichen: {}\nKilometer: {}\nLeistung: {}€\nBelegt: Nein\nLink zum Mieten: {}/Fahrzeuge/Details/{}",
            vehicle.license_plate, vehicle.mileage, vehicle.power, base_url, vehicle.id
        )
    }
}

/// Render the vehicle label as a ~300px PNG under `output_dir` and return
/// the relative URL it is served at. Filenames are timestamp-derived and not
/// guarded against collisions.
#[instrument(skip(vehicle, base_url, output_dir), fields(vehicle_id = %vehicle.id))]
pub fn generate(vehicle: &Vehicle, base_url: &str, output_dir: &str) -> Result<String, AppError> {
    let payload = payload_text(vehicle, base_url);
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Internal(format!("qr encode: {e}")))?;
    let image = code.render::<Luma<u8>>().min_dimensions(300, 300).build();

    std::fs::create_dir_all(output_dir)
        .map_err(|e| AppError::Internal(format!("create qr dir: {e}")))?;
    let file_name = format!(
        "qrcode_{}.png",
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    );
    let file_path = Path::new(output_dir).join(&file_name);
    image
        .save(&file_path)
        .map_err(|e| AppError::Internal(format!("save qr image: {e}")))?;

    debug!(file = %file_name, "qr image written");
    Ok(format!("/qrcodes/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(occupied: bool) -> Vehicle {
        Vehicle {
            id: 7,
            license_plate: "AA-123-BB".into(),
            power: 120,
            mileage: 5000,
            occupied,
        }
    }

    #[test]
    fn free_vehicle_payload_carries_booking_link() {
        let text = payload_text(&vehicle(false), "https://localhost:7788");
        assert!(text.contains("Kennzeichen: AA-123-BB"));
        assert!(text.contains("Kilometer: 5000"));
        assert!(text.contains("Leistung: 120€"));
        assert!(text.contains("Belegt: Nein"));
        assert!(text.contains("Link zum Mieten: https://localhost:7788/Fahrzeuge/Details/7"));
    }

    #[test]
    fn occupied_vehicle_payload_has_no_link() {
        let text = payload_text(&vehicle(true), "https://localhost:7788");
        assert!(text.contains("Belegt: Ja"));
        assert!(!text.contains("Link zum Mieten"));
    }

    #[test]
    fn generate_writes_png_and_returns_relative_url() {
        let dir = std::env::temp_dir().join(format!("qr-test-{}", std::process::id()));
        let dir_str = dir.to_str().expect("temp dir path");
        let url = generate(&vehicle(false), "https://localhost:7788", dir_str).expect("generate");
        assert!(url.starts_with("/qrcodes/qrcode_"));
        assert!(url.ends_with(".png"));
        let file_name = url.trim_start_matches("/qrcodes/");
        assert!(dir.join(file_name).exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
