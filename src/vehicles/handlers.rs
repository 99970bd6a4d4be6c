use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppError,
    session::{AdminSession, OptionalSession},
    state::AppState,
    validation,
    vehicles::dto::{
        CreatedVehicleResponse, FleetResponse, ImportReport, QrCodeResponse, VehicleInput,
    },
    vehicles::qr,
    vehicles::store::{NewVehicle, Vehicle},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles/:id", get(get_vehicle))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", post(create_vehicle))
        .route(
            "/vehicles/:id",
            axum::routing::put(update_vehicle).delete(delete_vehicle),
        )
        .route("/vehicles/import", post(import_vehicles))
        .route("/vehicles/:id/qrcode", get(qr_code))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2MB import files
}

/// Fleet overview; echoes the session username and role when present.
#[instrument(skip(state, session))]
pub async fn list_vehicles(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
) -> Result<Json<FleetResponse>, AppError> {
    let fleet = state.vehicles.fleet().await?;
    let (username, role) = session
        .map(|c| (Some(c.username), c.role))
        .unwrap_or((None, None));
    Ok(Json(FleetResponse {
        username,
        role,
        total: fleet.total,
        vehicles: fleet.vehicles,
    }))
}

#[instrument(skip(state))]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = state
        .vehicles
        .get_vehicle(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(vehicle))
}

#[instrument(skip(state, session, payload), fields(admin = %session.0.username))]
pub async fn create_vehicle(
    State(state): State<AppState>,
    session: AdminSession,
    Json(payload): Json<VehicleInput>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedVehicleResponse>), AppError> {
    validate_input(&payload)?;

    let id = state
        .vehicles
        .insert_vehicle(&NewVehicle {
            license_plate: payload.license_plate,
            power: payload.power,
            mileage: payload.mileage,
            occupied: payload.occupied,
        })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/vehicles/{id}")
            .parse()
            .map_err(|_| AppError::Internal("location header".into()))?,
    );

    info!(vehicle_id = %id, "vehicle created");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedVehicleResponse { id }),
    ))
}

#[instrument(skip(state, session, payload), fields(admin = %session.0.username))]
pub async fn update_vehicle(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i32>,
    Json(payload): Json<VehicleInput>,
) -> Result<StatusCode, AppError> {
    validate_input(&payload)?;

    state
        .vehicles
        .update_vehicle(&Vehicle {
            id,
            license_plate: payload.license_plate,
            power: payload.power,
            mileage: payload.mileage,
            occupied: payload.occupied,
        })
        .await?;

    info!(vehicle_id = %id, "vehicle updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session), fields(admin = %session.0.username))]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.vehicles.delete_vehicle(id).await?;
    info!(vehicle_id = %id, "vehicle deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /vehicles/import (multipart, field `file`): JSON array of vehicle
/// records, inserted all-or-nothing.
#[instrument(skip(state, session, mp), fields(admin = %session.0.username))]
pub async fn import_vehicles(
    State(state): State<AppState>,
    session: AdminSession,
    mut mp: Multipart,
) -> Result<Json<ImportReport>, AppError> {
    let mut payload: Option<String> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("unreadable upload: {e}")))?;
            payload = Some(text);
        }
    }
    let payload =
        payload.ok_or_else(|| AppError::Validation("file field is required".into()))?;

    let inserted = state.vehicles.import_vehicles_json(&payload).await?;
    info!(inserted = %inserted, "vehicle import committed");
    Ok(Json(ImportReport { inserted }))
}

#[instrument(skip(state, session), fields(admin = %session.0.username))]
pub async fn qr_code(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i32>,
) -> Result<Json<QrCodeResponse>, AppError> {
    let vehicle = state
        .vehicles
        .get_vehicle(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let image_path = qr::generate(
        &vehicle,
        &state.config.public_base_url,
        &state.config.qr_output_dir,
    )?;
    Ok(Json(QrCodeResponse { image_path }))
}

fn validate_input(payload: &VehicleInput) -> Result<(), AppError> {
    validation::validate_license_plate(&payload.license_plate)?;
    validation::validate_power(payload.power)?;
    validation::validate_mileage(payload.mileage)?;
    Ok(())
}
