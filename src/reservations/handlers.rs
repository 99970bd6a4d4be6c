use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    error::AppError,
    reservations::dto::{ReservationView, ReservationsOverview, ReserveRequest},
    session::{AdminSession, Session, SessionKeys},
    state::AppState,
    vehicles::store::{Reservation, Vehicle},
};

pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles/:id/reserve", get(start_reservation))
        .route(
            "/reservations",
            post(create_reservation).get(list_reservations),
        )
}

/// Viewing a vehicle for reservation parks its id in the session; the
/// confirmation call picks it up from there.
#[instrument(skip(state, session, jar), fields(username = %session.0.username))]
pub async fn start_reservation(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<(CookieJar, Json<Vehicle>), AppError> {
    let vehicle = state
        .vehicles
        .get_vehicle(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.reissue(&session.0, Some(id))?;
    let jar = jar.add(keys.cookie(token));

    Ok((jar, Json(vehicle)))
}

#[instrument(skip(state, session, jar, payload), fields(username = %session.0.username))]
pub async fn create_reservation(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Json(payload): Json<ReserveRequest>,
) -> Result<(StatusCode, CookieJar, Json<Reservation>), AppError> {
    let vehicle_id = session
        .0
        .fahrzeug_id
        .ok_or_else(|| AppError::Validation("no pending reservation".into()))?;
    let person_id = state
        .vehicles
        .person_id_for_user(session.0.sub)
        .await?
        .ok_or_else(|| AppError::Validation("no person record for this user".into()))?;

    let reservation = state
        .vehicles
        .insert_reservation(vehicle_id, person_id, payload.return_date)
        .await?;

    // Clear the pending vehicle id now that the reservation is booked.
    let keys = SessionKeys::from_ref(&state);
    let token = keys.reissue(&session.0, None)?;
    let jar = jar.add(keys.cookie(token));

    info!(reservation_id = %reservation.id, vehicle_id = %vehicle_id, "reservation booked");
    Ok((StatusCode::CREATED, jar, Json(reservation)))
}

/// All reservations joined with their vehicle and person projections.
#[instrument(skip(state, session), fields(admin = %session.0.username))]
pub async fn list_reservations(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<ReservationsOverview>, AppError> {
    let reservations = state.vehicles.list_reservations().await?;

    let mut views = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        let vehicle = state.vehicles.get_vehicle(reservation.vehicle_id).await?;
        let person = state.vehicles.get_person(reservation.person_id).await?;
        views.push(ReservationView {
            reservation,
            vehicle,
            person,
        });
    }

    Ok(Json(ReservationsOverview {
        reservations: views,
    }))
}
