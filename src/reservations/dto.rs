use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::vehicles::store::{Person, Reservation, Vehicle};

/// Body of the reservation confirmation; the vehicle id comes from the
/// pending session value, the person from the session user.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    #[serde(with = "time::serde::rfc3339")]
    pub return_date: OffsetDateTime,
}

/// One reservation joined with its vehicle and person projections. Either
/// side may be gone after a hard vehicle delete.
#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub reservation: Reservation,
    pub vehicle: Option<Vehicle>,
    pub person: Option<Person>,
}

#[derive(Debug, Serialize)]
pub struct ReservationsOverview {
    pub reservations: Vec<ReservationView>,
}
