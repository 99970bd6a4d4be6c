#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use fuhrpark::{
    app::build_app,
    config::{AppConfig, SessionConfig},
    error::AppError,
    state::AppState,
    users::password,
    users::store::{NewUser, UserRecord, UserStore},
    vehicles::dto::VehicleImportRecord,
    vehicles::store::{NewVehicle, Person, Reservation, Vehicle, VehicleStore},
};

pub const TEST_PEPPER: &str = "test-pepper";

// ---- in-memory vehicle store ----

#[derive(Default)]
struct VehicleInner {
    vehicles: Vec<Vehicle>,
    persons: Vec<Person>,
    reservations: Vec<Reservation>,
    next_vehicle_id: i32,
    next_person_id: i32,
    next_reservation_id: i32,
}

pub struct FakeVehicleStore {
    inner: Mutex<VehicleInner>,
}

impl FakeVehicleStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VehicleInner {
                next_vehicle_id: 1,
                next_person_id: 1,
                next_reservation_id: 1,
                ..Default::default()
            }),
        }
    }

    pub fn vehicle_count(&self) -> usize {
        self.inner.lock().unwrap().vehicles.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.inner.lock().unwrap().reservations.len()
    }
}

#[async_trait]
impl VehicleStore for FakeVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.inner.lock().unwrap().vehicles.clone())
    }

    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }

    async fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<i32, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_vehicle_id;
        inner.next_vehicle_id += 1;
        inner.vehicles.push(Vehicle {
            id,
            license_plate: vehicle.license_plate.clone(),
            power: vehicle.power,
            mileage: vehicle.mileage,
            occupied: vehicle.occupied,
        });
        Ok(id)
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            Some(existing) => {
                *existing = vehicle.clone();
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn delete_vehicle(&self, id: i32) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.vehicles.len();
        inner.vehicles.retain(|v| v.id != id);
        if inner.vehicles.len() == before {
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
        let mut inner = self.inner.lock().unwrap();
        if inner.persons.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::Constraint("person exists for user".into()));
        }
        let id = inner.next_person_id;
        inner.next_person_id += 1;
        inner.persons.push(Person {
            id,
            name: name.to_string(),
            email: email.to_string(),
            user_id,
        });
        Ok(id)
    }

    async fn get_person(&self, id: i32) -> Result<Option<Person>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .persons
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn person_id_for_user(&self, user_id: i32) -> Result<Option<i32>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .persons
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.id))
    }

    async fn insert_reservation(
        &self,
        vehicle_id: i32,
        person_id: i32,
        return_date: OffsetDateTime,
    ) -> Result<Reservation, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_reservation_id;
        inner.next_reservation_id += 1;
        let reservation = Reservation {
            id,
            vehicle_id,
            person_id,
            loan_date: OffsetDateTime::now_utc(),
            return_date,
        };
        inner.reservations.push(reservation.clone());
        // Same unit of work as the Postgres store: booking flips the flag.
        if let Some(vehicle) = inner.vehicles.iter_mut().find(|v| v.id == vehicle_id) {
            vehicle.occupied = true;
        }
        Ok(reservation)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        Ok(self.inner.lock().unwrap().reservations.clone())
    }

    async fn import_vehicles_json(&self, json: &str) -> Result<usize, AppError> {
        // All-or-nothing like the transactional store: a parse failure means
        // nothing is inserted.
        let records: Vec<VehicleImportRecord> = serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("malformed import payload: {e}")))?;
        let mut inner = self.inner.lock().unwrap();
        for record in &records {
            let id = inner.next_vehicle_id;
            inner.next_vehicle_id += 1;
            inner.vehicles.push(Vehicle {
                id,
                license_plate: record.license_plate.clone(),
                power: record.power,
                mileage: record.mileage,
                occupied: record.occupied,
            });
        }
        Ok(records.len())
    }
}

// ---- in-memory user store ----

struct StoredUser {
    id: i32,
    username: String,
    password_hash: String,
    is_admin: bool,
}

pub struct FakeUserStore {
    inner: Mutex<Vec<StoredUser>>,
}

impl FakeUserStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    pub fn stored_hash(&self, username: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn verify_login(&self, username: &str, pass: &str) -> Result<bool, AppError> {
        let hash = match self.stored_hash(username) {
            Some(h) => h,
            None => return Ok(false),
        };
        password::verify_password(pass, TEST_PEPPER, &hash)
    }

    async fn register(&self, new: &NewUser) -> Result<i32, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.iter().any(|u| u.username == new.username) {
            return Err(AppError::Constraint("duplicate username".into()));
        }
        let salt = password::generate_salt();
        let hash = password::hash_password(&new.password, &salt, TEST_PEPPER)?;
        let id = inner.len() as i32 + 1;
        inner.push(StoredUser {
            id,
            username: new.username.clone(),
            password_hash: hash,
            is_admin: new.is_admin,
        });
        Ok(id)
    }

    async fn is_admin(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.is_admin)
            .unwrap_or(false))
    }

    async fn user_id(&self, username: &str) -> Result<Option<i32>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id))
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| UserRecord {
                id: u.id,
                username: u.username.clone(),
                is_admin: u.is_admin,
            }))
    }
}

// ---- app wiring ----

pub fn test_config() -> AppConfig {
    AppConfig {
        fahrzeug_database_url: "postgres://unused".into(),
        user_database_url: "postgres://unused".into(),
        session: SessionConfig {
            secret: "test-session-secret".into(),
            ttl_minutes: 5,
        },
        password_pepper: TEST_PEPPER.into(),
        public_base_url: "https://localhost:7788".into(),
        qr_output_dir: std::env::temp_dir()
            .join(format!("fuhrpark-qr-{}", std::process::id()))
            .to_str()
            .expect("temp dir path")
            .to_string(),
    }
}

pub struct TestApp {
    pub app: Router,
    pub vehicles: Arc<FakeVehicleStore>,
    pub users: Arc<FakeUserStore>,
}

pub fn build_test_app() -> TestApp {
    let vehicles = Arc::new(FakeVehicleStore::new());
    let users = Arc::new(FakeUserStore::new());
    let state = AppState::from_parts(
        vehicles.clone(),
        users.clone(),
        Arc::new(test_config()),
    );
    TestApp {
        app: build_app(state),
        vehicles,
        users,
    }
}

// ---- request helpers ----

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request")
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
        .expect("request")
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn multipart_import_request(uri: &str, cookie: &str, json: &str) -> Request<Body> {
    let boundary = "XFUHRPARKBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"fleet.json\"\r\n\
         Content-Type: application/json\r\n\r\n\
         {json}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn session_cookie(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie value")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

// ---- flow helpers ----

pub async fn register_user(
    app: &Router,
    username: &str,
    pass: &str,
    name: &str,
    email: &str,
    is_admin: bool,
) -> StatusCode {
    let resp = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            serde_json::json!({
                "username": username,
                "password": pass,
                "name": name,
                "email": email,
                "is_admin": is_admin,
            }),
        ),
    )
    .await;
    resp.status()
}

/// Register and log in, returning the session cookie.
pub async fn login_user(app: &Router, username: &str, pass: &str) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            serde_json::json!({ "username": username, "password": pass }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK, "login should succeed");
    session_cookie(&resp)
}

pub async fn admin_session(app: &Router) -> String {
    let status = register_user(
        app,
        "admin1",
        "Adm1nPass!",
        "Alice Admin",
        "admin@example.de",
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login_user(app, "admin1", "Adm1nPass!").await
}
