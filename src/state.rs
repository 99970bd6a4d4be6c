use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::users::service::UserService;
use crate::users::store::{PgUserStore, UserStore};
use crate::vehicles::service::VehicleService;
use crate::vehicles::store::{PgVehicleStore, VehicleStore};

#[derive(Clone)]
pub struct AppState {
    pub vehicles: VehicleService,
    pub users: UserService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connect both pools and wire the Postgres stores. The pools are also
    /// returned so `main` can run the per-database migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool, PgPool)> {
        let fahrzeug_db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.fahrzeug_database_url)
            .await?;
        let user_db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.user_database_url)
            .await?;

        let pepper = config.password_pepper.clone();
        let state = Self::from_parts(
            Arc::new(PgVehicleStore::new(fahrzeug_db.clone())),
            Arc::new(PgUserStore::new(user_db.clone(), pepper)),
            Arc::new(config),
        );
        Ok((state, fahrzeug_db, user_db))
    }

    pub fn from_parts(
        vehicles: Arc<dyn VehicleStore>,
        users: Arc<dyn UserStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            vehicles: VehicleService::new(vehicles),
            users: UserService::new(users),
            config,
        }
    }
}
