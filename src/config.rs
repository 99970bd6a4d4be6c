use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Connection string for Fahrzeuge/Personen/Ausleihungen ("FahrzeugDal").
    pub fahrzeug_database_url: String,
    /// Connection string for Users ("UserDal").
    pub user_database_url: String,
    pub session: SessionConfig,
    /// Per-deployment secret mixed into every password before hashing.
    pub password_pepper: String,
    /// Host embedded into the QR booking link.
    pub public_base_url: String,
    /// Directory the generated QR images are written to; served as /qrcodes.
    pub qr_output_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let fahrzeug_database_url = std::env::var("FAHRZEUG_DATABASE_URL")?;
        let user_database_url = std::env::var("USER_DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let password_pepper = std::env::var("PASSWORD_PEPPER")?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://localhost:7788".into());
        let qr_output_dir =
            std::env::var("QR_OUTPUT_DIR").unwrap_or_else(|_| "public/qrcodes".into());
        Ok(Self {
            fahrzeug_database_url,
            user_database_url,
            session,
            password_pepper,
            public_base_url,
            qr_output_dir,
        })
    }
}
