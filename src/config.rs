use std::env;

use thiserror::Error;

use crate::application::auth_service::AuthSettings;
use crate::infrastructure::cloudinary::CloudinaryConfig;

const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthSettings,
    pub cors_allowed_origins: Vec<String>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub admin: AdminSeed,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            get(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse(&get, "PORT", 8080)?,
            auth: AuthSettings {
                jwt_secret: required("JWT_SECRET")?,
                expiration_hours: parse(&get, "JWT_EXPIRATION_HOURS", 24)?,
                bcrypt_cost: parse(&get, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
            },
            cors_allowed_origins: or_default("CORS_ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            cloudinary,
            admin: AdminSeed {
                username: or_default("ADMIN_USERNAME", "admin"),
                password: or_default("ADMIN_PASSWORD", "Admin123!"),
                email: or_default("ADMIN_EMAIL", "admin@kesik.com"),
            },
        })
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
