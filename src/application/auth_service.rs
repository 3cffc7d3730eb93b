use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::admin::{NewAdmin, Principal, Session, ADMIN_ROLE};
use crate::domain::errors::DomainError;
use crate::domain::ports::AdminRepository;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub expiration_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

pub struct AuthService {
    admins: Arc<dyn AdminRepository>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(admins: Arc<dyn AdminRepository>, settings: AuthSettings) -> Self {
        Self { admins, settings }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        log::info!("Login attempt for {}", username);
        let Some(admin) = self.admins.find_by_username(username)? else {
            log::warn!("Login failed, unknown username {}", username);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !admin.enabled {
            log::warn!("Login failed, account disabled for {}", username);
            return Err(DomainError::Unauthorized("Account is disabled".to_string()));
        }
        let matches = bcrypt::verify(password, &admin.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !matches {
            log::warn!("Login failed, wrong password for {}", username);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.admins.touch_last_login(admin.id)?;
        let token = self.issue_token(&admin.username, &admin.role)?;
        log::info!("Login successful for {}", username);
        Ok(Session {
            token,
            username: admin.username,
            role: admin.role,
        })
    }

    pub fn issue_token(&self, username: &str, role: &str) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.settings.expiration_hours)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )
        .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Decodes and verifies a bearer token.
    pub fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            log::debug!("Token rejected: {}", e);
            DomainError::Unauthorized("Invalid or expired token".to_string())
        })?;
        Ok(Principal {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }

    pub fn validate(&self, token: &str) -> bool {
        self.authenticate(token).is_ok()
    }

    /// Creates the admin account unless one with that username exists.
    /// Returns whether an account was created.
    pub fn ensure_admin(&self, username: &str, password: &str, email: &str) -> Result<bool, DomainError> {
        if self.admins.exists(username)? {
            log::info!("Admin user {} already exists, skipping seed", username);
            return Ok(false);
        }
        let password_hash = bcrypt::hash(password, self.settings.bcrypt_cost)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        self.admins.insert(NewAdmin {
            username: username.to_string(),
            password_hash,
            email: email.to_string(),
            role: ADMIN_ROLE.to_string(),
        })?;
        log::warn!(
            "Default admin user {} created; change its password after first login",
            username
        );
        Ok(true)
    }
}
