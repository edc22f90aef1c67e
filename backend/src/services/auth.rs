//! Authentication service for login and token issuance

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Response after successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Public user profile
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// User info from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    full_name: String,
    password_hash: String,
    is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Verify credentials and issue an access token
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let username = input.username.trim().to_lowercase();

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, full_name, password_hash, is_active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        let matched = verify(&input.password, &user.password_hash)
            .map_err(|e| anyhow::anyhow!("password verification failed: {}", e))?;

        if !matched {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sign_token(user.id)?;

        Ok(LoginResponse {
            token,
            user: UserProfile {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
            },
        })
    }

    /// Profile of the authenticated user
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, full_name, password_hash, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
        })
    }

    fn sign_token(&self, user_id: Uuid) -> AppResult<String> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::Configuration(
                "JWT secret is not configured".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Configuration(format!("failed to sign token: {}", e)))
    }
}
