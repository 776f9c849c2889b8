use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use mercato_core::{StoreError, User};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: UserEcho,
}

#[derive(Debug, Serialize)]
pub struct UserEcho {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

fn required(field: Option<String>) -> Result<String, AppError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let name = required(body.name)?;
    let email = required(body.email)?;
    let password = required(body.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("Email already exists".to_string()));
    }

    let user = User::new(name, email, hash_password(&password)?);
    match state.users.create(user).await {
        Ok(created) => {
            tracing::info!(user_id = %created.id, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "User registered successfully" })),
            ))
        }
        Err(StoreError::DuplicateEmail) => {
            Err(AppError::BadRequest("Email already exists".to_string()))
        }
        Err(err) => Err(AppError::Internal(err.into())),
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = required(body.email)?;
    let password = required(body.password)?;

    // Unknown email and wrong password answer identically.
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid credentials".to_string()))?;
    if !verify_password(&password, &user.password_hash) {
        return Err(AppError::BadRequest("Invalid credentials".to_string()));
    }

    let access_token = issue_token(
        user.id,
        &state.auth.jwt_secret,
        Duration::minutes(state.auth.access_token_minutes),
    )?;
    let refresh_token = issue_token(
        user.id,
        &state.auth.jwt_refresh_secret,
        Duration::days(state.auth.refresh_token_days),
    )?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: UserEcho {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = body
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Refresh token required".to_string()))?;

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.auth.jwt_refresh_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let access_token = issue_token(
        user.id,
        &state.auth.jwt_secret,
        Duration::minutes(state.auth.access_token_minutes),
    )?;

    Ok(Json(json!({ "accessToken": access_token })))
}
