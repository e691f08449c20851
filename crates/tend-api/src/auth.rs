use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use tend_assistant::AssistantClient;
use tend_db::Database;
use tend_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub assistant: AssistantClient,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation(
            "username must be 3-32 characters".into(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("email address is not valid".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::Internal)?
        .to_string();

    let user_id = Uuid::new_v4();

    // Uniqueness is enforced by the store's constraints and surfaces as a
    // Conflict, so no racy pre-check is needed.
    let db_state = state.clone();
    let username = req.username.clone();
    blocking(move || {
        db_state.db.create_user(
            &user_id.to_string(),
            &username,
            &req.email,
            &password_hash,
            Utc::now(),
        )?;
        Ok(())
    })
    .await?;

    let token = create_token(&state.jwt_secret, user_id, &req.username)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let db_state = state.clone();
    let username = req.username.clone();
    let user = blocking(move || Ok(db_state.db.get_user_by_username(&username)?))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::Internal)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id = parse_uuid(&user.id);
    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let user = blocking(move || Ok(state.db.get_user_by_id(&user_id)?))
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(UserResponse {
        id: parse_uuid(&user.id),
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}

fn create_token(secret: &str, user_id: Uuid, username: &str) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal)
}
