use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{NewUser, PublicUser, User};
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::auth::{hash_password, verify_password};
use crate::utils::error::{AppError, Result};
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: PublicUser,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

impl RegisterRequest {
    fn validate(&self) -> Result<()> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        require("fullName", &self.full_name)?;

        if !self.email.contains('@') {
            return Err(AppError::ValidationError(
                "email must be a valid address".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn register<S: PassStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let username = request.username.trim().to_string();

    if state.store.user_exists(&email, &username).await? {
        return Err(AppError::ValidationError("User already exists".to_string()));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))??;

    let user = state
        .store
        .create_user(NewUser {
            username,
            email,
            password_hash,
            full_name: request.full_name.trim().to_string(),
            phone: request.phone.filter(|p| !p.trim().is_empty()),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = state.tokens.issue(&user)?;
    Ok(created(
        AuthPayload {
            token,
            user: user.into(),
        },
        "User created successfully",
    ))
}

pub async fn login<S: PassStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let invalid = || AppError::ValidationError("Invalid credentials".to_string());

    let user: User = state
        .store
        .find_user_by_email(&request.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))?;

    if !valid {
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    Ok(success(
        AuthPayload {
            token,
            user: user.into(),
        },
        "Login successful",
    ))
}
