use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{Map, Value};

use super::auth::{bearer_token, hash_password, verify_password, AuthUser};
use super::error::{ApiError, ApiResult};
use super::storage::validate_data_type;
use super::users::is_unique_violation;
use super::AppState;
use crate::protocol::{
    Ack, AuthResponse, DataPayload, DataTypeDocument, HealthResponse, LoginRequest, Profile,
    ProfileUpdated, RegisterRequest, SyncDocument, UpdateProfileRequest, VerifyResponse,
    MIN_PASSWORD_LEN,
};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

// ============================================================================
// Auth
// ============================================================================

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if state.users.find_by_email(email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let hash = hash_password(req.password, state.bcrypt_cost).await?;
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = match state.users.create(email, &hash, name).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::bad_request("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(ApiError::internal)?;

    tracing::info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: user.info(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let Some(user) = state.users.find_by_email(email).await? else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    if !verify_password(req.password, user.password.clone()).await? {
        tracing::info!(user_id = user.id, "Failed login");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(ApiError::internal)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.info(),
    }))
}

pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let invalid = |error: String| {
        (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                valid: false,
                user: None,
                error: Some(error),
            }),
        )
            .into_response()
    };

    let Some(token) = bearer_token(&headers) else {
        return invalid("No token provided".to_string());
    };
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => return invalid(format!("Invalid token: {}", e)),
    };

    match state.users.find_by_id(claims.id).await {
        Ok(Some(user)) => Json(VerifyResponse {
            valid: true,
            user: Some(user.info()),
            error: None,
        })
        .into_response(),
        Ok(None) => invalid("User not found".to_string()),
        Err(e) => ApiError::internal(e).into_response(),
    }
}

// ============================================================================
// Data
// ============================================================================

fn checked_data_type(data_type: &str) -> ApiResult<()> {
    if validate_data_type(data_type) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid data type: {}",
            data_type
        )))
    }
}

pub async fn get_all_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<SyncDocument>> {
    let data = state.data.load_all(user.id).await?;
    Ok(Json(SyncDocument {
        success: true,
        data,
        timestamp: Utc::now(),
    }))
}

pub async fn sync_all_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DataPayload>,
) -> ApiResult<Json<Ack>> {
    let document: Map<String, Value> = match payload.data {
        Some(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("Invalid data format")),
    };
    for data_type in document.keys() {
        checked_data_type(data_type)?;
    }

    let saved = state.data.save_all(user.id, &document).await?;
    tracing::info!(user_id = user.id, data_types = saved, "Synced user data");

    Ok(Json(Ack {
        success: true,
        message: "Data synced successfully".to_string(),
        timestamp: Utc::now(),
    }))
}

pub async fn get_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(data_type): Path<String>,
) -> ApiResult<Json<DataTypeDocument>> {
    checked_data_type(&data_type)?;

    let data = state
        .data
        .load(user.id, &data_type)
        .await?
        .unwrap_or_else(|| Value::Object(Map::new()));

    Ok(Json(DataTypeDocument {
        success: true,
        data_type,
        data,
        timestamp: Utc::now(),
    }))
}

pub async fn save_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(data_type): Path<String>,
    Json(payload): Json<DataPayload>,
) -> ApiResult<Json<Ack>> {
    checked_data_type(&data_type)?;

    let data = match payload.data {
        Some(Value::Null) | None => return Err(ApiError::bad_request("Data is required")),
        Some(data) => data,
    };
    state.data.save(user.id, &data_type, &data).await?;

    Ok(Json(Ack {
        success: true,
        message: format!("{} data saved successfully", data_type),
        timestamp: Utc::now(),
    }))
}

pub async fn delete_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(data_type): Path<String>,
) -> ApiResult<Json<Ack>> {
    checked_data_type(&data_type)?;

    let removed = state.data.delete(user.id, &data_type).await?;
    tracing::debug!(user_id = user.id, %data_type, removed, "Deleted user data");

    Ok(Json(Ack {
        success: true,
        message: format!("{} data deleted successfully", data_type),
        timestamp: Utc::now(),
    }))
}

// ============================================================================
// Users
// ============================================================================

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Profile>> {
    state
        .users
        .find_by_id(user.id)
        .await?
        .map(|u| Json(u.profile()))
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdated>> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }

    if !state.users.update_name(user.id, name).await? {
        return Err(ApiError::not_found("User not found"));
    }
    let updated = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully".to_string(),
        user: updated.info(),
    }))
}
