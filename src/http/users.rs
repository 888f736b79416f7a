use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{now_rfc3339, optional_text, required_text};
use crate::core::UserRole;
use crate::db::queries::{self, NewUser, ProfileUpdate, UserRow};
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    let username = required_text(&body.username, "username")?;
    let email = required_text(&body.email, "email")?;
    if !email.contains('@') {
        return Err(AppError::Validation(format!("invalid email address: {email}")));
    }
    let role = match optional_text(body.role) {
        Some(raw) => raw.parse::<UserRole>().map_err(AppError::Validation)?,
        None => UserRole::default(),
    };

    let user = queries::insert_user(
        &state.db,
        &NewUser {
            username,
            email,
            first_name: optional_text(body.first_name),
            last_name: optional_text(body.last_name),
            role: role.as_str().to_string(),
            phone: optional_text(body.phone),
            location: optional_text(body.location),
            skills: optional_text(body.skills),
        },
        &now_rfc3339(),
    )?;
    tracing::info!(user = user.id, role = %role, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserRow>>, AppError> {
    Ok(Json(queries::list_users(&state.db)?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserRow>, AppError> {
    queries::get_user(&state.db, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserRow>, AppError> {
    let profile = ProfileUpdate {
        first_name: optional_text(body.first_name),
        last_name: optional_text(body.last_name),
        phone: optional_text(body.phone),
        location: optional_text(body.location),
        skills: optional_text(body.skills),
    };
    let user = queries::update_user(&state.db, id, &profile).map_err(|e| match e {
        crate::db::DbError::NotFound(_) => AppError::NotFound(format!("user {id} not found")),
        other => AppError::Db(other),
    })?;
    tracing::info!(user = user.id, "profile updated");
    Ok(Json(user))
}
