use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{now_rfc3339, optional_text, required_text};
use crate::bus::Channel;
use crate::core::{validate_coordinates, IncidentStatus, IncidentType, ResourceType};
use crate::db::queries::{self, AllocationRow, NewAllocation, NewResource, ResourceRow};
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub resource_type: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contributor_id: Option<i64>,
    #[serde(default)]
    pub contact_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub resource_id: i64,
    pub incident_id: i64,
    #[serde(default)]
    pub responder_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MapIncident {
    pub id: i64,
    pub title: String,
    pub incident_type: String,
    pub severity: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: &'static str,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MapResource {
    pub id: i64,
    pub name: String,
    pub resource_type: String,
    pub quantity: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub is_verified: bool,
}

#[derive(Debug, Serialize)]
pub struct MapData {
    pub incidents: Vec<MapIncident>,
    pub resources: Vec<MapResource>,
}

pub async fn create_resource(
    State(state): State<AppState>,
    Json(body): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceRow>), AppError> {
    let name = required_text(&body.name, "name")?;
    let resource_type = ResourceType::from_str(body.resource_type.trim()).map_err(AppError::Validation)?;
    let quantity = body.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }
    match (body.latitude, body.longitude) {
        (Some(lat), Some(lng)) if !validate_coordinates(lat, lng) => {
            return Err(AppError::Validation("Invalid coordinates".to_string()));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(AppError::Validation(
                "latitude and longitude must be given together".to_string(),
            ));
        }
        _ => {}
    }
    if let Some(contributor) = body.contributor_id {
        if queries::get_user(&state.db, contributor)?.is_none() {
            return Err(AppError::NotFound(format!("user {contributor} not found")));
        }
    }

    let resource = queries::insert_resource(
        &state.db,
        &NewResource {
            name,
            resource_type: resource_type.as_str().to_string(),
            quantity,
            location: optional_text(body.location),
            latitude: body.latitude,
            longitude: body.longitude,
            description: optional_text(body.description),
            contributor_id: body.contributor_id,
            contact_info: optional_text(body.contact_info),
        },
        &now_rfc3339(),
    )?;
    tracing::info!(resource = resource.id, kind = %resource_type, quantity, "resource added");
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResourceRow>>, AppError> {
    Ok(Json(queries::list_available_resources(&state.db, false)?))
}

pub async fn verify_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResourceRow>, AppError> {
    let resource = queries::verify_resource(&state.db, id, &now_rfc3339())?;
    tracing::info!(resource = id, "resource verified");
    Ok(Json(resource))
}

pub async fn allocate_resource(
    State(state): State<AppState>,
    Json(body): Json<AllocateRequest>,
) -> Result<(StatusCode, Json<AllocationRow>), AppError> {
    let quantity = body.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }
    let responder = match body.responder_id {
        Some(id) => Some(
            queries::get_user(&state.db, id)?
                .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?,
        ),
        None => None,
    };

    let outcome = queries::allocate_resource(
        &state.db,
        &NewAllocation {
            resource_id: body.resource_id,
            incident_id: body.incident_id,
            responder_id: body.responder_id,
            quantity,
            notes: optional_text(body.notes),
        },
        &now_rfc3339(),
    )?;

    state.publisher.publish_to(
        Channel::ResourceAllocation,
        &json!({
            "incident_id": body.incident_id,
            "resource_name": outcome.resource.name,
            "quantity": quantity,
            "responder": responder.as_ref().map(|user| user.full_name()),
        }),
    );

    if outcome.resource.status != outcome.previous_resource_status {
        state.publisher.publish_to(
            Channel::StatusChange,
            &json!({
                "entity": "resource",
                "id": outcome.resource.id,
                "status": outcome.resource.status,
                "previous_status": outcome.previous_resource_status,
            }),
        );
    }

    tracing::info!(
        resource = body.resource_id,
        incident = body.incident_id,
        quantity,
        remaining = outcome.resource.quantity,
        "resource allocated to incident"
    );
    Ok((StatusCode::CREATED, Json(outcome.allocation)))
}

pub async fn map_data(State(state): State<AppState>) -> Result<Json<MapData>, AppError> {
    let incidents = queries::list_incidents(&state.db)?
        .into_iter()
        .filter(|i| i.status != IncidentStatus::Resolved.as_str())
        .map(|i| MapIncident {
            icon: IncidentType::from_str(&i.incident_type)
                .unwrap_or(IncidentType::Other)
                .icon(),
            id: i.id,
            title: i.title,
            incident_type: i.incident_type,
            severity: i.severity,
            status: i.status,
            latitude: i.latitude,
            longitude: i.longitude,
            created_at: i.created_at,
        })
        .collect();

    let resources = queries::list_available_resources(&state.db, true)?
        .into_iter()
        .filter_map(|r| {
            Some(MapResource {
                latitude: r.latitude?,
                longitude: r.longitude?,
                id: r.id,
                name: r.name,
                resource_type: r.resource_type,
                quantity: r.quantity,
                is_verified: r.is_verified,
            })
        })
        .collect();

    Ok(Json(MapData {
        incidents,
        resources,
    }))
}
