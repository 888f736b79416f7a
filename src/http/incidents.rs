use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{now_rfc3339, optional_text, required_text};
use crate::ai;
use crate::bus::Channel;
use crate::core::{format_rfc3339, validate_coordinates, IncidentStatus, IncidentType, Severity};
use crate::db::queries::{
    self, AllocationRow, IncidentRow, IncidentUpdateRow, NewIncident, UserRow,
};
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ReportIncidentRequest {
    pub title: String,
    pub description: String,
    pub incident_type: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub people_affected: Option<i64>,
    pub reporter_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddUpdateRequest {
    pub user_id: i64,
    pub update_text: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IncidentDetail {
    pub incident: IncidentRow,
    pub updates: Vec<IncidentUpdateRow>,
    pub allocations: Vec<AllocationRow>,
}

fn load_incident(state: &AppState, id: i64) -> Result<IncidentRow, AppError> {
    queries::get_incident(&state.db, id)?
        .ok_or_else(|| AppError::NotFound(format!("incident {id} not found")))
}

fn load_user(state: &AppState, id: i64) -> Result<UserRow, AppError> {
    queries::get_user(&state.db, id)?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
}

pub async fn report_incident(
    State(state): State<AppState>,
    Json(body): Json<ReportIncidentRequest>,
) -> Result<(StatusCode, Json<IncidentRow>), AppError> {
    let title = required_text(&body.title, "title")?;
    let description = required_text(&body.description, "description")?;
    let incident_type = body
        .incident_type
        .trim()
        .parse::<IncidentType>()
        .map_err(AppError::Validation)?;
    let severity = match optional_text(body.severity) {
        Some(raw) => raw.parse::<Severity>().map_err(AppError::Validation)?,
        None => Severity::default(),
    };
    if !validate_coordinates(body.latitude, body.longitude) {
        return Err(AppError::Validation(
            "Invalid coordinates. Please select a valid location on the map.".to_string(),
        ));
    }
    let people_affected = body.people_affected.unwrap_or(0);
    if people_affected < 0 {
        return Err(AppError::Validation(
            "people_affected cannot be negative".to_string(),
        ));
    }
    load_user(&state, body.reporter_id)?;

    let incident = queries::insert_incident(
        &state.db,
        &NewIncident {
            title,
            description,
            incident_type: incident_type.as_str().to_string(),
            severity: severity.as_str().to_string(),
            latitude: body.latitude,
            longitude: body.longitude,
            address: optional_text(body.address),
            people_affected,
            reporter_id: body.reporter_id,
        },
        &now_rfc3339(),
    )?;

    let analysis = ai::analyze_incident(state.ai.as_ref(), &incident).await;
    let incident = match queries::set_incident_analysis(&state.db, incident.id, &analysis, &now_rfc3339()) {
        Ok(()) => load_incident(&state, incident.id).unwrap_or(incident),
        Err(e) => {
            // The incident itself is committed; report it without the analysis.
            tracing::error!(incident = incident.id, "failed to store AI analysis: {e}");
            incident
        }
    };

    state.publisher.publish_to(
        Channel::NewIncident,
        &json!({
            "incident_id": incident.id,
            "title": incident.title,
            "type": incident.incident_type,
            "severity": incident.severity,
            "location": incident.location_label(),
            "timestamp": format_rfc3339(&incident.created_at, Utc::now()),
        }),
    );
    tracing::info!(incident = incident.id, kind = %incident_type, "incident reported");

    Ok((StatusCode::CREATED, Json(incident)))
}

pub async fn list_incidents(
    State(state): State<AppState>,
) -> Result<Json<Vec<IncidentRow>>, AppError> {
    Ok(Json(queries::list_incidents(&state.db)?))
}

pub async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IncidentDetail>, AppError> {
    let incident = load_incident(&state, id)?;
    let updates = queries::list_updates_for_incident(&state.db, id)?;
    let allocations = queries::list_allocations_for_incident(&state.db, id)?;
    Ok(Json(IncidentDetail {
        incident,
        updates,
        allocations,
    }))
}

pub async fn add_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddUpdateRequest>,
) -> Result<(StatusCode, Json<IncidentUpdateRow>), AppError> {
    let update_text = required_text(&body.update_text, "update_text")?;
    let new_status = match optional_text(body.status) {
        Some(raw) => Some(raw.parse::<IncidentStatus>().map_err(AppError::Validation)?),
        None => None,
    };
    let incident = load_incident(&state, id)?;
    let user = load_user(&state, body.user_id)?;

    let recorded = queries::record_incident_update(
        &state.db,
        incident.id,
        user.id,
        &update_text,
        new_status.map(|status| status.as_str()),
        &now_rfc3339(),
    )?;
    let update = recorded.update;
    let changed_from = new_status.zip(recorded.previous_status);

    let mut payload = Map::new();
    payload.insert("incident_id".into(), json!(id));
    payload.insert("update_id".into(), json!(update.id));
    payload.insert("update_text".into(), json!(update.update_text));
    payload.insert("user".into(), json!(user.username));
    payload.insert(
        "timestamp".into(),
        json!(format_rfc3339(&update.created_at, Utc::now())),
    );
    if let Some((status, _)) = &changed_from {
        payload.insert("status".into(), json!(status.as_str()));
    }
    state
        .publisher
        .publish_to(Channel::IncidentUpdate, &Value::Object(payload));

    if let Some((status, previous)) = changed_from {
        state.publisher.publish_to(
            Channel::StatusChange,
            &json!({
                "entity": "incident",
                "id": id,
                "status": status.as_str(),
                "previous_status": previous,
            }),
        );
        tracing::info!(incident = id, %status, %previous, "incident status changed");
    }

    Ok((StatusCode::CREATED, Json(update)))
}

pub async fn recommend_resources(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let incident = load_incident(&state, id)?;
    let available = queries::list_available_resources(&state.db, false)?;
    let recommendations = ai::recommend_resources(state.ai.as_ref(), &incident, &available).await;
    Ok(Json(recommendations))
}
