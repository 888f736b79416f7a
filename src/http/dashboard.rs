use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::core::{format_rfc3339, truncate_text};
use crate::db::queries::{self, IncidentStats, ResourceStats};
use crate::{AppError, AppState};

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct RecentIncident {
    pub id: i64,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub summary: String,
    pub reported: String,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub incidents: IncidentStats,
    pub resources: ResourceStats,
    /// Events waiting on each channel that no stream session has taken yet.
    pub queues: BTreeMap<&'static str, usize>,
    pub recent: Vec<RecentIncident>,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let now = Utc::now();
    let recent = queries::list_incidents(&state.db)?
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|i| RecentIncident {
            summary: truncate_text(&i.description, 100),
            reported: format_rfc3339(&i.created_at, now),
            id: i.id,
            title: i.title,
            severity: i.severity,
            status: i.status,
        })
        .collect();

    Ok(Json(Dashboard {
        incidents: queries::incident_stats(&state.db)?,
        resources: queries::resource_stats(&state.db)?,
        queues: state
            .bus
            .depths()
            .into_iter()
            .map(|(channel, depth)| (channel.as_str(), depth))
            .collect(),
        recent,
    }))
}
