use serde_json::{json, Value};

use crate::ai::error::AiError;
use crate::ai::types::CompletionClient;
use crate::db::queries::{IncidentRow, ResourceRow};

const GAP_NOTE: &str = "Could not determine resource gaps due to processing error";

fn location_line(incident: &IncidentRow) -> String {
    match incident.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => address.to_string(),
        _ => format!("Coordinates: {}, {}", incident.latitude, incident.longitude),
    }
}

pub fn analysis_prompt(incident: &IncidentRow) -> String {
    format!(
        "Analyze this emergency incident and provide key insights:\n\n\
         Title: {title}\n\
         Type: {kind}\n\
         Description: {description}\n\
         Severity: {severity}\n\
         Location: {location}\n\
         People affected: {people}\n\
         Reported at: {reported}\n\n\
         First, determine if the current severity level ({severity}) and incident type ({kind}) \
         are appropriate based on the description. If they should be different, clearly indicate \
         the recommended classification.\n\n\
         Then provide:\n\
         1. Incident classification and priority assessment\n\
         2. Potential risks and complications\n\
         3. Recommended immediate actions\n\
         4. Resource requirements (medical, rescue, shelter, etc.)\n\
         5. Coordination instructions for emergency responders\n\n\
         Format the response in a clear, structured manner suitable for emergency responders.\n\
         Start with a \"CLASSIFICATION RECOMMENDATIONS:\" section that specifically addresses \
         if the severity and incident type should be changed.",
        title = incident.title,
        kind = incident.incident_type,
        description = incident.description,
        severity = incident.severity,
        location = location_line(incident),
        people = incident.people_affected,
        reported = incident.created_at,
    )
}

pub fn recommendation_prompt(incident: &IncidentRow, available: &[ResourceRow]) -> String {
    let resources = available
        .iter()
        .map(|r| {
            format!(
                "- {} (id {}): Type={}, Quantity={}, Location={}",
                r.name,
                r.id,
                r.resource_type,
                r.quantity,
                r.location.as_deref().unwrap_or("Unknown")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on this emergency incident, recommend the most appropriate resources to allocate:\n\n\
         INCIDENT DETAILS:\n\
         Title: {title}\n\
         Type: {kind}\n\
         Description: {description}\n\
         Severity: {severity}\n\
         Location: {location}\n\
         People affected: {people}\n\
         Status: {status}\n\
         AI Analysis: {analysis}\n\n\
         AVAILABLE RESOURCES:\n{resources}\n\n\
         Please provide:\n\
         1. A ranked list of the most important resources to allocate to this incident\n\
         2. The recommended quantity for each resource\n\
         3. A brief explanation for each recommendation\n\
         4. Any critical resource gaps that need to be addressed\n\n\
         Format your response as a valid JSON object with these keys:\n\
         - recommendations: array of objects with resource_id, resource_name, quantity, and rationale\n\
         - resource_gaps: array of strings describing missing resources\n\
         - priority_level: string (critical, high, medium, low)",
        title = incident.title,
        kind = incident.incident_type,
        description = incident.description,
        severity = incident.severity,
        location = location_line(incident),
        people = incident.people_affected,
        status = incident.status,
        analysis = incident.ai_analysis.as_deref().unwrap_or("Not available"),
    )
}

/// Ask the model for an incident analysis. Failures come back as readable
/// text so the caller can store them in place of an analysis.
pub async fn analyze_incident(client: &dyn CompletionClient, incident: &IncidentRow) -> String {
    match client.generate(&analysis_prompt(incident)).await {
        Ok(analysis) => {
            tracing::info!(incident = incident.id, "generated AI analysis");
            analysis
        }
        Err(AiError::Config(reason)) => {
            tracing::debug!(incident = incident.id, "AI analysis skipped: {reason}");
            "AI analysis unavailable".to_string()
        }
        Err(e) => {
            tracing::error!(incident = incident.id, "error generating AI analysis: {e}");
            format!("Error generating AI analysis: {e}")
        }
    }
}

/// Ask the model which of `available` to send to `incident`.
///
/// The reply's outermost `{...}` span is parsed as the answer. A reply with no
/// usable JSON falls back to suggesting the first three resources; a failed
/// call yields `{"error": ...}`.
pub async fn recommend_resources(
    client: &dyn CompletionClient,
    incident: &IncidentRow,
    available: &[ResourceRow],
) -> Value {
    let reply = match client.generate(&recommendation_prompt(incident, available)).await {
        Ok(reply) => reply,
        Err(AiError::Config(_)) => {
            return json!({ "error": "AI resource recommendation unavailable" });
        }
        Err(e) => {
            tracing::error!(incident = incident.id, "error recommending resources: {e}");
            return json!({ "error": format!("Error recommending resources: {e}") });
        }
    };

    if let Some(parsed) = extract_json_object(&reply) {
        tracing::info!(incident = incident.id, "generated resource recommendations");
        return parsed;
    }

    tracing::warn!(
        incident = incident.id,
        "could not parse JSON from AI recommendation, using fallback"
    );
    fallback_recommendation(incident, available)
}

/// Parse the text between the first `{` and the last `}` of `text`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::error!("error parsing AI recommendation JSON: {e}");
            None
        }
    }
}

fn fallback_recommendation(incident: &IncidentRow, available: &[ResourceRow]) -> Value {
    let recommendations: Vec<Value> = available
        .iter()
        .take(3)
        .map(|r| {
            json!({
                "resource_id": r.id,
                "resource_name": r.name,
                "quantity": 1,
                "rationale": "AI-recommended based on incident type",
            })
        })
        .collect();

    json!({
        "recommendations": recommendations,
        "resource_gaps": [GAP_NOTE],
        "priority_level": incident.severity,
    })
}
