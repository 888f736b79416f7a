use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{Database, DbError};

// ---------------------------------------------------------------------------
// Row types: flat structs that map directly to table columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub created_at: String,
    pub is_active: bool,
}

impl UserRow {
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
}

/// Editable profile fields. Each one replaces the stored value; `None`
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub incident_type: String,
    pub severity: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub people_affected: i64,
    pub reporter_id: i64,
    pub reporter_username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
    pub ai_analysis: Option<String>,
}

impl IncidentRow {
    /// Street address if known, otherwise `"lat, lng"`.
    pub fn location_label(&self) -> String {
        match self.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => format!("{}, {}", self.latitude, self.longitude),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub incident_type: String,
    pub severity: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub people_affected: i64,
    pub reporter_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentUpdateRow {
    pub id: i64,
    pub incident_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub update_text: String,
    pub created_at: String,
}

/// A committed progress note. `previous_status` is set only when the note
/// also changed the incident's status.
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub update: IncidentUpdateRow,
    pub previous_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceRow {
    pub id: i64,
    pub name: String,
    pub resource_type: String,
    pub quantity: i64,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub description: Option<String>,
    pub contributor_id: Option<i64>,
    pub contributor_username: Option<String>,
    pub contact_info: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub resource_type: String,
    pub quantity: i64,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub contributor_id: Option<i64>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationRow {
    pub id: i64,
    pub resource_id: i64,
    pub resource_name: Option<String>,
    pub incident_id: i64,
    pub responder_id: Option<i64>,
    pub quantity: i64,
    pub status: String,
    pub allocated_at: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub resource_id: i64,
    pub incident_id: i64,
    pub responder_id: Option<i64>,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Result of a committed allocation: the new row plus the resource as it
/// stands afterwards.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocation: AllocationRow,
    pub resource: ResourceRow,
    pub previous_resource_status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncidentStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_severity: BTreeMap<String, i64>,
    pub people_affected: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub available_units: i64,
    pub unverified: i64,
    pub allocations: i64,
}

// ---------------------------------------------------------------------------
// Column lists and row mappers
// ---------------------------------------------------------------------------

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, phone, location, skills, created_at, is_active";

const INCIDENT_SELECT: &str = "SELECT i.id, i.title, i.description, i.incident_type, i.severity, i.status, \
     i.latitude, i.longitude, i.address, i.people_affected, i.reporter_id, u.username, \
     i.created_at, i.updated_at, i.resolved_at, i.ai_analysis \
     FROM incidents i LEFT JOIN users u ON u.id = i.reporter_id";

const UPDATE_SELECT: &str = "SELECT iu.id, iu.incident_id, iu.user_id, u.username, iu.update_text, iu.created_at \
     FROM incident_updates iu LEFT JOIN users u ON u.id = iu.user_id";

const RESOURCE_SELECT: &str = "SELECT r.id, r.name, r.resource_type, r.quantity, r.location, r.latitude, \
     r.longitude, r.status, r.description, r.contributor_id, u.username, r.contact_info, \
     r.is_verified, r.created_at, r.updated_at \
     FROM resources r LEFT JOIN users u ON u.id = r.contributor_id";

const ALLOCATION_SELECT: &str = "SELECT a.id, a.resource_id, r.name, a.incident_id, a.responder_id, a.quantity, \
     a.status, a.allocated_at, a.notes \
     FROM resource_allocations a LEFT JOIN resources r ON r.id = a.resource_id";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: row.get(5)?,
        phone: row.get(6)?,
        location: row.get(7)?,
        skills: row.get(8)?,
        created_at: row.get(9)?,
        is_active: row.get(10)?,
    })
}

fn incident_from_row(row: &Row<'_>) -> rusqlite::Result<IncidentRow> {
    Ok(IncidentRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        incident_type: row.get(3)?,
        severity: row.get(4)?,
        status: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        address: row.get(8)?,
        people_affected: row.get(9)?,
        reporter_id: row.get(10)?,
        reporter_username: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        resolved_at: row.get(14)?,
        ai_analysis: row.get(15)?,
    })
}

fn update_from_row(row: &Row<'_>) -> rusqlite::Result<IncidentUpdateRow> {
    Ok(IncidentUpdateRow {
        id: row.get(0)?,
        incident_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        update_text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceRow> {
    Ok(ResourceRow {
        id: row.get(0)?,
        name: row.get(1)?,
        resource_type: row.get(2)?,
        quantity: row.get(3)?,
        location: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        status: row.get(7)?,
        description: row.get(8)?,
        contributor_id: row.get(9)?,
        contributor_username: row.get(10)?,
        contact_info: row.get(11)?,
        is_verified: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn allocation_from_row(row: &Row<'_>) -> rusqlite::Result<AllocationRow> {
    Ok(AllocationRow {
        id: row.get(0)?,
        resource_id: row.get(1)?,
        resource_name: row.get(2)?,
        incident_id: row.get(3)?,
        responder_id: row.get(4)?,
        quantity: row.get(5)?,
        status: row.get(6)?,
        allocated_at: row.get(7)?,
        notes: row.get(8)?,
    })
}

/// Map SQLite constraint failures (duplicate username, dangling foreign key)
/// to `Conflict` so callers can answer 409 instead of 500.
fn constraint_to_conflict(err: rusqlite::Error, what: &str) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(code, ref message)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Conflict(format!(
                "{what}: {}",
                message.clone().unwrap_or_else(|| "constraint violation".to_string())
            ))
        }
        other => DbError::Sqlite(other),
    }
}

// ---------------------------------------------------------------------------
// User queries
// ---------------------------------------------------------------------------

pub fn insert_user(db: &Database, new: &NewUser, now: &str) -> Result<UserRow, DbError> {
    let id = {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO users (username, email, first_name, last_name, role, phone, location, skills, created_at, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1)",
            params![
                new.username,
                new.email,
                new.first_name,
                new.last_name,
                new.role,
                new.phone,
                new.location,
                new.skills,
                now
            ],
        )
        .map_err(|e| constraint_to_conflict(e, "user already exists"))?;
        conn.last_insert_rowid()
    };
    get_user(db, id)?.ok_or_else(|| DbError::NotFound(format!("user {id}")))
}

pub fn get_user(db: &Database, id: i64) -> Result<Option<UserRow>, DbError> {
    let conn = db.conn();
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn list_users(db: &Database) -> Result<Vec<UserRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
    let rows = stmt
        .query_map([], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_user(db: &Database, id: i64, profile: &ProfileUpdate) -> Result<UserRow, DbError> {
    let changed = db.conn().execute(
        "UPDATE users SET first_name = ?1, last_name = ?2, phone = ?3, location = ?4, skills = ?5 WHERE id = ?6",
        params![
            profile.first_name,
            profile.last_name,
            profile.phone,
            profile.location,
            profile.skills,
            id
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("user {id}")));
    }
    get_user(db, id)?.ok_or_else(|| DbError::NotFound(format!("user {id}")))
}

// ---------------------------------------------------------------------------
// Incident queries
// ---------------------------------------------------------------------------

pub fn insert_incident(db: &Database, new: &NewIncident, now: &str) -> Result<IncidentRow, DbError> {
    let id = {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO incidents (title, description, incident_type, severity, status, latitude, longitude, \
             address, people_affected, reporter_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, 'reported', ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                new.title,
                new.description,
                new.incident_type,
                new.severity,
                new.latitude,
                new.longitude,
                new.address,
                new.people_affected,
                new.reporter_id,
                now
            ],
        )
        .map_err(|e| constraint_to_conflict(e, "unknown reporter"))?;
        conn.last_insert_rowid()
    };
    get_incident(db, id)?.ok_or_else(|| DbError::NotFound(format!("incident {id}")))
}

pub fn get_incident(db: &Database, id: i64) -> Result<Option<IncidentRow>, DbError> {
    let conn = db.conn();
    let row = conn
        .query_row(
            &format!("{INCIDENT_SELECT} WHERE i.id = ?1"),
            params![id],
            incident_from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn list_incidents(db: &Database) -> Result<Vec<IncidentRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!("{INCIDENT_SELECT} ORDER BY i.created_at DESC, i.id DESC"))?;
    let rows = stmt
        .query_map([], incident_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_incident_analysis(
    db: &Database,
    id: i64,
    analysis: &str,
    now: &str,
) -> Result<(), DbError> {
    let conn = db.conn();
    let changed = conn.execute(
        "UPDATE incidents SET ai_analysis = ?1, updated_at = ?2 WHERE id = ?3",
        params![analysis, now, id],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("incident {id}")));
    }
    Ok(())
}

/// Set an incident's status, stamping `resolved_at` when it becomes
/// `resolved`. Returns the previous status.
pub fn update_incident_status(
    db: &Database,
    id: i64,
    status: &str,
    now: &str,
) -> Result<String, DbError> {
    let conn = db.conn();
    let tx = conn.unchecked_transaction()?;
    let previous = write_incident_status(&tx, id, status, now)?;
    tx.commit()?;
    Ok(previous)
}

fn incident_status(conn: &Connection, id: i64) -> Result<String, DbError> {
    conn.query_row(
        "SELECT status FROM incidents WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("incident {id}")))
}

fn write_incident_status(
    conn: &Connection,
    id: i64,
    status: &str,
    now: &str,
) -> Result<String, DbError> {
    let previous = incident_status(conn, id)?;
    let resolved_at = if status == "resolved" { Some(now) } else { None };
    conn.execute(
        "UPDATE incidents SET status = ?1, updated_at = ?2, resolved_at = COALESCE(?3, resolved_at) WHERE id = ?4",
        params![status, now, resolved_at, id],
    )?;
    Ok(previous)
}

pub fn incident_stats(db: &Database) -> Result<IncidentStats, DbError> {
    let conn = db.conn();
    let mut stats = IncidentStats::default();

    let mut stmt = conn.prepare("SELECT status, COUNT(*), COALESCE(SUM(people_affected), 0) FROM incidents GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
    })?;
    for row in rows {
        let (status, count, people) = row?;
        stats.total += count;
        stats.people_affected += people;
        stats.by_status.insert(status, count);
    }

    let mut stmt = conn.prepare("SELECT severity, COUNT(*) FROM incidents GROUP BY severity")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (severity, count) = row?;
        stats.by_severity.insert(severity, count);
    }

    Ok(stats)
}

// ---------------------------------------------------------------------------
// Incident update queries
// ---------------------------------------------------------------------------

pub fn insert_incident_update(
    db: &Database,
    incident_id: i64,
    user_id: i64,
    update_text: &str,
    now: &str,
) -> Result<IncidentUpdateRow, DbError> {
    let conn = db.conn();
    write_incident_update(&conn, incident_id, user_id, update_text, now)
}

fn write_incident_update(
    conn: &Connection,
    incident_id: i64,
    user_id: i64,
    update_text: &str,
    now: &str,
) -> Result<IncidentUpdateRow, DbError> {
    conn.execute(
        "INSERT INTO incident_updates (incident_id, user_id, update_text, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![incident_id, user_id, update_text, now],
    )
    .map_err(|e| constraint_to_conflict(e, "unknown incident or user"))?;
    let id = conn.last_insert_rowid();
    let row = conn.query_row(
        &format!("{UPDATE_SELECT} WHERE iu.id = ?1"),
        params![id],
        update_from_row,
    )?;
    Ok(row)
}

/// Add a progress note and, when `new_status` differs from the current one,
/// move the incident to it. Both writes commit together or not at all.
pub fn record_incident_update(
    db: &Database,
    incident_id: i64,
    user_id: i64,
    update_text: &str,
    new_status: Option<&str>,
    now: &str,
) -> Result<RecordedUpdate, DbError> {
    let conn = db.conn();
    let tx = conn.unchecked_transaction()?;
    let current = incident_status(&tx, incident_id)?;
    let update = write_incident_update(&tx, incident_id, user_id, update_text, now)?;
    let previous_status = match new_status {
        Some(status) if status != current => {
            Some(write_incident_status(&tx, incident_id, status, now)?)
        }
        _ => None,
    };
    tx.commit()?;
    Ok(RecordedUpdate {
        update,
        previous_status,
    })
}

pub fn list_updates_for_incident(
    db: &Database,
    incident_id: i64,
) -> Result<Vec<IncidentUpdateRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!(
        "{UPDATE_SELECT} WHERE iu.incident_id = ?1 ORDER BY iu.created_at DESC, iu.id DESC"
    ))?;
    let rows = stmt
        .query_map(params![incident_id], update_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Resource queries
// ---------------------------------------------------------------------------

pub fn insert_resource(db: &Database, new: &NewResource, now: &str) -> Result<ResourceRow, DbError> {
    let id = {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO resources (name, resource_type, quantity, location, latitude, longitude, status, \
             description, contributor_id, contact_info, is_verified, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'available', ?7, ?8, ?9, 0, ?10, ?10)",
            params![
                new.name,
                new.resource_type,
                new.quantity,
                new.location,
                new.latitude,
                new.longitude,
                new.description,
                new.contributor_id,
                new.contact_info,
                now
            ],
        )
        .map_err(|e| constraint_to_conflict(e, "unknown contributor"))?;
        conn.last_insert_rowid()
    };
    get_resource(db, id)?.ok_or_else(|| DbError::NotFound(format!("resource {id}")))
}

pub fn get_resource(db: &Database, id: i64) -> Result<Option<ResourceRow>, DbError> {
    let conn = db.conn();
    let row = conn
        .query_row(
            &format!("{RESOURCE_SELECT} WHERE r.id = ?1"),
            params![id],
            resource_from_row,
        )
        .optional()?;
    Ok(row)
}

/// Resources with status `available`, optionally only those that have
/// coordinates (for the map).
pub fn list_available_resources(
    db: &Database,
    require_coordinates: bool,
) -> Result<Vec<ResourceRow>, DbError> {
    let conn = db.conn();
    let filter = if require_coordinates {
        "WHERE r.status = 'available' AND r.latitude IS NOT NULL AND r.longitude IS NOT NULL"
    } else {
        "WHERE r.status = 'available'"
    };
    let mut stmt = conn.prepare(&format!("{RESOURCE_SELECT} {filter} ORDER BY r.id"))?;
    let rows = stmt
        .query_map([], resource_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn verify_resource(db: &Database, id: i64, now: &str) -> Result<ResourceRow, DbError> {
    let changed = {
        let conn = db.conn();
        conn.execute(
            "UPDATE resources SET is_verified = 1, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?
    };
    if changed == 0 {
        return Err(DbError::NotFound(format!("resource {id}")));
    }
    get_resource(db, id)?.ok_or_else(|| DbError::NotFound(format!("resource {id}")))
}

pub fn resource_stats(db: &Database) -> Result<ResourceStats, DbError> {
    let conn = db.conn();
    let mut stats = ResourceStats::default();

    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM resources GROUP BY status")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (status, count) = row?;
        stats.total += count;
        stats.by_status.insert(status, count);
    }

    stats.available_units = conn.query_row(
        "SELECT COALESCE(SUM(quantity), 0) FROM resources WHERE status = 'available'",
        [],
        |row| row.get(0),
    )?;
    stats.unverified = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE is_verified = 0",
        [],
        |row| row.get(0),
    )?;
    stats.allocations = conn.query_row("SELECT COUNT(*) FROM resource_allocations", [], |row| {
        row.get(0)
    })?;

    Ok(stats)
}

// ---------------------------------------------------------------------------
// Allocation queries
// ---------------------------------------------------------------------------

/// Allocate part of a resource to an incident in one transaction.
///
/// Fails with `NotFound` for a missing resource or incident and `Conflict`
/// when fewer units remain than requested. A resource whose quantity reaches
/// zero is marked `depleted`.
pub fn allocate_resource(
    db: &Database,
    new: &NewAllocation,
    now: &str,
) -> Result<AllocationOutcome, DbError> {
    let (allocation_id, previous_resource_status) = {
        let conn = db.conn();
        let tx = conn.unchecked_transaction()?;

        let (name, remaining, previous_status): (String, i64, String) = tx
            .query_row(
                "SELECT name, quantity, status FROM resources WHERE id = ?1",
                params![new.resource_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("resource {}", new.resource_id)))?;

        let incident_exists = tx
            .query_row(
                "SELECT 1 FROM incidents WHERE id = ?1",
                params![new.incident_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !incident_exists {
            return Err(DbError::NotFound(format!("incident {}", new.incident_id)));
        }

        if remaining < new.quantity {
            return Err(DbError::Conflict(format!(
                "Not enough {name} available. Only {remaining} units left."
            )));
        }

        tx.execute(
            "INSERT INTO resource_allocations (resource_id, incident_id, responder_id, quantity, status, allocated_at, notes) \
             VALUES (?1, ?2, ?3, ?4, 'allocated', ?5, ?6)",
            params![
                new.resource_id,
                new.incident_id,
                new.responder_id,
                new.quantity,
                now,
                new.notes
            ],
        )
        .map_err(|e| constraint_to_conflict(e, "unknown responder"))?;
        let allocation_id = tx.last_insert_rowid();

        let left = remaining - new.quantity;
        let status = if left <= 0 { "depleted" } else { previous_status.as_str() };
        tx.execute(
            "UPDATE resources SET quantity = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            params![left, status, now, new.resource_id],
        )?;
        tracing::debug!(resource = new.resource_id, remaining = left, "resource allocated");
        tx.commit()?;
        (allocation_id, previous_status)
    };

    let allocation = {
        let conn = db.conn();
        conn.query_row(
            &format!("{ALLOCATION_SELECT} WHERE a.id = ?1"),
            params![allocation_id],
            allocation_from_row,
        )?
    };
    let resource = get_resource(db, new.resource_id)?
        .ok_or_else(|| DbError::NotFound(format!("resource {}", new.resource_id)))?;

    Ok(AllocationOutcome {
        allocation,
        resource,
        previous_resource_status,
    })
}

pub fn list_allocations_for_incident(
    db: &Database,
    incident_id: i64,
) -> Result<Vec<AllocationRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!(
        "{ALLOCATION_SELECT} WHERE a.incident_id = ?1 ORDER BY a.allocated_at DESC, a.id DESC"
    ))?;
    let rows = stmt
        .query_map(params![incident_id], allocation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
