use rusqlite::Connection;

use super::DbError;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    first_name  TEXT,
    last_name   TEXT,
    role        TEXT NOT NULL DEFAULT 'community_member',
    phone       TEXT,
    location    TEXT,
    skills      TEXT,
    created_at  TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE incidents (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    incident_type   TEXT NOT NULL,
    severity        TEXT NOT NULL DEFAULT 'medium',
    status          TEXT NOT NULL DEFAULT 'reported',
    latitude        REAL NOT NULL,
    longitude       REAL NOT NULL,
    address         TEXT,
    people_affected INTEGER NOT NULL DEFAULT 0,
    reporter_id     INTEGER NOT NULL REFERENCES users(id),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    resolved_at     TEXT,
    ai_analysis     TEXT
);

CREATE TABLE incident_updates (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id INTEGER NOT NULL REFERENCES incidents(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    update_text TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE resources (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    resource_type   TEXT NOT NULL,
    quantity        INTEGER NOT NULL DEFAULT 1,
    location        TEXT,
    latitude        REAL,
    longitude       REAL,
    status          TEXT NOT NULL DEFAULT 'available',
    description     TEXT,
    contributor_id  INTEGER REFERENCES users(id),
    contact_info    TEXT,
    is_verified     INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE resource_allocations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id   INTEGER NOT NULL REFERENCES resources(id),
    incident_id   INTEGER NOT NULL REFERENCES incidents(id),
    responder_id  INTEGER REFERENCES users(id),
    quantity      INTEGER NOT NULL DEFAULT 1,
    status        TEXT NOT NULL DEFAULT 'allocated',
    allocated_at  TEXT NOT NULL,
    notes         TEXT
);
"#,
    },
    Migration {
        version: 2,
        sql: r#"
CREATE INDEX idx_incidents_status ON incidents(status, updated_at);
CREATE INDEX idx_incident_updates_incident ON incident_updates(incident_id, created_at);
CREATE INDEX idx_resources_status ON resources(status);
CREATE INDEX idx_allocations_incident ON resource_allocations(incident_id);
"#,
    },
];

pub(super) fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL
        );",
    )?;

    let applied: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT version FROM _migrations ORDER BY version")?;
        let result = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        result
    };

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!("applying migration v{}", migration.version);

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|e| DbError::Migration(format!("v{}: {e}", migration.version)))?;
        tx.execute(
            "INSERT INTO _migrations (version, applied_at) VALUES (?1, datetime('now'))",
            rusqlite::params![migration.version],
        )?;
        tx.commit()?;
    }

    Ok(())
}
