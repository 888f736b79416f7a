//! Database operations unit tests

use pretty_assertions::assert_eq;

use super::queries::{self, NewAllocation, NewIncident, NewResource, NewUser, ProfileUpdate};
use super::{Database, DbError};

const NOW: &str = "2026-10-18T09:00:00+00:00";
const LATER: &str = "2026-10-18T10:30:00+00:00";

fn user(db: &Database, username: &str) -> i64 {
    queries::insert_user(
        db,
        &NewUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            first_name: None,
            last_name: None,
            role: "responder".to_string(),
            phone: None,
            location: None,
            skills: None,
        },
        NOW,
    )
    .unwrap()
    .id
}

fn incident(db: &Database, reporter_id: i64, severity: &str) -> i64 {
    queries::insert_incident(
        db,
        &NewIncident {
            title: "River overflow".to_string(),
            description: "Water over the east bank road".to_string(),
            incident_type: "flood".to_string(),
            severity: severity.to_string(),
            latitude: 12.5,
            longitude: -70.1,
            address: None,
            people_affected: 40,
            reporter_id,
        },
        NOW,
    )
    .unwrap()
    .id
}

fn resource(db: &Database, quantity: i64, coords: bool) -> i64 {
    queries::insert_resource(
        db,
        &NewResource {
            name: "Water bottles".to_string(),
            resource_type: "water".to_string(),
            quantity,
            location: Some("Depot 4".to_string()),
            latitude: coords.then_some(12.4),
            longitude: coords.then_some(-70.0),
            description: None,
            contributor_id: None,
            contact_info: None,
        },
        NOW,
    )
    .unwrap()
    .id
}

#[test]
fn test_incident_round_trip_includes_reporter() {
    let db = Database::open_in_memory().expect("in-memory DB");
    let reporter = user(&db, "maria");
    let id = incident(&db, reporter, "high");

    let row = queries::get_incident(&db, id).unwrap().expect("incident");
    assert_eq!(row.status, "reported");
    assert_eq!(row.reporter_username.as_deref(), Some("maria"));
    assert_eq!(row.location_label(), "12.5, -70.1");
    assert!(row.resolved_at.is_none());

    queries::set_incident_analysis(&db, id, "Deploy pumps", LATER).unwrap();
    let row = queries::get_incident(&db, id).unwrap().unwrap();
    assert_eq!(row.ai_analysis.as_deref(), Some("Deploy pumps"));
    assert_eq!(row.updated_at, LATER);
}

#[test]
fn test_incident_requires_known_reporter() {
    let db = Database::open_in_memory().unwrap();
    let err = queries::insert_incident(
        &db,
        &NewIncident {
            title: "Ghost".to_string(),
            description: "No reporter".to_string(),
            incident_type: "fire".to_string(),
            severity: "low".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            address: None,
            people_affected: 0,
            reporter_id: 999,
        },
        NOW,
    )
    .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
}

#[test]
fn test_duplicate_username_is_conflict() {
    let db = Database::open_in_memory().unwrap();
    user(&db, "sam");
    let err = queries::insert_user(
        &db,
        &NewUser {
            username: "sam".to_string(),
            email: "other@example.org".to_string(),
            first_name: None,
            last_name: None,
            role: "volunteer".to_string(),
            phone: None,
            location: None,
            skills: None,
        },
        NOW,
    )
    .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
}

#[test]
fn test_status_update_stamps_resolution() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "li");
    let id = incident(&db, reporter, "medium");

    let previous = queries::update_incident_status(&db, id, "in_progress", NOW).unwrap();
    assert_eq!(previous, "reported");
    assert!(queries::get_incident(&db, id).unwrap().unwrap().resolved_at.is_none());

    let previous = queries::update_incident_status(&db, id, "resolved", LATER).unwrap();
    assert_eq!(previous, "in_progress");
    let row = queries::get_incident(&db, id).unwrap().unwrap();
    assert_eq!(row.status, "resolved");
    assert_eq!(row.resolved_at.as_deref(), Some(LATER));

    let missing = queries::update_incident_status(&db, 404, "resolved", LATER).unwrap_err();
    assert!(matches!(missing, DbError::NotFound(_)));
}

#[test]
fn test_updates_listed_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "ana");
    let id = incident(&db, reporter, "low");

    queries::insert_incident_update(&db, id, reporter, "Road closed", NOW).unwrap();
    let second = queries::insert_incident_update(&db, id, reporter, "Water receding", LATER).unwrap();
    assert_eq!(second.username.as_deref(), Some("ana"));

    let updates = queries::list_updates_for_incident(&db, id).unwrap();
    let texts: Vec<_> = updates.iter().map(|u| u.update_text.as_str()).collect();
    assert_eq!(texts, vec!["Water receding", "Road closed"]);
}

#[test]
fn test_recorded_update_changes_status_only_when_different() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "ines");
    let id = incident(&db, reporter, "high");

    let first = queries::record_incident_update(&db, id, reporter, "Crews dispatched", Some("in_progress"), NOW).unwrap();
    assert_eq!(first.update.update_text, "Crews dispatched");
    assert_eq!(first.previous_status.as_deref(), Some("reported"));

    let again = queries::record_incident_update(&db, id, reporter, "Still pumping", Some("in_progress"), LATER).unwrap();
    assert!(again.previous_status.is_none());

    let note = queries::record_incident_update(&db, id, reporter, "Shift change", None, LATER).unwrap();
    assert!(note.previous_status.is_none());

    assert_eq!(queries::get_incident(&db, id).unwrap().unwrap().status, "in_progress");
    assert_eq!(queries::list_updates_for_incident(&db, id).unwrap().len(), 3);

    let missing = queries::record_incident_update(&db, 404, reporter, "Ghost", Some("resolved"), LATER).unwrap_err();
    assert!(matches!(missing, DbError::NotFound(_)));
}

#[test]
fn test_failed_status_change_discards_the_note() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "omar");
    let id = incident(&db, reporter, "medium");
    db.conn()
        .execute_batch(
            "CREATE TRIGGER lock_status BEFORE UPDATE OF status ON incidents \
             BEGIN SELECT RAISE(ABORT, 'status locked'); END;",
        )
        .unwrap();

    let result = queries::record_incident_update(&db, id, reporter, "Evacuated", Some("resolved"), LATER);

    assert!(result.is_err());
    assert!(queries::list_updates_for_incident(&db, id).unwrap().is_empty());
    assert_eq!(queries::get_incident(&db, id).unwrap().unwrap().status, "reported");
}

#[test]
fn test_profile_update_replaces_fields() {
    let db = Database::open_in_memory().unwrap();
    let id = user(&db, "rosa");

    let updated = queries::update_user(
        &db,
        id,
        &ProfileUpdate {
            first_name: Some("Rosa".to_string()),
            last_name: Some("Diaz".to_string()),
            phone: Some("555-0100".to_string()),
            location: None,
            skills: Some("first aid, radio".to_string()),
        },
    )
    .unwrap();
    assert_eq!(updated.full_name(), "Rosa Diaz");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert_eq!(updated.username, "rosa");

    let cleared = queries::update_user(&db, id, &ProfileUpdate::default()).unwrap();
    assert!(cleared.skills.is_none());
    assert_eq!(cleared.full_name(), "rosa");

    let missing = queries::update_user(&db, 999, &ProfileUpdate::default()).unwrap_err();
    assert!(matches!(missing, DbError::NotFound(_)));
}

#[test]
fn test_allocation_decrements_and_depletes() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "kofi");
    let incident_id = incident(&db, reporter, "critical");
    let resource_id = resource(&db, 5, true);

    let outcome = queries::allocate_resource(
        &db,
        &NewAllocation {
            resource_id,
            incident_id,
            responder_id: Some(reporter),
            quantity: 3,
            notes: None,
        },
        NOW,
    )
    .unwrap();
    assert_eq!(outcome.resource.quantity, 2);
    assert_eq!(outcome.resource.status, "available");
    assert_eq!(outcome.allocation.resource_name.as_deref(), Some("Water bottles"));

    let outcome = queries::allocate_resource(
        &db,
        &NewAllocation {
            resource_id,
            incident_id,
            responder_id: None,
            quantity: 2,
            notes: Some("last of it".to_string()),
        },
        LATER,
    )
    .unwrap();
    assert_eq!(outcome.resource.quantity, 0);
    assert_eq!(outcome.resource.status, "depleted");
    assert_eq!(outcome.previous_resource_status, "available");

    assert!(queries::list_available_resources(&db, false).unwrap().is_empty());
    assert_eq!(queries::list_allocations_for_incident(&db, incident_id).unwrap().len(), 2);
}

#[test]
fn test_over_allocation_is_rejected_without_side_effects() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "ines");
    let incident_id = incident(&db, reporter, "high");
    let resource_id = resource(&db, 2, false);

    let err = queries::allocate_resource(
        &db,
        &NewAllocation {
            resource_id,
            incident_id,
            responder_id: None,
            quantity: 3,
            notes: None,
        },
        NOW,
    )
    .unwrap_err();
    match err {
        DbError::Conflict(message) => {
            assert_eq!(message, "Not enough Water bottles available. Only 2 units left.")
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let row = queries::get_resource(&db, resource_id).unwrap().unwrap();
    assert_eq!(row.quantity, 2);
    assert!(queries::list_allocations_for_incident(&db, incident_id).unwrap().is_empty());

    let missing = queries::allocate_resource(
        &db,
        &NewAllocation {
            resource_id,
            incident_id: 77,
            responder_id: None,
            quantity: 1,
            notes: None,
        },
        NOW,
    )
    .unwrap_err();
    assert!(matches!(missing, DbError::NotFound(_)));
}

#[test]
fn test_map_listing_requires_coordinates() {
    let db = Database::open_in_memory().unwrap();
    resource(&db, 1, true);
    resource(&db, 1, false);

    assert_eq!(queries::list_available_resources(&db, false).unwrap().len(), 2);
    assert_eq!(queries::list_available_resources(&db, true).unwrap().len(), 1);
}

#[test]
fn test_stats_group_by_status_and_severity() {
    let db = Database::open_in_memory().unwrap();
    let reporter = user(&db, "dev");
    let a = incident(&db, reporter, "high");
    incident(&db, reporter, "high");
    incident(&db, reporter, "low");
    queries::update_incident_status(&db, a, "resolved", LATER).unwrap();
    let r = resource(&db, 4, false);
    queries::verify_resource(&db, r, NOW).unwrap();
    resource(&db, 6, false);

    let stats = queries::incident_stats(&db).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.people_affected, 120);
    assert_eq!(stats.by_status.get("reported"), Some(&2));
    assert_eq!(stats.by_status.get("resolved"), Some(&1));
    assert_eq!(stats.by_severity.get("high"), Some(&2));

    let resources = queries::resource_stats(&db).unwrap();
    assert_eq!(resources.total, 2);
    assert_eq!(resources.available_units, 10);
    assert_eq!(resources.unverified, 1);
    assert_eq!(resources.allocations, 0);
}

#[test]
fn test_on_disk_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crisisconnect.db");

    let id = {
        let db = Database::open(&path).unwrap();
        let reporter = user(&db, "persist");
        incident(&db, reporter, "medium")
    };

    let db = Database::open(&path).unwrap();
    let row = queries::get_incident(&db, id).unwrap().expect("incident after reopen");
    assert_eq!(row.title, "River overflow");
}
