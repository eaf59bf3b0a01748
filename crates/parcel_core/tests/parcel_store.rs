use parcel_core::db::open_db_in_memory;
use parcel_core::{Parcel, ParcelRepository, ParcelStatus, RepoError, SqliteParcelStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use std::collections::HashMap;

fn test_parcel() -> Parcel {
    Parcel::new(1000, "test")
}

#[test]
fn add_get_delete_scenario() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);
    let mut parcel = test_parcel();

    let id = store.add(&parcel).unwrap();
    assert!(id > 0);

    let loaded = store.get(id).unwrap();
    parcel.number = id;
    assert_eq!(loaded, parcel);

    store.delete(id).unwrap();

    let err = store.get(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(number) if number == id));
}

#[test]
fn add_get_roundtrip_preserves_every_status_and_address_shape() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);
    let addresses = [
        "",
        "Москва, ул. Льва Толстого, д. 16",
        "line one\nline two",
        "  padded  ",
        "東京都千代田区 🚚",
    ];

    for (client, status) in (1..).zip(ParcelStatus::ALL) {
        for address in addresses {
            let mut parcel = Parcel::new(client, address);
            parcel.status = status;

            let id = store.add(&parcel).unwrap();
            parcel.number = id;

            assert_eq!(store.get(id).unwrap(), parcel);
        }
    }
}

#[test]
fn get_missing_number_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let err = store.get(42).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "parcel not found: 42");
}

#[test]
fn numbers_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let first = store.add(&test_parcel()).unwrap();
    store.delete(first).unwrap();
    let second = store.add(&test_parcel()).unwrap();

    assert!(second > first);
}

#[test]
fn delete_leaves_non_registered_parcel_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let id = store.add(&test_parcel()).unwrap();
    store.set_status(id, ParcelStatus::Sent).unwrap();
    let before = store.get(id).unwrap();

    store.delete(id).unwrap();

    assert_eq!(store.get(id).unwrap(), before);
    assert_eq!(store.delete_if_registered(id).unwrap(), 0);
}

#[test]
fn set_address_updates_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let id = store.add(&test_parcel()).unwrap();
    let new_address = "new test address";
    store.set_address(id, new_address).unwrap();

    assert_eq!(store.get(id).unwrap().address, new_address);
}

#[test]
fn set_address_is_a_silent_noop_once_sent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let id = store.add(&test_parcel()).unwrap();
    store.set_status(id, ParcelStatus::Delivered).unwrap();

    store.set_address(id, "somewhere else").unwrap();

    assert_eq!(store.get(id).unwrap().address, "test");
    assert_eq!(
        store.update_address_if_registered(id, "somewhere else").unwrap(),
        0
    );
}

#[test]
fn set_address_and_delete_on_missing_number_do_not_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    store.set_address(9_999, "nowhere").unwrap();
    store.delete(9_999).unwrap();
}

#[test]
fn set_address_binds_quotes_and_sql_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let id = store.add(&test_parcel()).unwrap();
    let address = "O'Brien st. 5'); DROP TABLE parcel; --";
    store.set_address(id, address).unwrap();

    assert_eq!(store.get(id).unwrap().address, address);
}

#[test]
fn set_status_applies_any_target_regardless_of_prior_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);
    let id = store.add(&test_parcel()).unwrap();

    for status in [
        ParcelStatus::Delivered,
        ParcelStatus::Registered,
        ParcelStatus::Sent,
        ParcelStatus::Registered,
    ] {
        store.set_status(id, status).unwrap();
        assert_eq!(store.get(id).unwrap().status, status);
    }
}

#[test]
fn get_by_client_returns_exactly_that_clients_parcels() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);
    let mut rng = StdRng::from_entropy();
    let client = rng.gen_range(1..10_000_000);

    store.add(&Parcel::new(client + 1, "other client")).unwrap();

    let mut added = HashMap::new();
    for address in ["first", "second", "third"] {
        let mut parcel = Parcel::new(client, address);
        parcel.number = store.add(&parcel).unwrap();
        added.insert(parcel.number, parcel);
    }

    store.add(&Parcel::new(client - 1, "another client")).unwrap();

    let stored = store.get_by_client(client).unwrap();
    assert_eq!(stored.len(), added.len());
    for parcel in &stored {
        assert_eq!(Some(parcel), added.get(&parcel.number));
    }
    assert!(stored.windows(2).all(|pair| pair[0].number < pair[1].number));
}

#[test]
fn get_by_client_without_parcels_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    assert!(store.get_by_client(123).unwrap().is_empty());
}

#[test]
fn unknown_persisted_status_is_reported_as_invalid_data() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        INSERT INTO parcel (client, status, address, created_at)
        VALUES (7, 'lost', 'x', '2024-01-01T00:00:00Z');",
    )
    .unwrap();
    let store = SqliteParcelStore::new(&conn);

    let err = store.get(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("lost")));
}

#[test]
fn missing_table_surfaces_as_storage_error_with_context() {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);

    let err = store.add(&test_parcel()).unwrap_err();
    match &err {
        RepoError::Storage {
            operation, target, ..
        } => {
            assert_eq!(*operation, "add");
            assert_eq!(target, "client 1000");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());

    let err = store.get(5).unwrap_err();
    assert!(matches!(err, RepoError::Storage { operation: "get", .. }));
}
