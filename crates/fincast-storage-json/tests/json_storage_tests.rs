use std::sync::Arc;

use chrono::{DateTime, Utc};
use fincast_core::{CoreError, EventLog, EventStore, ViewCollection, ViewStore};
use fincast_domain::{Entry, EntryKind, Event, EventPayload, MonthBucket, MonthKey, MonthlyFinances};
use fincast_storage_json::{JsonEventStore, JsonViewStore};
use tempfile::TempDir;
use uuid::Uuid;

fn at(ms: i64, payload: EventPayload) -> Event {
    Event::new(
        DateTime::<Utc>::from_timestamp_millis(ms).expect("valid millis"),
        payload,
    )
}

#[test]
fn event_store_round_trips_appended_batches() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonEventStore::new(dir.path().join("events.jsonl")).expect("store");

    let request_id = Uuid::new_v4();
    let change_id = Uuid::new_v4();
    store
        .append_events(&[at(1, EventPayload::RequestCreated { request_id })])
        .expect("first append");
    store
        .append_events(&[
            at(2, EventPayload::ChangeCreated { change_id }),
            at(3, EventPayload::ChangePublished { change_id }),
        ])
        .expect("second append");

    let events = store.load_events().expect("load");
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0].payload,
        EventPayload::RequestCreated { request_id }
    );
    assert_eq!(
        events[2].payload,
        EventPayload::ChangePublished { change_id }
    );

    store.clear_events().expect("clear");
    assert!(store.load_events().expect("reload").is_empty());
}

#[test]
fn event_store_rejects_unknown_event_types() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("events.jsonl");
    std::fs::write(
        &path,
        "{\"type\":\"BudgetRebased\",\"timestamp\":1,\"changeId\":\"00000000-0000-0000-0000-000000000000\"}\n",
    )
    .expect("seed file");

    let store = JsonEventStore::new(path).expect("store");
    let err = store.load_events().unwrap_err();
    assert!(matches!(err, CoreError::Serde(_)));
}

#[test]
fn log_backed_by_event_store_replays_on_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("events.jsonl");

    let change_id = Uuid::new_v4();
    {
        let store: Arc<dyn EventStore> =
            Arc::new(JsonEventStore::new(path.clone()).expect("store"));
        let log = EventLog::with_store(store).expect("open log");
        log.append(vec![at(1, EventPayload::ChangeCreated { change_id })])
            .expect("append");
    }

    let store: Arc<dyn EventStore> = Arc::new(JsonEventStore::new(path).expect("store"));
    let log = EventLog::with_store(store).expect("reopen log");
    let events = log.list();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload, EventPayload::ChangeCreated { change_id });
}

fn sample_finances(change_id: Uuid) -> MonthlyFinances {
    let mut bucket = MonthBucket::default();
    bucket.push(Entry {
        amount: 500.0,
        description: "Salary".into(),
        kind: EntryKind::Income,
        change_id,
    });
    bucket.push(Entry {
        amount: 120.0,
        description: "Rent".into(),
        kind: EntryKind::Expense,
        change_id,
    });
    let mut finances = MonthlyFinances::new();
    finances.insert(MonthKey::new(2025, 1), bucket);
    finances
}

#[test]
fn view_store_round_trips_and_overwrites_blobs() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonViewStore::new(dir.path().to_path_buf()).expect("store");

    let key = Uuid::new_v4();
    let finances = sample_finances(key);
    store
        .put(ViewCollection::CumulativeFinances, key, &finances)
        .expect("put");

    let loaded = store
        .get(ViewCollection::CumulativeFinances, key)
        .expect("get")
        .expect("entry present");
    assert_eq!(loaded, finances);
    assert_eq!(loaded.get(&MonthKey::new(2025, 1)).unwrap().net, 380.0);

    // Overwrite with an empty projection; no merging with the old blob.
    store
        .put(ViewCollection::CumulativeFinances, key, &MonthlyFinances::new())
        .expect("overwrite");
    let loaded = store
        .get(ViewCollection::CumulativeFinances, key)
        .expect("get")
        .expect("entry present");
    assert!(loaded.is_empty());
}

#[test]
fn view_store_collections_are_isolated() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonViewStore::new(dir.path().to_path_buf()).expect("store");

    let key = Uuid::new_v4();
    store
        .put(ViewCollection::IncomesExpenses, key, &sample_finances(key))
        .expect("put");

    assert!(store
        .get(ViewCollection::CumulativeFinances, key)
        .expect("get")
        .is_none());
    assert_eq!(store.keys(ViewCollection::IncomesExpenses).expect("keys"), vec![key]);
    assert!(store
        .keys(ViewCollection::CumulativeFinances)
        .expect("keys")
        .is_empty());

    store.clear(ViewCollection::IncomesExpenses).expect("clear");
    assert!(store
        .get(ViewCollection::IncomesExpenses, key)
        .expect("get")
        .is_none());
}

#[test]
fn missing_view_reads_as_none() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonViewStore::new(dir.path().to_path_buf()).expect("store");
    assert!(store
        .get(ViewCollection::IncomesExpenses, Uuid::new_v4())
        .expect("get")
        .is_none());
}
