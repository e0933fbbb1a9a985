use chrono::{Duration, TimeZone, Utc};
use churndesk_core::{
    config::DeskConfig,
    customer::{ChurnScore, CustomerRecord},
    seed::DemoPopulation,
    store::{CustomerStore, JsonFileSource, SnapshotSource},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_store() -> CustomerStore {
    let store = CustomerStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn customer(id: &str, days_ago: i64) -> CustomerRecord {
    let base = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
    let ts = base - Duration::days(days_ago);
    CustomerRecord {
        id:                  id.into(),
        company_name:        format!("{id} Labs"),
        contact_name:        "Rosalind Franklin".into(),
        email:               format!("{id}@labs.example"),
        phone:               None,
        subscription_status: "CANCELLED".into(),
        subscription_plan:   None,
        subscription_amount: 0.0,
        currency:            "EUR".into(),
        net_payment:         -25.0,
        total_unpaid:        0.0,
        churn_score:         ChurnScore::new(88.0),
        billing_address:     Some("Quai 4, Lyon".into()),
        created_at:          ts,
        updated_at:          ts + Duration::hours(3),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The store returns customers newest first, like the data service query.
#[test]
fn sqlite_snapshot_is_newest_first() {
    let store = make_store();
    store
        .insert_customers(&[customer("old", 30), customer("new", 1), customer("mid", 10)])
        .unwrap();

    let snapshot = store.load_snapshot().unwrap();
    let ids: Vec<_> = snapshot.records().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

/// Every field survives the write/read cycle, optional ones included.
#[test]
fn sqlite_preserves_record_fields() {
    let store = make_store();
    let original = customer("keep", 5);
    store.insert_customer(&original).unwrap();

    let loaded = store.get_customer("keep").unwrap().expect("customer present");
    assert_eq!(loaded, original);
    assert!(store.get_customer("missing").unwrap().is_none());
    assert_eq!(store.customer_count().unwrap(), 1);
}

/// Out-of-range scores written by other tools are clamped on read.
#[test]
fn sqlite_read_clamps_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.db");
    let path = path.to_str().unwrap();

    let store = CustomerStore::open(path).unwrap();
    store.migrate().unwrap();
    store.insert_customer(&customer("c", 1)).unwrap();
    drop(store);

    let raw = rusqlite::Connection::open(path).unwrap();
    raw.execute("UPDATE customers SET churn_score = 130 WHERE id = 'c'", []).unwrap();
    drop(raw);

    let store = CustomerStore::open(path).unwrap();
    let c = store.get_customer("c").unwrap().unwrap();
    assert_eq!(c.churn_score.value(), 100.0);
}

/// A score column holding text from another writer does not lose the row
/// or its neighbours: numeric text is parsed, anything else reads as 0.
#[test]
fn sqlite_tolerates_text_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.db");
    let path = path.to_str().unwrap();

    let store = CustomerStore::open(path).unwrap();
    store.migrate().unwrap();
    store
        .insert_customers(&[customer("good", 1), customer("text", 2), customer("junk", 3)])
        .unwrap();
    drop(store);

    let raw = rusqlite::Connection::open(path).unwrap();
    raw.execute("UPDATE customers SET churn_score = '85' WHERE id = 'text'", []).unwrap();
    raw.execute("UPDATE customers SET churn_score = 'n/a', net_payment = 'n/a' WHERE id = 'junk'", [])
        .unwrap();
    drop(raw);

    let snapshot = CustomerStore::open(path).unwrap().load_snapshot().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.get("good").unwrap().churn_score.value(), 88.0);
    assert_eq!(snapshot.get("text").unwrap().churn_score.value(), 85.0);
    let junk = snapshot.get("junk").unwrap();
    assert_eq!(junk.churn_score.value(), 0.0);
    assert_eq!(junk.net_payment, 0.0);
}

/// Duplicate ids abort the whole batch.
#[test]
fn batch_insert_is_atomic() {
    let store = make_store();
    let result = store.insert_customers(&[customer("dup", 1), customer("dup", 2)]);
    assert!(result.is_err());
    assert_eq!(store.customer_count().unwrap(), 0);
}

/// A JSON dump from the data service loads, sorted newest first, with
/// missing optional fields defaulting to None.
#[test]
fn json_source_loads_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    let json = r#"[
        {"id":"a","company_name":"Acme","contact_name":"Wile Coyote","email":"w@acme.example",
         "subscription_status":"ACTIVE","subscription_plan":"Growth","subscription_amount":4800,
         "currency":"USD","net_payment":400,"total_unpaid":0,"churn_score":12,
         "created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-02T00:00:00Z"},
        {"id":"b","company_name":"Globex","contact_name":"Hank Scorpio","email":"h@globex.example",
         "phone":null,"subscription_status":"INACTIVE","subscription_plan":null,"subscription_amount":0,
         "currency":"USD","net_payment":0,"total_unpaid":15.5,"churn_score":-3,
         "billing_address":"1 Cypress Creek","created_at":"2025-03-01T10:00:00+02:00",
         "updated_at":"2025-03-01T10:00:00Z"}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let snapshot = JsonFileSource::new(&path).load_snapshot().unwrap();
    let ids: Vec<_> = snapshot.records().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);

    let acme = snapshot.get("a").unwrap();
    assert!(acme.phone.is_none() && acme.billing_address.is_none());
    assert_eq!(snapshot.get("b").unwrap().churn_score.value(), 0.0);
}

/// Scores sent as text or null, and a no-plan record with null amounts,
/// load alongside well-formed records instead of failing the snapshot.
#[test]
fn json_source_tolerates_loose_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    let json = r#"[
        {"id":"good","company_name":"Acme","contact_name":"Wile Coyote","email":"w@acme.example",
         "subscription_status":"ACTIVE","subscription_plan":"Growth","subscription_amount":4800,
         "currency":"USD","net_payment":400,"total_unpaid":0,"churn_score":12,
         "created_at":"2025-01-04T00:00:00Z","updated_at":"2025-01-04T00:00:00Z"},
        {"id":"text","company_name":"Initech","contact_name":"Bill Lumbergh","email":"b@initech.example",
         "subscription_status":"ACTIVE","subscription_plan":"Starter","subscription_amount":"1200.00",
         "currency":"USD","net_payment":"100.00","total_unpaid":0,"churn_score":"85",
         "created_at":"2025-01-03T00:00:00Z","updated_at":"2025-01-03T00:00:00Z"},
        {"id":"null","company_name":"Hooli","contact_name":"Gavin Belson","email":"g@hooli.example",
         "subscription_status":"ACTIVE","subscription_plan":"Growth","subscription_amount":4800,
         "currency":"USD","net_payment":300,"total_unpaid":0,"churn_score":null,
         "created_at":"2025-01-02T00:00:00Z","updated_at":"2025-01-02T00:00:00Z"},
        {"id":"noplan","company_name":"Vandelay","contact_name":"Art Vandelay","email":"a@vandelay.example",
         "subscription_status":"INACTIVE","subscription_plan":null,"subscription_amount":null,
         "currency":"USD","net_payment":null,"churn_score":"n/a",
         "created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let snapshot = JsonFileSource::new(&path).load_snapshot().unwrap();
    let ids: Vec<_> = snapshot.records().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["good", "text", "null", "noplan"]);

    assert_eq!(snapshot.get("text").unwrap().churn_score.value(), 85.0);
    assert_eq!(snapshot.get("text").unwrap().net_payment, 100.0);
    assert_eq!(snapshot.get("null").unwrap().churn_score.value(), 0.0);

    let noplan = snapshot.get("noplan").unwrap();
    assert!(!noplan.has_subscription());
    assert_eq!(noplan.subscription_amount, 0.0);
    assert_eq!(noplan.net_payment, 0.0);
    assert_eq!(noplan.total_unpaid, 0.0);
    assert_eq!(noplan.churn_score.value(), 0.0);

    let summary = churndesk_core::risk::aggregate(snapshot.records());
    assert_eq!(summary.customer_count, 4);
    assert_eq!(summary.total_revenue, 800.0);
}

/// Missing files surface as errors; the caller decides to fall back.
#[test]
fn json_source_missing_file_is_an_error() {
    let source = JsonFileSource::new("/definitely/not/here.json");
    assert!(source.load_snapshot().is_err());
}

/// Seeding the same store twice from the same seed yields the same snapshot.
#[test]
fn demo_population_round_trips_through_store() {
    let config = DeskConfig::default_test();
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
    let customers = DemoPopulation::generate(2024, &config.demo, now).unwrap();

    let a = make_store();
    let b = make_store();
    a.insert_customers(&customers).unwrap();
    b.insert_customers(&customers).unwrap();

    let snap_a = a.load_snapshot().unwrap();
    let snap_b = b.load_snapshot().unwrap();
    assert_eq!(snap_a.len(), config.demo.population);
    assert_eq!(snap_a.records(), snap_b.records());
    assert!(snap_a.records().windows(2).all(|w| w[0].created_at >= w[1].created_at));
}
