//! End-to-end checks of the audit trail through the library API

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use bizdesk::audit::{redact, REDACTED};
use bizdesk::auth::{NoActor, Principal, SessionActor};
use bizdesk::config::{BizdeskPaths, Settings};
use bizdesk::events::LifecycleEvent;
use bizdesk::models::{
    Client, ClientId, Entity, EntityKind, EntityRef, Invoice, Money, Product, Quote, Ticket, User,
    WebOrder,
};
use bizdesk::storage::{ActivityQuery, Storage};

fn open_storage(temp_dir: &TempDir) -> Storage {
    let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
    Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap()
}

fn history<E: Entity>(storage: &Storage, entity: &E) -> Vec<bizdesk::audit::AuditRecord> {
    storage.activity.for_subject(entity.key()).unwrap()
}

#[test]
fn client_email_change_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_storage(&temp_dir);

    let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
    let mut edited = client.clone();
    edited.email = "b@x.com".into();
    edited.updated_at = chrono::Utc::now() + chrono::Duration::seconds(5);
    storage.update(edited).unwrap();

    let updates = storage
        .activity
        .query(&ActivityQuery::new().event(LifecycleEvent::Updated))
        .unwrap();
    assert_eq!(updates.len(), 1);

    let record = &updates[0];
    assert_eq!(record.log_name, "client");
    assert_eq!(record.event, LifecycleEvent::Updated);
    assert_eq!(
        serde_json::to_value(&record.properties).unwrap(),
        json!({
            "attributes": {"email": "b@x.com"},
            "old": {"email": "a@x.com"},
        })
    );
}

#[test]
fn every_generic_kind_logs_its_creation() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_storage(&temp_dir);

    let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
    let user = storage
        .create(User::new("Sam", "sam@x.com", "$argon2id$v=19$m=19456,t=2,p=1$abc$def"))
        .unwrap();
    let product = storage
        .create(Product::new("SKU-1", "Widget", Money::from_cents(500)))
        .unwrap();
    let order = storage
        .create(WebOrder::new("WEB-1", client.id, Money::from_cents(500)))
        .unwrap();
    let ticket = storage.create(Ticket::new(client.id, "Help", None)).unwrap();

    fn check<E: Entity>(storage: &Storage, entity: &E) {
        let records = history(storage, entity);
        assert_eq!(records.len(), 1, "{} should have one record", E::KIND);
        assert_eq!(records[0].event, LifecycleEvent::Created);
        assert_eq!(records[0].log_name, E::KIND.log_name());
        assert_eq!(
            records[0].properties.attributes.as_ref().unwrap(),
            &redact(entity.attributes().unwrap())
        );
        assert!(records[0].properties.old.is_none());
    }

    check(&storage, &client);
    check(&storage, &user);
    check(&storage, &product);
    check(&storage, &order);
    check(&storage, &ticket);

    let user_record = &history(&storage, &user)[0];
    assert_eq!(
        user_record.properties.attributes.as_ref().unwrap()["password"],
        REDACTED
    );
}

#[test]
fn documents_are_left_to_their_own_history() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_storage(&temp_dir);

    let quote = storage
        .create(Quote::new("Q-2026-0001", ClientId::new(), None))
        .unwrap();
    let invoice = storage
        .create(Invoice::from_quote("F-2026-0001", &quote, None))
        .unwrap();
    storage.delete::<Quote>(quote.key()).unwrap();

    assert!(history(&storage, &quote).is_empty());
    assert!(history(&storage, &invoice).is_empty());
    assert!(EntityKind::Quote.has_dedicated_audit());
}

#[test]
fn delete_then_restore_snapshots() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_storage(&temp_dir);

    let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
    let deleted = storage.delete::<Client>(client.key()).unwrap();
    let restored = storage.restore::<Client>(client.key()).unwrap();

    let records = history(&storage, &client);
    assert_eq!(records.len(), 3);

    assert_eq!(records[1].event, LifecycleEvent::Deleted);
    let old = records[1].properties.old.as_ref().unwrap();
    assert!(old["deleted_at"].is_null());
    assert_eq!(old["email"], "a@x.com");
    assert!(records[1].properties.attributes.is_none());
    assert_ne!(deleted.deleted_at, None);

    assert_eq!(records[2].event, LifecycleEvent::Restored);
    assert_eq!(
        records[2].properties.attributes.as_ref().unwrap(),
        &restored.attributes().unwrap()
    );
}

#[test]
fn activity_writes_never_log_themselves() {
    let temp_dir = TempDir::new().unwrap();
    let storage = open_storage(&temp_dir);

    let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
    for i in 0..5 {
        let mut edited = storage.find::<Client>(client.key()).unwrap();
        edited.notes = format!("call #{}", i);
        storage.update(edited).unwrap();
    }

    let all = storage.activity.all().unwrap();
    assert_eq!(all.len(), 6);
    assert!(all.iter().all(|r| r.subject_type == EntityKind::Client));
}

#[test]
fn records_survive_a_restart_and_keep_the_causer() {
    let temp_dir = TempDir::new().unwrap();
    let user_ref;
    {
        let actor = Arc::new(SessionActor::new());
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), actor.clone()).unwrap();

        let user = storage.create(User::new("Sam", "sam@x.com", "hash")).unwrap();
        user_ref = EntityRef::of(&user);
        actor.sign_in(Principal::user(&user));
        storage.create(Client::new("Acme", "a@x.com")).unwrap();
    }

    let storage = open_storage(&temp_dir);
    let by_sam = storage
        .activity
        .query(&ActivityQuery::new().causer(user_ref.key))
        .unwrap();
    assert_eq!(by_sam.len(), 1);
    assert_eq!(by_sam[0].log_name, "client");
    assert_eq!(by_sam[0].causer(), Some(user_ref));
}
