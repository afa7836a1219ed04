//! Storage layer for bizdesk
//!
//! Provides JSON file repositories with atomic writes, the append-only
//! activity log, and the generic write path that announces every committed
//! mutation to the lifecycle observers.
//!
//! A write and its notifications form one unit of work: if an observer fails,
//! the change is undone (in memory and on disk) and the observer's error is
//! returned.

pub mod activity;
pub mod file_io;
pub mod repository;

pub use activity::{ActivityLog, ActivityQuery};
pub use file_io::{
    append_json_line, read_json, read_json_lines, write_json_atomic, write_json_lines_atomic,
};
pub use repository::{EntityStore, Repository};

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::{AuditInterceptor, AuditRecord};
use crate::auth::{acting_user, ActorResolver};
use crate::config::{AuditFailurePolicy, BizdeskPaths, Settings};
use crate::error::{BizdeskError, BizdeskResult};
use crate::events::{ActivityWriter, EntitySnapshot, LifecycleEvent, ObserverRegistry, Payload};
use crate::models::{
    Client, Entity, EntityKind, Invoice, Product, Quote, Ticket, User, UserId, WebOrder,
};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: BizdeskPaths,
    pub users: Repository<User>,
    pub clients: Repository<Client>,
    pub products: Repository<Product>,
    pub quotes: Repository<Quote>,
    pub invoices: Repository<Invoice>,
    pub web_orders: Repository<WebOrder>,
    pub tickets: Repository<Ticket>,
    pub activity: ActivityLog,
    registry: ObserverRegistry,
    actor: Arc<dyn ActorResolver>,
    audit_policy: AuditFailurePolicy,
}

/// An entity kind the generic write path can reach
pub trait Persisted: Entity {
    fn store(storage: &Storage) -> &dyn EntityStore<Self>;
}

impl Storage {
    /// Create a Storage instance with an empty observer registry
    pub fn new(paths: BizdeskPaths, actor: Arc<dyn ActorResolver>) -> BizdeskResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            users: Repository::new(paths.entity_file(EntityKind::User)),
            clients: Repository::new(paths.entity_file(EntityKind::Client)),
            products: Repository::new(paths.entity_file(EntityKind::Product)),
            quotes: Repository::new(paths.entity_file(EntityKind::Quote)),
            invoices: Repository::new(paths.entity_file(EntityKind::Invoice)),
            web_orders: Repository::new(paths.entity_file(EntityKind::WebOrder)),
            tickets: Repository::new(paths.entity_file(EntityKind::Ticket)),
            activity: ActivityLog::new(paths.activity_log()),
            registry: ObserverRegistry::new(),
            actor,
            audit_policy: AuditFailurePolicy::default(),
            paths,
        })
    }

    /// Open storage the way the application runs it: data loaded and the
    /// audit interceptor subscribed
    pub fn open(
        paths: BizdeskPaths,
        settings: &Settings,
        actor: Arc<dyn ActorResolver>,
    ) -> BizdeskResult<Self> {
        let mut storage = Self::new(paths, actor)?;
        storage.load_all()?;
        storage.register_audit(settings);
        Ok(storage)
    }

    /// Subscribe the audit interceptor; returns the number of new
    /// subscriptions (0 when it was already registered)
    pub fn register_audit(&mut self, settings: &Settings) -> usize {
        self.audit_policy = settings.audit.failure_policy;
        let interceptor = Arc::new(AuditInterceptor::new(
            self.actor.clone(),
            settings.locale,
            settings.audit.failure_policy,
        ));
        interceptor.register(&mut self.registry)
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &BizdeskPaths {
        &self.paths
    }

    /// What dedicated loggers do when an activity write fails
    pub fn audit_policy(&self) -> AuditFailurePolicy {
        self.audit_policy
    }

    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObserverRegistry {
        &mut self.registry
    }

    pub fn actor(&self) -> &dyn ActorResolver {
        self.actor.as_ref()
    }

    /// The signed-in user, if the current principal is one
    pub fn acting_user(&self) -> Option<UserId> {
        acting_user(self.actor.as_ref())
    }

    /// Load all data from disk
    pub fn load_all(&self) -> BizdeskResult<()> {
        self.users.load()?;
        self.clients.load()?;
        self.products.load()?;
        self.quotes.load()?;
        self.invoices.load()?;
        self.web_orders.load()?;
        self.tickets.load()?;
        self.activity.load()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Look up an entity by key, trashed or not
    pub fn find<E: Persisted>(&self, key: Uuid) -> BizdeskResult<E> {
        E::store(self)
            .fetch(key)?
            .ok_or_else(|| BizdeskError::not_found(E::KIND, key.to_string()))
    }

    /// Insert a new entity and announce `created`
    pub fn create<E: Persisted>(&self, entity: E) -> BizdeskResult<E> {
        self.create_with(entity, |_| Ok(()))
    }

    /// Insert a new entity, running `log` in the same unit of work
    ///
    /// `log` runs after the observers. If it fails, the insert is undone
    /// exactly as for an observer failure.
    pub fn create_with<E: Persisted>(
        &self,
        entity: E,
        log: impl FnOnce(&E) -> BizdeskResult<()>,
    ) -> BizdeskResult<E> {
        let store = E::store(self);
        let key = entity.key();
        let snapshot = EntitySnapshot::capture(&entity)?;
        let checkpoint = self.activity.count()?;

        store.insert(&entity)?;
        self.commit::<E>(
            LifecycleEvent::Created,
            snapshot,
            checkpoint,
            || log(&entity),
            || store.remove(key),
        )?;

        Ok(entity)
    }

    /// Persist changes to an existing entity and announce `updated`
    ///
    /// `updated_at` (and `updated_by` where the model has it) is stamped
    /// here; callers never set bookkeeping fields themselves.
    pub fn update<E: Persisted>(&self, entity: E) -> BizdeskResult<E> {
        self.update_with(entity, |_, _| Ok(()))
    }

    /// Persist changes, running `log(previous, updated)` in the same unit of work
    pub fn update_with<E: Persisted>(
        &self,
        mut entity: E,
        log: impl FnOnce(&E, &E) -> BizdeskResult<()>,
    ) -> BizdeskResult<E> {
        let store = E::store(self);
        let previous = self.find::<E>(entity.key())?;
        let checkpoint = self.activity.count()?;

        entity.touch(Utc::now(), self.acting_user());
        let snapshot = EntitySnapshot::capture(&entity)?.with_original(previous.attributes()?);

        store.replace(&entity)?;
        self.commit::<E>(
            LifecycleEvent::Updated,
            snapshot,
            checkpoint,
            || log(&previous, &entity),
            || store.replace(&previous),
        )?;

        Ok(entity)
    }

    /// Refresh bookkeeping fields only
    pub fn touch<E: Persisted>(&self, key: Uuid) -> BizdeskResult<E> {
        let entity = self.find::<E>(key)?;
        self.update(entity)
    }

    /// Soft delete: set `deleted_at` and announce `deleted` with the state
    /// the entity had before
    pub fn delete<E: Persisted>(&self, key: Uuid) -> BizdeskResult<E> {
        self.delete_with(key, |_| Ok(()))
    }

    /// Soft delete, running `log(previous)` in the same unit of work
    pub fn delete_with<E: Persisted>(
        &self,
        key: Uuid,
        log: impl FnOnce(&E) -> BizdeskResult<()>,
    ) -> BizdeskResult<E> {
        let store = E::store(self);
        let entity = self.find::<E>(key)?;

        if entity.is_trashed() {
            return Err(BizdeskError::Validation(format!(
                "{} '{}' is already deleted",
                E::KIND,
                entity.label()
            )));
        }

        let checkpoint = self.activity.count()?;
        let snapshot = EntitySnapshot::capture(&entity)?;
        let mut trashed = entity.clone();
        trashed.set_deleted_at(Some(Utc::now()));

        store.replace(&trashed)?;
        self.commit::<E>(
            LifecycleEvent::Deleted,
            snapshot,
            checkpoint,
            || log(&entity),
            || store.replace(&entity),
        )?;

        Ok(trashed)
    }

    /// Remove the row for good and announce `deleted`
    pub fn force_delete<E: Persisted>(&self, key: Uuid) -> BizdeskResult<E> {
        let store = E::store(self);
        let entity = self.find::<E>(key)?;
        let checkpoint = self.activity.count()?;
        let snapshot = EntitySnapshot::capture(&entity)?;

        store.remove(key)?;
        self.commit::<E>(
            LifecycleEvent::Deleted,
            snapshot,
            checkpoint,
            || Ok(()),
            || store.insert(&entity),
        )?;

        Ok(entity)
    }

    /// Clear `deleted_at` and announce `restored` with the restored state
    pub fn restore<E: Persisted>(&self, key: Uuid) -> BizdeskResult<E> {
        let store = E::store(self);
        let entity = self.find::<E>(key)?;

        if !entity.is_trashed() {
            return Err(BizdeskError::Validation(format!(
                "{} '{}' is not deleted",
                E::KIND,
                entity.label()
            )));
        }

        let checkpoint = self.activity.count()?;
        let mut restored = entity.clone();
        restored.set_deleted_at(None);
        restored.touch(Utc::now(), self.acting_user());
        let snapshot = EntitySnapshot::capture(&restored)?;

        store.replace(&restored)?;
        self.commit::<E>(
            LifecycleEvent::Restored,
            snapshot,
            checkpoint,
            || Ok(()),
            || store.replace(&entity),
        )?;

        Ok(restored)
    }

    /// Notify observers of a committed change, then run the dedicated `log`
    ///
    /// If either fails, the change is undone and every activity record
    /// appended since `checkpoint` is taken back.
    fn commit<E: Entity>(
        &self,
        event: LifecycleEvent,
        snapshot: EntitySnapshot,
        checkpoint: usize,
        log: impl FnOnce() -> BizdeskResult<()>,
        undo: impl FnOnce() -> BizdeskResult<()>,
    ) -> BizdeskResult<()> {
        let key = snapshot.key;
        let payload = [Payload::Entity(snapshot)];

        let result = self
            .registry
            .dispatch(self, event.token(), &payload)
            .and_then(|()| log());

        if let Err(e) = result {
            tracing::warn!(kind = %E::KIND, %key, %event, error = %e, "unit of work failed, rolling back");
            if let Err(undo_err) = undo() {
                tracing::error!(kind = %E::KIND, %key, error = %undo_err, "rollback failed");
            }
            if let Err(trail_err) = self.activity.rollback_to(checkpoint) {
                tracing::error!(kind = %E::KIND, %key, error = %trail_err, "could not take back activity records");
            }
            return Err(e);
        }

        tracing::debug!(kind = %E::KIND, %key, %event, "committed");
        Ok(())
    }
}

impl ActivityWriter for Storage {
    /// Append a record and announce it like any other creation
    ///
    /// The activity store cannot remove a row, so the checkpoint rollback in
    /// `commit` is what takes the record back if an observer fails.
    fn write_activity(&self, record: AuditRecord) -> BizdeskResult<()> {
        let checkpoint = self.activity.count()?;
        let snapshot = EntitySnapshot::capture(&record)?;

        self.activity.append(&record)?;
        self.commit::<AuditRecord>(
            LifecycleEvent::Created,
            snapshot,
            checkpoint,
            || Ok(()),
            || Ok(()),
        )
    }
}

impl Persisted for User {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.users
    }
}

impl Persisted for Client {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.clients
    }
}

impl Persisted for Product {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.products
    }
}

impl Persisted for Quote {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.quotes
    }
}

impl Persisted for Invoice {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.invoices
    }
}

impl Persisted for WebOrder {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.web_orders
    }
}

impl Persisted for Ticket {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.tickets
    }
}

impl Persisted for AuditRecord {
    fn store(storage: &Storage) -> &dyn EntityStore<Self> {
        &storage.activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::REDACTED;
    use crate::auth::{NoActor, Principal, SessionActor};
    use crate::events::LifecycleObserver;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap();
        (temp_dir, storage)
    }

    struct Failing;

    impl LifecycleObserver for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn handle(
            &self,
            _writer: &dyn ActivityWriter,
            _event: &str,
            _payload: &[Payload],
        ) -> BizdeskResult<()> {
            Err(BizdeskError::Storage("audit table unavailable".into()))
        }
    }

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, Arc::new(NoActor)).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
        assert_eq!(storage.registry().listener_count("created"), 0);
    }

    #[test]
    fn test_audit_registration_is_idempotent() {
        let (_temp, mut storage) = create_test_storage();
        assert_eq!(storage.register_audit(&Settings::default()), 0);

        storage.create(Client::new("Acme", "a@x.com")).unwrap();
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_create_logs_one_record() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let records = storage.activity.all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, LifecycleEvent::Created);
        assert_eq!(records[0].subject_id, client.key());
        assert_eq!(
            records[0].properties.attributes,
            Some(client.attributes().unwrap())
        );
    }

    #[test]
    fn test_update_email_scenario() {
        let (_temp, storage) = create_test_storage();
        let mut client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        client.email = "b@x.com".into();
        storage.update(client).unwrap();

        let records = storage.activity.all().unwrap();
        assert_eq!(records.len(), 2);
        let record = serde_json::to_value(&records[1]).unwrap();
        assert_eq!(record["log_name"], "client");
        assert_eq!(record["event"], "updated");
        assert_eq!(
            record["properties"],
            json!({"attributes": {"email": "b@x.com"}, "old": {"email": "a@x.com"}})
        );
    }

    #[test]
    fn test_touch_is_not_logged() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let touched: Client = storage.touch(client.key()).unwrap();
        assert!(touched.updated_at >= client.updated_at);
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_and_restore() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        let before_delete = client.attributes().unwrap();

        let trashed: Client = storage.delete(client.key()).unwrap();
        assert!(trashed.is_trashed());
        assert!(storage.delete::<Client>(client.key()).unwrap_err().is_validation());

        let restored: Client = storage.restore(client.key()).unwrap();
        assert!(!restored.is_trashed());

        let records = storage.activity.all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].event, LifecycleEvent::Deleted);
        assert_eq!(records[1].properties.old, Some(before_delete));
        assert_eq!(records[2].event, LifecycleEvent::Restored);
        assert_eq!(
            records[2].properties.attributes,
            Some(restored.attributes().unwrap())
        );
    }

    #[test]
    fn test_restore_requires_trashed() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        assert!(storage.restore::<Client>(client.key()).unwrap_err().is_validation());
    }

    #[test]
    fn test_force_delete_removes_row() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        storage.force_delete::<Client>(client.key()).unwrap();

        assert!(storage.clients.get(client.key()).unwrap().is_none());
        let records = storage.activity.all().unwrap();
        assert_eq!(records[1].event, LifecycleEvent::Deleted);
    }

    #[test]
    fn test_dedicated_kinds_not_logged() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        storage
            .create(Quote::new("Q-2026-0001", client.id, None))
            .unwrap();

        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_activity_records_are_immutable() {
        let (_temp, storage) = create_test_storage();
        storage.create(Client::new("Acme", "a@x.com")).unwrap();
        let record = storage.activity.all().unwrap().remove(0);

        assert!(matches!(
            storage.update(record.clone()).unwrap_err(),
            BizdeskError::Immutable(_)
        ));
        assert!(matches!(
            storage.delete::<AuditRecord>(record.key()).unwrap_err(),
            BizdeskError::Immutable(_)
        ));
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_observer_failure_rolls_back() {
        let (_temp, mut storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        storage.registry_mut().subscribe("updated", Arc::new(Failing));
        storage.registry_mut().subscribe("created", Arc::new(Failing));

        let trail = storage.activity.all().unwrap();
        assert_eq!(trail.len(), 1);

        // The audit interceptor runs first and appends its record; the later
        // failure must take that record back along with the write
        let mut changed = client.clone();
        changed.email = "b@x.com".into();
        assert!(storage.update(changed).is_err());
        assert_eq!(storage.clients.get(client.key()).unwrap(), Some(client.clone()));
        assert_eq!(storage.activity.all().unwrap(), trail);

        let other = Client::new("Globex", "g@x.com");
        assert!(storage.create(other.clone()).is_err());
        assert!(storage.clients.get(other.key()).unwrap().is_none());
        assert_eq!(storage.activity.all().unwrap(), trail);

        // Reloading from disk shows the rolled-back state too
        storage.load_all().unwrap();
        assert_eq!(storage.clients.get(client.key()).unwrap(), Some(client));
        assert!(storage.clients.get(other.key()).unwrap().is_none());
        assert_eq!(storage.activity.all().unwrap(), trail);
    }

    #[test]
    fn test_dedicated_log_failure_rolls_back() {
        let (_temp, storage) = create_test_storage();
        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();

        let mut changed = client.clone();
        changed.email = "b@x.com".into();
        let result = storage.update_with(changed, |_, _| {
            Err(BizdeskError::Storage("history unavailable".into()))
        });
        assert!(result.is_err());
        assert_eq!(storage.clients.get(client.key()).unwrap(), Some(client.clone()));
        assert_eq!(storage.activity.count().unwrap(), 1);

        let other = Client::new("Globex", "g@x.com");
        assert!(storage
            .create_with(other.clone(), |_| Err(BizdeskError::Storage("nope".into())))
            .is_err());
        assert!(storage.clients.get(other.key()).unwrap().is_none());
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_warn_policy_keeps_primary_write() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut settings = Settings::default();
        settings.audit.failure_policy = AuditFailurePolicy::Warn;
        let storage = Storage::open(paths, &settings, Arc::new(NoActor)).unwrap();

        // Make the activity log unwritable by replacing it with a directory
        std::fs::create_dir_all(storage.activity.path()).unwrap();

        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        assert!(storage.clients.get(client.key()).unwrap().is_some());
        assert_eq!(storage.activity.count().unwrap(), 0);
    }

    #[test]
    fn test_propagate_policy_fails_primary_write() {
        let (_temp, storage) = create_test_storage();
        std::fs::create_dir_all(storage.activity.path()).unwrap();

        let client = Client::new("Acme", "a@x.com");
        assert!(storage.create(client.clone()).is_err());
        assert!(storage.clients.get(client.key()).unwrap().is_none());
    }

    #[test]
    fn test_update_stamps_acting_user() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let session = Arc::new(SessionActor::new());
        let storage = Storage::open(paths, &Settings::default(), session.clone()).unwrap();

        let user = storage.create(User::new("Ada", "ada@x.com", "secret-hash")).unwrap();
        session.sign_in(Principal::user(&user));

        let client = storage.create(Client::new("Acme", "a@x.com")).unwrap();
        let ticket = storage
            .create(crate::models::Ticket::new(client.id, "Broken", None))
            .unwrap();
        let mut ticket = ticket;
        ticket.subject = "Still broken".into();
        let ticket = storage.update(ticket).unwrap();
        assert_eq!(ticket.updated_by, Some(user.id));

        let records = storage.activity.all().unwrap();
        let user_record = &records[0];
        assert!(user_record.causer().is_none());
        assert_eq!(
            user_record.properties.attributes.as_ref().unwrap()["password"],
            REDACTED
        );
        assert_eq!(records.last().unwrap().causer_id, Some(user.key()));
    }
}
