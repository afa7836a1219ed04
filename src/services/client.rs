//! Client service
//!
//! Validated CRUD for clients. Every write goes through the storage write
//! path, so creations, edits, deletions and restorations land in the audit
//! trail under the `client` log name.

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Client, Entity};
use crate::storage::Storage;

/// Optional edits to a client; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ClientChanges {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.contact_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.notes.is_none()
    }
}

/// Service for client management
pub struct ClientService<'a> {
    storage: &'a Storage,
}

impl<'a> ClientService<'a> {
    /// Create a new client service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new client
    pub fn create(&self, company: &str, email: &str) -> BizdeskResult<Client> {
        let client = Client::new(company.trim(), email.trim());
        client
            .validate()
            .map_err(|e| BizdeskError::Validation(e.to_string()))?;

        self.ensure_email_free(&client.email, None)?;
        self.storage.create(client)
    }

    /// Apply edits to a client
    pub fn update(&self, reference: &str, changes: ClientChanges) -> BizdeskResult<Client> {
        let mut client = self.find(reference)?;

        if let Some(company) = changes.company {
            client.company = company.trim().to_string();
        }
        if let Some(contact_name) = changes.contact_name {
            client.contact_name = contact_name.trim().to_string();
        }
        if let Some(email) = changes.email {
            client.email = email.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            client.phone = non_empty(phone);
        }
        if let Some(address) = changes.address {
            client.address = non_empty(address);
        }
        if let Some(notes) = changes.notes {
            client.notes = notes;
        }

        client
            .validate()
            .map_err(|e| BizdeskError::Validation(e.to_string()))?;
        self.ensure_email_free(&client.email, Some(&client))?;

        self.storage.update(client)
    }

    /// Find a client by short id, UUID prefix or company name
    pub fn find(&self, reference: &str) -> BizdeskResult<Client> {
        self.storage.clients.resolve(reference)
    }

    /// List clients, optionally including deleted ones
    pub fn list(&self, include_deleted: bool) -> BizdeskResult<Vec<Client>> {
        if include_deleted {
            self.storage.clients.get_all()
        } else {
            self.storage.clients.active()
        }
    }

    /// Soft-delete a client
    pub fn delete(&self, reference: &str) -> BizdeskResult<Client> {
        let client = self.find(reference)?;

        let open_tickets = self
            .storage
            .tickets
            .filter(|t| t.client_id == client.id && t.is_open() && !t.is_trashed())?;
        if !open_tickets.is_empty() {
            return Err(BizdeskError::Validation(format!(
                "Client '{}' has {} open ticket(s); close them first",
                client.company,
                open_tickets.len()
            )));
        }

        self.storage.delete::<Client>(client.key())
    }

    /// Restore a soft-deleted client
    pub fn restore(&self, reference: &str) -> BizdeskResult<Client> {
        let client = self.find(reference)?;
        self.storage.restore::<Client>(client.key())
    }

    /// Permanently remove a client that has no documents
    pub fn purge(&self, reference: &str) -> BizdeskResult<Client> {
        let client = self.find(reference)?;

        let has_quotes = self.storage.quotes.find_by(|q| q.client_id == client.id)?.is_some();
        let has_orders = self
            .storage
            .web_orders
            .find_by(|o| o.client_id == client.id)?
            .is_some();
        if has_quotes || has_orders {
            return Err(BizdeskError::Validation(format!(
                "Client '{}' has quotes or orders and can only be soft-deleted",
                client.company
            )));
        }

        self.storage.force_delete::<Client>(client.key())
    }

    fn ensure_email_free(&self, email: &str, current: Option<&Client>) -> BizdeskResult<()> {
        let needle = email.to_lowercase();
        let taken = self.storage.clients.find_by(|c| {
            c.email.to_lowercase() == needle
                && !c.is_trashed()
                && current.map_or(true, |current| current.id != c.id)
        })?;

        match taken {
            Some(_) => Err(BizdeskError::Duplicate {
                entity_type: "Client",
                identifier: email.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoActor;
    use crate::config::{BizdeskPaths, Settings};
    use crate::events::LifecycleEvent;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BizdeskPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default(), Arc::new(NoActor)).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_client() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        let client = service.create("  Acme  ", "a@x.com").unwrap();
        assert_eq!(client.company, "Acme");
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_create_validates() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        assert!(service.create("", "a@x.com").unwrap_err().is_validation());
        assert!(service.create("Acme", "nope").unwrap_err().is_validation());
        assert_eq!(storage.activity.count().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_email() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        service.create("Acme", "a@x.com").unwrap();
        let err = service.create("Acme 2", "A@X.com").unwrap_err();
        assert!(matches!(err, BizdeskError::Duplicate { .. }));
    }

    #[test]
    fn test_update_logs_changed_fields() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        service.create("Acme", "a@x.com").unwrap();

        let changes = ClientChanges {
            email: Some("b@x.com".into()),
            ..Default::default()
        };
        let client = service.update("acme", changes).unwrap();
        assert_eq!(client.email, "b@x.com");

        let records = storage.activity.all().unwrap();
        let last = records.last().unwrap();
        assert_eq!(last.event, LifecycleEvent::Updated);
        assert_eq!(last.properties.attributes.as_ref().unwrap()["email"], "b@x.com");
        assert_eq!(last.properties.old.as_ref().unwrap()["email"], "a@x.com");
    }

    #[test]
    fn test_update_without_changes_is_not_logged() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        service.create("Acme", "a@x.com").unwrap();

        service.update("acme", ClientChanges::default()).unwrap();
        assert_eq!(storage.activity.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_restore_and_list() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        service.create("Acme", "a@x.com").unwrap();

        service.delete("acme").unwrap();
        assert!(service.list(false).unwrap().is_empty());
        assert_eq!(service.list(true).unwrap().len(), 1);

        service.restore("acme").unwrap();
        assert_eq!(service.list(false).unwrap().len(), 1);
        assert_eq!(storage.activity.count().unwrap(), 3);
    }

    #[test]
    fn test_purge() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        service.create("Acme", "a@x.com").unwrap();

        service.purge("acme").unwrap();
        assert!(service.find("acme").unwrap_err().is_not_found());
    }
}
