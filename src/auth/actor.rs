//! Current principal resolution

use std::sync::RwLock;

use crate::models::{EntityKind, EntityRef, User, UserId};

/// Whoever is performing the current operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A persisted entity, normally a user
    Entity(EntityRef),
    /// Something without a stored identity (console command, unknown login)
    Unpersisted(String),
}

impl Principal {
    pub fn user(user: &User) -> Self {
        Self::Entity(EntityRef::of(user))
    }

    /// The entity reference, when the principal is persisted
    pub fn as_entity(&self) -> Option<EntityRef> {
        match self {
            Self::Entity(reference) => Some(*reference),
            Self::Unpersisted(_) => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Entity(reference) => reference.to_string(),
            Self::Unpersisted(label) => label.clone(),
        }
    }
}

/// Ambient accessor for the authenticated principal
pub trait ActorResolver: Send + Sync {
    fn current(&self) -> Option<Principal>;
}

/// Resolver for contexts with no principal at all (tests, seed scripts)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoActor;

impl ActorResolver for NoActor {
    fn current(&self) -> Option<Principal> {
        None
    }
}

/// Process-local session: one principal at a time
#[derive(Debug, Default)]
pub struct SessionActor {
    current: RwLock<Option<Principal>>,
}

impl SessionActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self {
            current: RwLock::new(Some(principal)),
        }
    }

    pub fn sign_in(&self, principal: Principal) {
        tracing::debug!(principal = %principal.label(), "signed in");
        if let Ok(mut current) = self.current.write() {
            *current = Some(principal);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
    }
}

impl ActorResolver for SessionActor {
    fn current(&self) -> Option<Principal> {
        self.current.read().ok().and_then(|current| current.clone())
    }
}

/// The acting user's id, if the current principal is a persisted user
pub fn acting_user(resolver: &dyn ActorResolver) -> Option<UserId> {
    resolver
        .current()
        .and_then(|principal| principal.as_entity())
        .filter(|reference| reference.kind == EntityKind::User)
        .map(|reference| UserId::from_uuid(reference.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;

    #[test]
    fn test_no_actor() {
        assert!(NoActor.current().is_none());
        assert!(acting_user(&NoActor).is_none());
    }

    #[test]
    fn test_session_sign_in_and_out() {
        let user = User::new("Ada", "ada@x.com", "hash");
        let session = SessionActor::new();
        assert!(session.current().is_none());

        session.sign_in(Principal::user(&user));
        assert_eq!(acting_user(&session), Some(user.id));

        session.sign_out();
        assert!(session.current().is_none());
    }

    #[test]
    fn test_unpersisted_principal_is_not_a_causer() {
        let session = SessionActor::signed_in(Principal::Unpersisted("cron".into()));
        assert!(session.current().unwrap().as_entity().is_none());
        assert!(acting_user(&session).is_none());
    }

    #[test]
    fn test_non_user_entity_is_not_an_acting_user() {
        let client = Client::new("Acme", "a@x.com");
        let session = SessionActor::signed_in(Principal::Entity(EntityRef::of(&client)));
        assert!(session.current().unwrap().as_entity().is_some());
        assert!(acting_user(&session).is_none());
    }
}
