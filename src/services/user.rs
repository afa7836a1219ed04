//! User service
//!
//! Account management for back-office staff. Credential fields are written
//! through the normal storage path; the audit trail masks them.

use crate::auth::{
    generate_recovery_codes, generate_secret, hash_password, verify_password, ClearPassword,
};
use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Entity, User};
use crate::storage::Storage;

const RECOVERY_CODE_COUNT: usize = 8;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a user with a freshly hashed password
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &ClearPassword,
        is_admin: bool,
    ) -> BizdeskResult<User> {
        let email = email.trim().to_lowercase();
        if self.find_by_email(&email)?.is_some() {
            return Err(BizdeskError::Duplicate {
                entity_type: "User",
                identifier: email,
            });
        }

        let mut user = User::new(name.trim(), email, hash_password(password)?);
        user.is_admin = is_admin;
        user.validate()
            .map_err(|e| BizdeskError::Validation(e.to_string()))?;

        self.storage.create(user)
    }

    /// Check credentials; deleted users cannot sign in
    pub fn authenticate(&self, email: &str, password: &ClearPassword) -> BizdeskResult<User> {
        let user = self
            .find_by_email(email)?
            .filter(|u| !u.is_trashed())
            .ok_or_else(|| BizdeskError::Auth("Invalid email or password".into()))?;

        if !verify_password(password, &user.password)? {
            tracing::info!(email = %user.email, "failed sign-in");
            return Err(BizdeskError::Auth("Invalid email or password".into()));
        }

        Ok(user)
    }

    pub fn change_password(
        &self,
        reference: &str,
        current: &ClearPassword,
        new: &ClearPassword,
    ) -> BizdeskResult<User> {
        let mut user = self.find(reference)?;
        if !verify_password(current, &user.password)? {
            return Err(BizdeskError::Auth("Current password is incorrect".into()));
        }

        user.password = hash_password(new)?;
        user.remember_token = None;
        self.storage.update(user)
    }

    /// Enroll two-factor auth; returns the one-time recovery codes
    pub fn enable_two_factor(&self, reference: &str) -> BizdeskResult<(User, Vec<String>)> {
        let mut user = self.find(reference)?;
        if user.has_two_factor() {
            return Err(BizdeskError::Validation(format!(
                "Two-factor authentication is already enabled for {}",
                user.email
            )));
        }

        let codes = generate_recovery_codes(RECOVERY_CODE_COUNT);
        user.two_factor_secret = Some(generate_secret(20));
        user.two_factor_recovery_codes = codes.clone();

        Ok((self.storage.update(user)?, codes))
    }

    pub fn disable_two_factor(&self, reference: &str) -> BizdeskResult<User> {
        let mut user = self.find(reference)?;
        user.two_factor_secret = None;
        user.two_factor_recovery_codes.clear();
        self.storage.update(user)
    }

    /// Issue a new "remember me" token
    pub fn rotate_remember_token(&self, reference: &str) -> BizdeskResult<String> {
        let mut user = self.find(reference)?;
        let token = generate_secret(30);
        user.remember_token = Some(token.clone());
        self.storage.update(user)?;
        Ok(token)
    }

    pub fn find_by_email(&self, email: &str) -> BizdeskResult<Option<User>> {
        let email = email.trim().to_lowercase();
        self.storage.users.find_by(|u| u.email == email)
    }

    /// Find by email, short id or UUID prefix
    pub fn find(&self, reference: &str) -> BizdeskResult<User> {
        match self.find_by_email(reference)? {
            Some(user) => Ok(user),
            None => self.storage.users.resolve(reference).map_err(|e| {
                if e.is_not_found() {
                    BizdeskError::user_not_found(reference)
                } else {
                    e
                }
            }),
        }
    }

    pub fn list(&self) -> BizdeskResult<Vec<User>> {
        self.storage.users.active()
    }

    pub fn delete(&self, reference: &str) -> BizdeskResult<User> {
        let user = self.find(reference)?;
        self.storage.delete::<User>(user.key())
    }

    pub fn restore(&self, reference: &str) -> BizdeskResult<User> {
        let user = self.find(reference)?;
        self.storage.restore::<User>(user.key())
    }
}
