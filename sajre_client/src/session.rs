//! Signed-in state: bearer token, user profile and the pending-email marker
//! left behind by registration.
//!
//! Built once at startup from storage and handed to whatever needs it;
//! `sign_out` tears it down.

use crate::error::{AccessError, StorageError};
use crate::models::{Role, SessionUser};
use crate::storage::{Storage, PENDING_EMAIL_KEY, TOKEN_KEY, USER_KEY};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

pub struct Session {
    storage: Arc<dyn Storage>,
    token: Option<Secret<String>>,
    user: Option<SessionUser>,
}

impl Session {
    /// Restores whatever a previous run left in storage. A `user` entry that
    /// no longer parses is treated as signed out.
    pub fn restore(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let token = storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()).map(Secret::new);
        let user = match storage.get_item(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable stored user");
                    None
                }
            },
            None => None,
        };
        Ok(Self { storage, token, user })
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret().as_str())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn sign_in(&mut self, token: String, user: SessionUser) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, &token)?;
        let raw = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.storage.set_item(USER_KEY, &raw)?;
        tracing::info!(email = %user.email, role = %user.role, "signed in");
        self.token = Some(Secret::new(token));
        self.user = Some(user);
        Ok(())
    }

    /// Replaces the stored user while keeping the token.
    pub fn update_user(&mut self, user: SessionUser) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.storage.set_item(USER_KEY, &raw)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)?;
        self.token = None;
        self.user = None;
        Ok(())
    }

    /// Checks the signed-in user against the role a dashboard needs.
    pub fn require_role(&self, required: Role) -> Result<(&SessionUser, &str), AccessError> {
        let (Some(user), Some(token)) = (self.user.as_ref(), self.token()) else {
            return Err(AccessError::NotSignedIn);
        };
        if user.role != required {
            return Err(AccessError::Denied {
                required,
                actual: user.role,
            });
        }
        Ok((user, token))
    }

    pub fn pending_email(&self) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get_item(PENDING_EMAIL_KEY)?.filter(|e| !e.is_empty()))
    }

    pub fn set_pending_email(&self, email: &str) -> Result<(), StorageError> {
        self.storage.set_item(PENDING_EMAIL_KEY, email)
    }

    pub fn clear_pending_email(&self) -> Result<(), StorageError> {
        self.storage.remove_item(PENDING_EMAIL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::Map;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: Some("u1".into()),
            name: "Asha".into(),
            email: "asha@x.io".into(),
            role,
            is_enrolled: None,
            stats: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn sign_in_survives_restore_and_sign_out_clears_it() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut session = Session::restore(storage.clone()).unwrap();
        assert!(!session.is_signed_in());

        session.sign_in("tok".into(), user(Role::Mentor)).unwrap();
        let restored = Session::restore(storage.clone()).unwrap();
        assert_eq!(restored.token(), Some("tok"));
        assert_eq!(restored.user().map(|u| u.role), Some(Role::Mentor));

        session.sign_out().unwrap();
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
        assert!(!Session::restore(storage).unwrap().is_signed_in());
    }

    #[test]
    fn require_role_distinguishes_missing_and_wrong_role() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut session = Session::restore(storage).unwrap();
        assert_eq!(session.require_role(Role::Admin).unwrap_err(), AccessError::NotSignedIn);

        session.sign_in("tok".into(), user(Role::Vendor)).unwrap();
        let err = session.require_role(Role::Admin).unwrap_err();
        assert_eq!(err.to_string(), "Access Denied: Admin role required");
        assert!(session.require_role(Role::Vendor).is_ok());
    }

    #[test]
    fn unreadable_user_restores_signed_out() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "tok").unwrap();
        storage.set_item(USER_KEY, "{\"name\":\"Asha\"}").unwrap();
        let session = Session::restore(storage).unwrap();
        assert!(session.user().is_none());
        assert!(!session.is_signed_in());
    }

    #[test]
    fn pending_email_round_trip() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = Session::restore(storage).unwrap();
        assert_eq!(session.pending_email().unwrap(), None);
        session.set_pending_email("a@b.com").unwrap();
        assert_eq!(session.pending_email().unwrap().as_deref(), Some("a@b.com"));
        session.clear_pending_email().unwrap();
        assert_eq!(session.pending_email().unwrap(), None);
    }
}
