//! Identity collaborator.
//!
//! The core only asks one question: who, if anyone, is signed in.

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::identity::UserIdentity;

/// Reports the currently authenticated user.
pub trait IdentityProvider: Send + Sync + 'static {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Identity held in memory and switched by explicit sign-in/sign-out calls.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Arc<Mutex<Option<UserIdentity>>>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// An identity that starts out signed in as `user`.
    pub fn signed_in(user: UserIdentity) -> Self {
        let identity = Self::new();
        identity.sign_in(user);
        identity
    }

    pub fn sign_in(&self, user: UserIdentity) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Clears the current user, returning who was signed in.
    pub fn sign_out(&self) -> Option<UserIdentity> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
