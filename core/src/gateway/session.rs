use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::prelude::{GatewayError, GatewayResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
            email: None,
            expires_at: None,
        }
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..self
        }
    }

    pub fn with_expiry(self, expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..self
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// Shared holder of the signed-in session.
///
/// Gateways get a clone at construction; screens call [`SessionStore::subscribe`]
/// to hear about sign-in and sign-out.
#[derive(Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn signed_in(session: Session) -> Self {
        let store = Self::new();
        store.sign_in(session);
        store
    }

    pub fn sign_in(&self, session: Session) {
        self.sender.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    /// The live session, or `NotAuthenticated` when absent or expired.
    pub fn require(&self) -> GatewayResult<Session> {
        match self.current() {
            Some(session) if !session.is_expired_at(Utc::now()) => Ok(session),
            _ => Err(GatewayError::NotAuthenticated),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
