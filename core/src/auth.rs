//! Session credentials consumed by the client.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

/// Source of the bearer token, and the place an expired session is cleared.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Current bearer token, if signed in.
    async fn token(&self) -> Option<String>;

    async fn clear_token(&self);

    async fn clear_user_id(&self);
}

/// `AuthStore` kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    token: RwLock<Option<String>>,
    user_id: RwLock<Option<String>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `token` for `user_id`.
    pub fn signed_in(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store.set_user_id(user_id);
        store
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn set_user_id(&self, user_id: impl Into<String>) {
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id.into());
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn token(&self) -> Option<String> {
        self.current_token()
    }

    async fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    async fn clear_user_id(&self) {
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
