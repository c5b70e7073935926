//! Key-value configuration consulted on every request.

use std::collections::HashMap;
use std::env;
use std::sync::{PoisonError, RwLock};

/// Key under which the API root URL is stored.
pub const API_ROOT: &str = "API_ROOT";

/// Root used by `Configuration::from_env` when `API_ROOT` is unset.
pub const DEFAULT_API_ROOT: &str = "http://localhost:7077";

/// Thread-safe string store. Values can be changed at runtime; the client
/// reads `API_ROOT` afresh for each call.
#[derive(Debug, Default)]
pub struct Configuration {
    values: RwLock<HashMap<String, String>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_root(root: impl Into<String>) -> Self {
        let config = Self::new();
        config.set_api_root(root);
        config
    }

    /// Seed `API_ROOT` from the environment variable of the same name.
    pub fn from_env() -> Self {
        Self::with_api_root(root_from(env::var(API_ROOT).ok()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.into(), value.into());
    }

    pub fn api_root(&self) -> Option<String> {
        self.get(API_ROOT)
    }

    pub fn set_api_root(&self, root: impl Into<String>) {
        self.set(API_ROOT, root);
    }
}

/// Trimmed `API_ROOT` value, or the default when unset or blank.
fn root_from(var: Option<String>) -> String {
    var.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_API_ROOT.to_string())
}
