//! # Session Module
//!
//! An injected key-value store standing in for browser local storage.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  login ──► Session::start(store, token)   writes the token             │
//! │                 │                                                       │
//! │                 ├── is_authenticated()     token-presence check         │
//! │                 ├── save_draft_brands()    JSON under "draft_brands"    │
//! │                 └── draft_brands()                                      │
//! │                 │                                                       │
//! │  logout ─► session.end()                   clears the store             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing and SKU code never touch the store; only the form layer does.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CoreResult;
use crate::types::Brand;

/// Key under which the auth token is kept.
pub const TOKEN_KEY: &str = "token";

/// Key under which unsaved brand rows are kept.
pub const DRAFT_BRANDS_KEY: &str = "draft_brands";

/// String key-value storage with explicit ownership.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// In-memory store, used in tests and by non-browser callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A logged-in session over a store.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    /// Starts a session, replacing whatever the store held before.
    pub fn start(mut store: S, token: impl Into<String>) -> Self {
        store.clear();
        store.set(TOKEN_KEY, token.into());
        debug!("Session started");
        Session { store }
    }

    /// Resumes a session if the store still holds a token.
    pub fn resume(store: S) -> Option<Self> {
        match store.get(TOKEN_KEY) {
            Some(token) if !token.is_empty() => Some(Session { store }),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }

    /// Token-presence check; no verification happens client-side.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    /// Stores unsaved brand rows as JSON.
    pub fn save_draft_brands(&mut self, brands: &[Brand]) -> CoreResult<()> {
        let json = serde_json::to_string(brands)?;
        self.store.set(DRAFT_BRANDS_KEY, json);
        Ok(())
    }

    /// Unsaved brand rows; empty when none were stored.
    pub fn draft_brands(&self) -> CoreResult<Vec<Brand>> {
        match self.store.get(DRAFT_BRANDS_KEY) {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn discard_draft_brands(&mut self) {
        self.store.remove(DRAFT_BRANDS_KEY);
    }

    /// Ends the session, clearing the store, and hands it back.
    pub fn end(mut self) -> S {
        self.store.clear();
        debug!("Session ended");
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_start_writes_token_and_clears_stale_entries() {
        let mut store = MemoryStore::new();
        store.set("stale", "x".to_string());

        let session = Session::start(store, "abc123");
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("abc123"));

        let store = session.end();
        assert!(store.is_empty());
    }

    #[test]
    fn test_resume_requires_token() {
        assert!(Session::resume(MemoryStore::new()).is_none());

        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, String::new());
        assert!(Session::resume(store).is_none());

        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc123".to_string());
        assert!(Session::resume(store).is_some());
    }

    #[test]
    fn test_draft_brands_round_trip_through_store() {
        let mut session = Session::start(MemoryStore::new(), "abc123");
        assert!(session.draft_brands().unwrap().is_empty());

        let drafts = vec![Brand::new("Nike").with_code("NK"), Brand::new("Adidas")];
        session.save_draft_brands(&drafts).unwrap();
        assert_eq!(session.draft_brands().unwrap(), drafts);

        session.discard_draft_brands();
        assert!(session.draft_brands().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_drafts_surface_an_error() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc123".to_string());
        store.set(DRAFT_BRANDS_KEY, "{not json".to_string());

        let session = Session::resume(store).unwrap();
        assert!(matches!(session.draft_brands(), Err(CoreError::SessionData(_))));
    }
}
