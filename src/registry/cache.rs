//! Alias-keyed session cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::Alias;
use crate::error::WinRmError;
use crate::Result;

/// Snapshot of one registered session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Index assigned at registration.
    pub index: usize,
    /// Aliases currently pointing at this index.
    pub aliases: Vec<String>,
    /// Whether this is the current session.
    pub current: bool,
}

struct Inner<T: ?Sized> {
    sessions: Vec<Arc<T>>,
    aliases: HashMap<String, (Alias, usize)>,
    current: Option<usize>,
}

impl<T: ?Sized> Inner<T> {
    fn new() -> Self {
        Self {
            sessions: Vec::new(),
            aliases: HashMap::new(),
            current: None,
        }
    }

    fn resolve(&self, alias_or_index: &str) -> Option<usize> {
        if let Some((_, index)) = self.aliases.get(&Alias::normalize(alias_or_index)) {
            return Some(*index);
        }
        alias_or_index
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|index| *index < self.sessions.len())
    }
}

/// Thread-safe registry of remote sessions.
///
/// Every registration appends a session and receives the next index,
/// starting at 0. Registering an alias again points it at the new session;
/// the old one stays reachable by index until [`clear_all`](Self::clear_all).
pub struct SessionRegistry<T: ?Sized> {
    inner: RwLock<Inner<T>>,
}

impl<T: ?Sized> SessionRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::new()),
        }
    }

    /// Register a session under `alias` and make it current.
    ///
    /// Returns the index assigned to the registration.
    pub fn register(&self, session: Arc<T>, alias: &str) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| WinRmError::LockPoisoned)?;

        let index = inner.sessions.len();
        inner.sessions.push(session);

        let alias = Alias::new(alias);
        inner.aliases.insert(alias.key().to_string(), (alias, index));
        inner.current = Some(index);

        Ok(index)
    }

    /// Make the session for `alias_or_index` current and return it.
    ///
    /// Aliases are tried first, then numeric indices.
    pub fn switch(&self, alias_or_index: &str) -> Result<Arc<T>> {
        let mut inner = self.inner.write().map_err(|_| WinRmError::LockPoisoned)?;

        let index = inner
            .resolve(alias_or_index)
            .ok_or_else(|| WinRmError::SessionNotFound(alias_or_index.to_string()))?;

        inner.current = Some(index);
        Ok(Arc::clone(&inner.sessions[index]))
    }

    /// Get the current session.
    pub fn current(&self) -> Result<Arc<T>> {
        let inner = self.inner.read().map_err(|_| WinRmError::LockPoisoned)?;
        inner
            .current
            .map(|index| Arc::clone(&inner.sessions[index]))
            .ok_or(WinRmError::NoCurrentSession)
    }

    /// Get the index of the current session, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|inner| inner.current)
    }

    /// Remove every session and reset the current session and index counter.
    ///
    /// Returns the number of sessions dropped.
    pub fn clear_all(&self) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| WinRmError::LockPoisoned)?;
        let dropped = inner.sessions.len();
        *inner = Inner::new();
        Ok(dropped)
    }

    /// Get the number of registered sessions.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.sessions.len()).unwrap_or(0)
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// List registered sessions with their aliases, ordered by index.
    pub fn snapshot(&self) -> Result<Vec<RegistryEntry>> {
        let inner = self.inner.read().map_err(|_| WinRmError::LockPoisoned)?;

        let mut entries: Vec<RegistryEntry> = (0..inner.sessions.len())
            .map(|index| RegistryEntry {
                index,
                aliases: Vec::new(),
                current: inner.current == Some(index),
            })
            .collect();

        for (alias, index) in inner.aliases.values() {
            entries[*index].aliases.push(alias.to_string());
        }
        for entry in &mut entries {
            entry.aliases.sort();
        }

        Ok(entries)
    }
}

impl<T: ?Sized> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
