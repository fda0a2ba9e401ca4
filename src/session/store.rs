//! Session attribute storage.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use uuid::Uuid;

/// Opaque handle identifying one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A type-erased session attribute.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Key-value storage keyed by session handle.
///
/// Implementations must be safe to share between request tasks.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Allocate a new, empty session.
    fn create(&self) -> SessionId;

    fn exists(&self, id: &SessionId) -> bool;

    /// Returns `None` when either the session or the attribute is absent.
    fn get(&self, id: &SessionId, key: &str) -> Option<Attribute>;

    /// Returns `false` when the session does not exist.
    fn set(&self, id: &SessionId, key: &str, value: Attribute) -> bool;

    /// Return the attribute, inserting `init()` first if it is missing.
    ///
    /// Returns `None` only when the session does not exist. The default
    /// implementation is not atomic; stores that can should override it.
    fn get_or_insert_with(
        &self,
        id: &SessionId,
        key: &str,
        init: &dyn Fn() -> Attribute,
    ) -> Option<Attribute> {
        if let Some(existing) = self.get(id, key) {
            return Some(existing);
        }
        let value = init();
        self.set(id, key, value.clone()).then_some(value)
    }

    /// End the session and drop all its attributes.
    fn invalidate(&self, id: &SessionId);

    /// Drop every session idle past the store's timeout; returns how many.
    fn purge_expired(&self) -> usize {
        0
    }
}

/// Idle time after which an in-memory session is discarded.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionEntry {
    attributes: HashMap<String, Attribute>,
    last_access: Instant,
}

impl SessionEntry {
    fn new(now: Instant) -> Self {
        Self {
            attributes: HashMap::new(),
            last_access: now,
        }
    }

    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_access) > idle_timeout
    }
}

/// In-process store backed by a concurrent map.
///
/// Every access refreshes a session; sessions idle longer than the timeout
/// are dropped when next touched or by `purge_expired`.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<SessionId, SessionEntry>>,
    idle_timeout: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Sessions currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The live entry for `id`, with its last access set to now.
    fn touch(&self, id: &SessionId) -> Option<RefMut<'_, SessionId, SessionEntry>> {
        let now = Instant::now();
        let mut entry = self.sessions.get_mut(id)?;
        if entry.is_expired(now, self.idle_timeout) {
            // Release the shard lock before removing.
            drop(entry);
            let timeout = self.idle_timeout;
            if self
                .sessions
                .remove_if(id, |_, e| e.is_expired(now, timeout))
                .is_some()
            {
                tracing::debug!(session = %id, "Session expired");
            }
            return None;
        }
        entry.last_access = now;
        Some(entry)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> SessionId {
        let id = SessionId(Uuid::new_v4().simple().to_string().to_uppercase());
        self.sessions.insert(id.clone(), SessionEntry::new(Instant::now()));
        tracing::debug!(session = %id, "Session created");
        id
    }

    fn exists(&self, id: &SessionId) -> bool {
        self.touch(id).is_some()
    }

    fn get(&self, id: &SessionId, key: &str) -> Option<Attribute> {
        self.touch(id)?.attributes.get(key).cloned()
    }

    fn set(&self, id: &SessionId, key: &str, value: Attribute) -> bool {
        match self.touch(id) {
            Some(mut entry) => {
                entry.attributes.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    fn get_or_insert_with(
        &self,
        id: &SessionId,
        key: &str,
        init: &dyn Fn() -> Attribute,
    ) -> Option<Attribute> {
        // The shard write lock is held for the whole lookup-or-insert.
        let mut entry = self.touch(id)?;
        Some(entry.attributes.entry(key.to_string()).or_insert_with(init).clone())
    }

    fn invalidate(&self, id: &SessionId) {
        if self.sessions.remove(id).is_some() {
            tracing::debug!(session = %id, "Session invalidated");
        }
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let expired = entry.is_expired(now, self.idle_timeout);
            removed += usize::from(expired);
            !expired
        });
        if removed > 0 {
            tracing::debug!(removed, remaining = self.sessions.len(), "Expired sessions purged");
        }
        removed
    }
}

/// Purge expired sessions every `every` until the task is dropped.
pub async fn sweep_expired(store: Arc<dyn SessionStore>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        store.purge_expired();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lifecycle() {
        let store = InMemorySessionStore::new();
        let id = store.create();
        assert!(store.exists(&id));
        assert!(store.get(&id, "k").is_none());

        assert!(store.set(&id, "k", Arc::new(7u32)));
        let value = store.get(&id, "k").unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&7));

        store.invalidate(&id);
        assert!(!store.exists(&id));
        assert!(store.get(&id, "k").is_none());
    }

    #[test]
    fn test_set_on_unknown_session_fails() {
        let store = InMemorySessionStore::new();
        let ghost = SessionId::new("nope");
        assert!(!store.set(&ghost, "k", Arc::new(1u8)));
        assert!(store.get_or_insert_with(&ghost, "k", &|| Arc::new(1u8) as Attribute).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_or_insert_keeps_first_value() {
        let store = InMemorySessionStore::new();
        let id = store.create();
        let first = store.get_or_insert_with(&id, "k", &|| Arc::new(1u32) as Attribute).unwrap();
        let second = store.get_or_insert_with(&id, "k", &|| Arc::new(2u32) as Attribute).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.downcast_ref::<u32>(), Some(&1));
    }

    #[test]
    fn test_idle_session_expires_on_access() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(30));
        let id = store.create();
        assert!(store.set(&id, "k", Arc::new(1u8)));

        std::thread::sleep(Duration::from_millis(80));
        assert!(store.get(&id, "k").is_none());
        assert!(!store.exists(&id));
        assert!(store.is_empty());
        assert!(!store.set(&id, "k", Arc::new(2u8)));
    }

    #[test]
    fn test_access_keeps_session_alive() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(200));
        let id = store.create();
        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(80));
            assert!(store.exists(&id));
        }
    }

    #[test]
    fn test_purge_removes_only_idle_sessions() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(50));
        for _ in 0..10 {
            store.create();
        }
        std::thread::sleep(Duration::from_millis(100));
        let fresh = store.create();

        assert_eq!(store.purge_expired(), 10);
        assert_eq!(store.len(), 1);
        assert!(store.exists(&fresh));
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_purges_periodically() {
        let store = Arc::new(InMemorySessionStore::with_idle_timeout(Duration::from_millis(10)));
        store.create();
        store.create();

        let task = tokio::spawn(sweep_expired(store.clone(), Duration::from_millis(20)));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.is_empty());
        task.abort();
    }

    #[test]
    fn test_ids_are_unique() {
        let store = InMemorySessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
