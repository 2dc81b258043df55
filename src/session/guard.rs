use std::hash::{Hash, Hasher};
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use super::Session;
use crate::core::{ItemData, NodeData, SessionResult, Value};
use crate::query::QueryOutcome;

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

/// Logout-suppressing decorator around a session.
///
/// Callbacks must not be able to terminate a session the execution engine
/// still owns and intends to reuse or release itself. Every operation
/// forwards verbatim to the wrapped session, and failures propagate
/// unchanged; only [`logout`](Session::logout) is intercepted and turned into
/// a no-op. Equality and hashing follow the wrapper's own identity, not the
/// underlying session's.
pub struct GuardedSession {
    inner: Arc<dyn Session>,
    id: u64,
}

impl GuardedSession {
    pub fn new(inner: Arc<dyn Session>) -> Self {
        Self {
            inner,
            id: NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl Session for GuardedSession {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.inner.attribute(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.inner.attribute_names()
    }

    fn add_lock_token(&self, token: &str) {
        self.inner.add_lock_token(token)
    }

    fn remove_lock_token(&self, token: &str) {
        self.inner.remove_lock_token(token)
    }

    fn lock_tokens(&self) -> Vec<String> {
        self.inner.lock_tokens()
    }

    fn move_item(&self, src_path: &str, dest_path: &str) -> SessionResult<()> {
        self.inner.move_item(src_path, dest_path)
    }

    fn save(&self) -> SessionResult<()> {
        self.inner.save()
    }

    fn refresh(&self, keep_changes: bool) -> SessionResult<()> {
        self.inner.refresh(keep_changes)
    }

    fn has_pending_changes(&self) -> SessionResult<bool> {
        self.inner.has_pending_changes()
    }

    fn root_node(&self) -> SessionResult<NodeData> {
        self.inner.root_node()
    }

    fn item(&self, path: &str) -> SessionResult<ItemData> {
        self.inner.item(path)
    }

    fn item_exists(&self, path: &str) -> SessionResult<bool> {
        self.inner.item_exists(path)
    }

    fn node_by_id(&self, id: &Uuid) -> SessionResult<NodeData> {
        self.inner.node_by_id(id)
    }

    fn run_query(&self, statement: &str, language: &str) -> SessionResult<QueryOutcome> {
        self.inner.run_query(statement, language)
    }

    fn import_content(&self, parent_path: &str, input: &mut dyn Read) -> SessionResult<()> {
        self.inner.import_content(parent_path, input)
    }

    fn is_live(&self) -> bool {
        self.inner.is_live()
    }

    /// Suppressed: closing is reserved for the code that created the session.
    fn logout(&self) {
        debug!("suppressing logout call on guarded session");
    }
}

impl PartialEq for GuardedSession {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GuardedSession {}

impl Hash for GuardedSession {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for GuardedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedSession").field("id", &self.id).finish()
    }
}
