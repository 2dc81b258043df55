pub mod binding;
pub mod guard;

use std::io::Read;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::{ItemData, NodeData, SessionResult, Value};
use crate::query::QueryOutcome;

/// A live, stateful handle to a content repository connection.
///
/// The subset of repository operations exercised by this crate. A session is
/// owned exclusively by whichever component created it until release: nothing
/// else may call [`logout`](Session::logout). The template executor enforces
/// this by handing callbacks a [`guard::GuardedSession`] unless the raw
/// session is explicitly requested.
pub trait Session: Send + Sync {
    /// Session attribute set at login time, if present.
    fn attribute(&self, name: &str) -> Option<Value>;

    fn attribute_names(&self) -> Vec<String>;

    fn add_lock_token(&self, token: &str);

    fn remove_lock_token(&self, token: &str);

    fn lock_tokens(&self) -> Vec<String>;

    /// Move the item at `src_path` (and its subgraph) to `dest_path`.
    fn move_item(&self, src_path: &str, dest_path: &str) -> SessionResult<()>;

    /// Persist pending changes to the repository.
    fn save(&self) -> SessionResult<()>;

    /// Discard (or keep, per `keep_changes`) pending changes and re-read
    /// repository state.
    fn refresh(&self, keep_changes: bool) -> SessionResult<()>;

    fn has_pending_changes(&self) -> SessionResult<bool>;

    fn root_node(&self) -> SessionResult<NodeData>;

    fn item(&self, path: &str) -> SessionResult<ItemData>;

    fn item_exists(&self, path: &str) -> SessionResult<bool>;

    fn node_by_id(&self, id: &Uuid) -> SessionResult<NodeData>;

    /// Execute `statement` under the given (already resolved) query language.
    fn run_query(&self, statement: &str, language: &str) -> SessionResult<QueryOutcome>;

    /// Import serialized content below `parent_path`, consuming `input` to the
    /// end. Read failures surface as [`RepositoryError::Io`].
    ///
    /// [`RepositoryError::Io`]: crate::core::RepositoryError::Io
    fn import_content(&self, parent_path: &str, input: &mut dyn Read) -> SessionResult<()>;

    fn is_live(&self) -> bool;

    /// Terminate the session. Releasing is reserved for the code that created
    /// the session; callback code only ever sees this as a guarded no-op.
    fn logout(&self);
}

/// Produces sessions for a repository.
///
/// Whether a given session is bound to a context is answered by
/// [`binding::is_session_bound`], keyed by factory identity.
pub trait SessionFactory: Send + Sync {
    fn session(&self) -> SessionResult<Arc<dyn Session>>;
}
