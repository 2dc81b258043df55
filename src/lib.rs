// ============================================================================
// Noderepo Library
// ============================================================================
//
// Data-access templates for hierarchical content repositories. The template
// executor resolves a session bound to the current unit of work (or creates
// one), runs a caller-supplied callback against it behind a logout-suppressing
// guard, translates failures into a unified taxonomy and releases the session
// only if the call created it.

pub mod core;
pub mod query;
pub mod session;
pub mod template;


// Re-export main types for convenience
pub use crate::core::{
    AccessError, CallbackError, CallbackResult, ItemData, NodeData, Property, PropertyValues,
    RepositoryError, Result, SessionResult, Value, convert_access_error,
};
pub use crate::query::{DEFAULT_QUERY_LANGUAGE, QueryOutcome, QueryStatement};
pub use crate::session::binding::{
    BindingContext, is_session_bound, release_session, resolve_session,
};
pub use crate::session::guard::GuardedSession;
pub use crate::session::{Session, SessionFactory};
pub use crate::template::dump::dump_node;
pub use crate::template::{BatchResults, RepoTemplate};
