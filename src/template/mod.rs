pub mod batch;
pub mod dump;

use std::io::Read;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::core::{
    AccessError, CallbackResult, ItemData, NodeData, Result, Value, convert_access_error,
};
use crate::query::{QueryOutcome, QueryStatement};
use crate::session::binding::{self, BindingContext};
use crate::session::guard::GuardedSession;
use crate::session::{Session, SessionFactory};

pub use batch::BatchResults;

/// Helper that simplifies repository data access code.
///
/// Runs caller-supplied callbacks against sessions of a content repository:
/// resolves a session (reusing one bound to the given [`BindingContext`], or
/// creating a fresh one when `allow_create` permits), invokes the callback,
/// translates any failure into the unified [`AccessError`] taxonomy and
/// releases the session only if this call created it.
///
/// ```ignore
/// let template = RepoTemplate::new(factory).allow_create(true);
/// let ctx = BindingContext::new();
///
/// let title = template.execute(&ctx, |session| {
///     let node = session.item("/content/articles/first")?;
///     Ok(node.path().to_string())
/// })?;
/// ```
pub struct RepoTemplate {
    factory: Arc<dyn SessionFactory>,
    allow_create: bool,
    expose_native_session: bool,
}

impl RepoTemplate {
    /// Create a template over `factory` with the default policies: never
    /// create a session outside a bound context, and hand callbacks the
    /// guarded session rather than the raw one.
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            allow_create: false,
            expose_native_session: false,
        }
    }

    /// Allow creating a fresh session when no bound session exists.
    pub fn allow_create(mut self, allow: bool) -> Self {
        self.allow_create = allow;
        self
    }

    /// Hand callbacks the raw session instead of the logout-suppressing guard.
    pub fn expose_native_session(mut self, expose: bool) -> Self {
        self.expose_native_session = expose;
        self
    }

    pub fn is_allow_create(&self) -> bool {
        self.allow_create
    }

    pub fn is_expose_native_session(&self) -> bool {
        self.expose_native_session
    }

    pub fn factory(&self) -> &Arc<dyn SessionFactory> {
        &self.factory
    }

    /// Run `action` against a session, using the configured
    /// `expose_native_session` default.
    pub fn execute<R, F>(&self, ctx: &BindingContext, action: F) -> Result<R>
    where
        F: FnOnce(&dyn Session) -> CallbackResult<R>,
    {
        self.execute_with(ctx, self.expose_native_session, action)
    }

    /// Run `action` against a session.
    ///
    /// A session this call creates is additionally bound to `ctx` for the
    /// duration of the call, so nested executions sharing the context reuse
    /// it; the release at this call's exit unbinds and closes it. A session
    /// that was already bound before this call is left untouched on every
    /// exit path.
    pub fn execute_with<R, F>(&self, ctx: &BindingContext, expose_native: bool, action: F) -> Result<R>
    where
        F: FnOnce(&dyn Session) -> CallbackResult<R>,
    {
        let (session, pre_bound) = binding::resolve_session(&self.factory, ctx, self.allow_create)?;

        if !pre_bound {
            if let Err(err) = ctx.bind(&self.factory, Arc::clone(&session)) {
                session.logout();
                return Err(err);
            }
        }

        // Releases on every exit path, including callback panics.
        let lease = SessionLease {
            session: Arc::clone(&session),
            factory: &self.factory,
            ctx,
            pre_bound,
        };

        let outcome = if expose_native {
            action(session.as_ref())
        } else {
            let guarded = GuardedSession::new(Arc::clone(&session));
            action(&guarded)
        };

        drop(lease);
        outcome.map_err(convert_access_error)
    }

    // =========================================================================
    // Convenience delegations: one repository operation per call, raw session.
    // =========================================================================

    pub fn attribute(&self, ctx: &BindingContext, name: &str) -> Result<Option<Value>> {
        self.execute_with(ctx, true, |session| Ok(session.attribute(name)))
    }

    pub fn attribute_names(&self, ctx: &BindingContext) -> Result<Vec<String>> {
        self.execute_with(ctx, true, |session| Ok(session.attribute_names()))
    }

    pub fn add_lock_token(&self, ctx: &BindingContext, token: &str) -> Result<()> {
        self.execute_with(ctx, true, |session| {
            session.add_lock_token(token);
            Ok(())
        })
    }

    pub fn remove_lock_token(&self, ctx: &BindingContext, token: &str) -> Result<()> {
        self.execute_with(ctx, true, |session| {
            session.remove_lock_token(token);
            Ok(())
        })
    }

    pub fn lock_tokens(&self, ctx: &BindingContext) -> Result<Vec<String>> {
        self.execute_with(ctx, true, |session| Ok(session.lock_tokens()))
    }

    pub fn item(&self, ctx: &BindingContext, path: &str) -> Result<ItemData> {
        self.execute_with(ctx, true, |session| Ok(session.item(path)?))
    }

    pub fn item_exists(&self, ctx: &BindingContext, path: &str) -> Result<bool> {
        self.execute_with(ctx, true, |session| Ok(session.item_exists(path)?))
    }

    pub fn root_node(&self, ctx: &BindingContext) -> Result<NodeData> {
        self.execute_with(ctx, true, |session| Ok(session.root_node()?))
    }

    pub fn node_by_id(&self, ctx: &BindingContext, id: &Uuid) -> Result<NodeData> {
        self.execute_with(ctx, true, |session| Ok(session.node_by_id(id)?))
    }

    pub fn move_item(&self, ctx: &BindingContext, src_path: &str, dest_path: &str) -> Result<()> {
        self.execute_with(ctx, true, |session| Ok(session.move_item(src_path, dest_path)?))
    }

    /// Rename the node at `path` in place: moves it under the same parent with
    /// the new name.
    pub fn rename(&self, ctx: &BindingContext, path: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() || new_name.contains('/') {
            return Err(AccessError::InvalidArgument(format!(
                "invalid node name '{new_name}'"
            )));
        }
        let Some((parent, name)) = path.rsplit_once('/') else {
            return Err(AccessError::InvalidArgument(format!(
                "'{path}' is not an absolute path"
            )));
        };
        if name.is_empty() {
            return Err(AccessError::InvalidArgument(
                "the root node cannot be renamed".to_string(),
            ));
        }
        let dest = format!("{parent}/{new_name}");
        self.move_item(ctx, path, &dest)
    }

    pub fn save(&self, ctx: &BindingContext) -> Result<()> {
        self.execute_with(ctx, true, |session| Ok(session.save()?))
    }

    pub fn refresh(&self, ctx: &BindingContext, keep_changes: bool) -> Result<()> {
        self.execute_with(ctx, true, |session| Ok(session.refresh(keep_changes)?))
    }

    pub fn has_pending_changes(&self, ctx: &BindingContext) -> Result<bool> {
        self.execute_with(ctx, true, |session| Ok(session.has_pending_changes()?))
    }

    /// Import serialized content below `parent_path`, consuming `input`.
    pub fn import_content(
        &self,
        ctx: &BindingContext,
        parent_path: &str,
        input: &mut dyn Read,
    ) -> Result<()> {
        self.execute_with(ctx, true, |session| {
            Ok(session.import_content(parent_path, input)?)
        })
    }

    pub fn is_live(&self, ctx: &BindingContext) -> Result<bool> {
        self.execute_with(ctx, true, |session| Ok(session.is_live()))
    }

    /// Execute a single query under the default query language.
    pub fn query(&self, ctx: &BindingContext, statement: &str) -> Result<QueryOutcome> {
        self.query_with_language(ctx, statement, None)
    }

    /// Execute a single query, using `language` or the default when omitted.
    pub fn query_with_language(
        &self,
        ctx: &BindingContext,
        statement: &str,
        language: Option<&str>,
    ) -> Result<QueryOutcome> {
        if statement.is_empty() {
            return Err(AccessError::InvalidArgument(
                "statement must not be empty".to_string(),
            ));
        }
        let query = match language {
            Some(lang) => QueryStatement::with_language(statement, lang),
            None => QueryStatement::new(statement),
        };
        debug!("executing query '{}' [{}]", query.statement(), query.resolved_language());
        self.execute_with(ctx, true, |session| {
            Ok(session.run_query(query.statement(), query.resolved_language())?)
        })
    }
}

/// RAII guard for a resolved session.
///
/// Leaves a pre-bound session untouched and releases a session the current
/// call created, unbinding it from the context first so the binder closes it.
struct SessionLease<'a> {
    session: Arc<dyn Session>,
    factory: &'a Arc<dyn SessionFactory>,
    ctx: &'a BindingContext,
    pre_bound: bool,
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        if self.pre_bound {
            debug!("leaving pre-bound session open after template execution");
            return;
        }
        self.ctx.unbind(self.factory);
        binding::release_session(&self.session, self.factory, self.ctx);
    }
}
