//! Associates sessions with the current logical unit of work.
//!
//! A [`BindingContext`] stands for an ambient execution context (typically an
//! active transaction) and holds at most one session per session factory. The
//! surrounding transactional infrastructure creates the context and binds a
//! session for its duration; the resolve/release functions here query and
//! respect that binding.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;

use super::{Session, SessionFactory};
use crate::core::{AccessError, Result};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Explicit binding context, passed by parameter wherever the original design
/// would consult thread-local state.
///
/// Holds at most one bound session per factory; bindings are keyed by factory
/// identity, so clones of the same `Arc` address the same slot.
pub struct BindingContext {
    id: u64,
    bound: Mutex<HashMap<usize, Arc<dyn Session>>>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            bound: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Register `session` as the bound session for `factory`.
    ///
    /// Fails if the factory slot is already occupied: a context owns at most
    /// one session per factory.
    pub fn bind(
        &self,
        factory: &Arc<dyn SessionFactory>,
        session: Arc<dyn Session>,
    ) -> Result<()> {
        let mut bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        let key = factory_key(factory);
        if bound.contains_key(&key) {
            return Err(AccessError::InvalidArgument(format!(
                "a session is already bound to context {} for this factory",
                self.id
            )));
        }
        debug!("binding session to context {}", self.id);
        bound.insert(key, session);
        Ok(())
    }

    /// Remove and return the session bound for `factory`, if any.
    pub fn unbind(&self, factory: &Arc<dyn SessionFactory>) -> Option<Arc<dyn Session>> {
        let mut bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        bound.remove(&factory_key(factory))
    }

    /// The session currently bound for `factory`, if any.
    pub fn bound_session(&self, factory: &Arc<dyn SessionFactory>) -> Option<Arc<dyn Session>> {
        let bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        bound.get(&factory_key(factory)).cloned()
    }

    /// Whether `session` is the session bound for `factory`. Side-effect-free
    /// and idempotent.
    pub fn is_bound(&self, factory: &Arc<dyn SessionFactory>, session: &Arc<dyn Session>) -> bool {
        let bound = self.bound.lock().unwrap_or_else(|e| e.into_inner());
        bound
            .get(&factory_key(factory))
            .is_some_and(|held| Arc::ptr_eq(held, session))
    }
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingContext").field("id", &self.id).finish()
    }
}

/// Bindings are keyed by factory allocation identity.
fn factory_key(factory: &Arc<dyn SessionFactory>) -> usize {
    Arc::as_ptr(factory) as *const () as usize
}

/// Resolve a session for `factory` under `ctx`.
///
/// Returns the bound session when one exists (`pre_bound = true`). Otherwise
/// creates a fresh session via the factory when `allow_create` permits it
/// (`pre_bound = false`), or fails with [`AccessError::ResourceUnavailable`]
/// without attempting creation.
pub fn resolve_session(
    factory: &Arc<dyn SessionFactory>,
    ctx: &BindingContext,
    allow_create: bool,
) -> Result<(Arc<dyn Session>, bool)> {
    if let Some(session) = ctx.bound_session(factory) {
        debug!("found session bound to context {}", ctx.id());
        return Ok((session, true));
    }
    if !allow_create {
        return Err(AccessError::ResourceUnavailable);
    }
    debug!("opening new session for context {}", ctx.id());
    let session = factory
        .session()
        .map_err(AccessError::ResourceAccessFailure)?;
    Ok((session, false))
}

/// Release `session` unless the context owns its lifecycle.
///
/// A session bound to `ctx` is left untouched; anything else is logged out
/// immediately.
pub fn release_session(
    session: &Arc<dyn Session>,
    factory: &Arc<dyn SessionFactory>,
    ctx: &BindingContext,
) {
    if ctx.is_bound(factory, session) {
        debug!(
            "not closing session owned by context {}",
            ctx.id()
        );
        return;
    }
    debug!("closing session");
    session.logout();
}

/// Whether `session` is bound to `ctx` for `factory` (and hence part of an
/// existing unit of work).
pub fn is_session_bound(
    session: &Arc<dyn Session>,
    factory: &Arc<dyn SessionFactory>,
    ctx: &BindingContext,
) -> bool {
    ctx.is_bound(factory, session)
}
