//! Logical scopes and their disposal handles
//!
//! A scope is active from `begin` until its guard is disposed. Every record
//! logged meanwhile carries a snapshot of the active scope states, oldest
//! first. Guards release their scope exactly once no matter how many threads
//! dispose them.

use super::error::{LoggerError, Result};
use super::state::State;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Something that releases a resource when disposed
pub trait Dispose: Send + Sync {
    /// Release the resource; calls after the first are no-ops
    fn dispose(&self) -> Result<()>;
}

type Action = Box<dyn FnOnce() -> Result<()> + Send>;

/// Runs a closure on first disposal
pub struct DisposeAction {
    action: Mutex<Option<Action>>,
}

impl DisposeAction {
    pub fn new(action: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.lock().is_none()
    }
}

impl Dispose for DisposeAction {
    fn dispose(&self) -> Result<()> {
        // Held while the action runs so concurrent callers return only after it completes
        let mut slot = self.action.lock();
        match slot.take() {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

/// Disposes every member, reporting all member failures together
pub struct AggregateDisposable {
    members: Vec<ScopeGuard>,
}

impl AggregateDisposable {
    pub fn new(members: Vec<ScopeGuard>) -> Self {
        Self { members }
    }
}

impl Dispose for AggregateDisposable {
    fn dispose(&self) -> Result<()> {
        let errors: Vec<Arc<LoggerError>> = self
            .members
            .iter()
            .filter_map(|member| member.dispose().err())
            .map(Arc::new)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::aggregate(
                "One or more errors occurred while disposing scopes.",
                errors,
            ))
        }
    }
}

/// Handle returned by `begin_scope`; disposes on drop
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ScopeGuard {
    inner: Box<dyn Dispose>,
}

impl ScopeGuard {
    pub fn new(inner: impl Dispose + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Guard that releases nothing
    pub fn noop() -> Self {
        Self::new(DisposeAction::new(|| Ok(())))
    }

    pub fn dispose(&self) -> Result<()> {
        self.inner.dispose()
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.inner.dispose() {
            eprintln!("[LOGGER ERROR] Failed to dispose scope: {}", e);
        }
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ScopeTable {
    next_id: AtomicU64,
    entries: RwLock<BTreeMap<u64, State>>,
}

/// Active scopes of one logger
///
/// Ids grow monotonically, so iterating the map yields insertion order even
/// when scopes end out of order.
#[derive(Clone, Default)]
pub struct ScopeTracker {
    table: Arc<ScopeTable>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already normalized scope state
    pub fn begin(&self, state: State) -> ScopeGuard {
        let id = {
            let mut entries = self.table.entries.write();
            let id = self.table.next_id.fetch_add(1, Ordering::Relaxed);
            entries.insert(id, state);
            id
        };

        let table = Arc::clone(&self.table);
        ScopeGuard::new(DisposeAction::new(move || {
            table.entries.write().remove(&id);
            Ok(())
        }))
    }

    /// Active scope states, oldest first
    pub fn snapshot(&self) -> Vec<State> {
        self.table.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.read().is_empty()
    }
}
