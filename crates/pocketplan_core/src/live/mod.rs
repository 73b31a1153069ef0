//! Live (subscription-based) queries over the record store.
//!
//! # Responsibility
//! - Track which tables each live query reads.
//! - Re-evaluate affected queries after every committed write and push the
//!   fresh value to subscribers when it changed.
//!
//! # Invariants
//! - A failing query is delivered as [`QueryState::Pending`], never as a stale
//!   value.
//! - A cancelled or dropped [`LiveQuery`] is never evaluated again.
//! - Writes issued from inside a subscriber callback are folded into the
//!   running flush instead of starting a nested one.

pub(crate) mod registry;

pub use registry::{LiveRegistry, SubscriptionId, MAX_FLUSH_PASSES};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Latest result of a live query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// No data yet: the query has not produced a value or its last run failed.
    Pending,
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }
}

impl<T: Default> QueryState<T> {
    /// The ready value, or the empty default while pending.
    pub fn or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Handle to a registered live query.
///
/// Dropping the handle (or calling [`LiveQuery::cancel`]) unregisters it.
pub struct LiveQuery<T> {
    id: SubscriptionId,
    state: Rc<RefCell<QueryState<T>>>,
    registry: Weak<LiveRegistry>,
}

impl<T> LiveQuery<T> {
    pub(crate) fn new(
        id: SubscriptionId,
        state: Rc<RefCell<QueryState<T>>>,
        registry: Weak<LiveRegistry>,
    ) -> Self {
        Self {
            id,
            state,
            registry,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the query is still registered with its store.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Stops notifications. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl<T: Clone> LiveQuery<T> {
    /// Latest delivered state.
    pub fn current(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}
