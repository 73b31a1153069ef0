//! Subscription registry and flush loop.

use crate::repo::Table;
use log::{debug, warn};
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

pub type SubscriptionId = u64;

/// Upper bound on re-evaluation passes within one flush. Subscribers that keep
/// writing in response to their own notifications are cut off here.
pub const MAX_FLUSH_PASSES: usize = 32;

pub(crate) type Evaluator = Rc<RefCell<dyn FnMut(&Connection)>>;

struct Registration {
    tables: BTreeSet<Table>,
    evaluator: Evaluator,
}

/// In-process registry of live queries, single-threaded by construction.
#[derive(Default)]
pub struct LiveRegistry {
    next_id: Cell<SubscriptionId>,
    registrations: RefCell<BTreeMap<SubscriptionId, Registration>>,
    dirty: RefCell<BTreeSet<Table>>,
    flushing: Cell<bool>,
}

impl LiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registrations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.borrow().is_empty()
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.registrations.borrow().contains_key(&id)
    }

    pub(crate) fn register(&self, tables: &[Table], evaluator: Evaluator) -> SubscriptionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.registrations.borrow_mut().insert(
            id,
            Registration {
                tables: tables.iter().copied().collect(),
                evaluator,
            },
        );
        debug!("event=live_subscribe module=live status=ok subscription_id={id}");
        id
    }

    pub(crate) fn unregister(&self, id: SubscriptionId) -> bool {
        // Dropped outside the borrow: the closure may own other handles.
        let removed = self.registrations.borrow_mut().remove(&id);
        if removed.is_some() {
            debug!("event=live_unsubscribe module=live status=ok subscription_id={id}");
        }
        removed.is_some()
    }

    pub(crate) fn mark_dirty(&self, tables: &[Table]) {
        self.dirty.borrow_mut().extend(tables.iter().copied());
    }

    /// First evaluation of a freshly registered query. Writes made by its
    /// callback are flushed afterwards, so the new query sees them too.
    pub(crate) fn evaluate_new(&self, evaluator: &Evaluator, conn: &Connection) {
        if self.flushing.get() {
            (&mut *evaluator.borrow_mut())(conn);
            return;
        }
        {
            self.flushing.set(true);
            let _guard = FlushGuard(&self.flushing);
            (&mut *evaluator.borrow_mut())(conn);
        }
        self.flush(conn);
    }

    /// Re-evaluates every live query reading a dirty table until no table is
    /// dirty. A call made while a flush is already running returns at once;
    /// the running flush picks up the new dirtiness.
    pub(crate) fn flush(&self, conn: &Connection) {
        if self.flushing.replace(true) {
            return;
        }
        let _guard = FlushGuard(&self.flushing);

        let mut passes = 0;
        loop {
            let dirty = std::mem::take(&mut *self.dirty.borrow_mut());
            if dirty.is_empty() {
                break;
            }
            if passes == MAX_FLUSH_PASSES {
                warn!(
                    "event=live_flush module=live status=error error_code=pass_limit passes={passes} dropped_tables={}",
                    dirty.len()
                );
                break;
            }
            passes += 1;

            let affected: Vec<(SubscriptionId, Evaluator)> = self
                .registrations
                .borrow()
                .iter()
                .filter(|(_, registration)| !registration.tables.is_disjoint(&dirty))
                .map(|(id, registration)| (*id, Rc::clone(&registration.evaluator)))
                .collect();

            for (id, evaluator) in affected {
                if !self.contains(id) {
                    continue;
                }
                match evaluator.try_borrow_mut() {
                    Ok(mut evaluate) => (&mut *evaluate)(conn),
                    Err(_) => {
                        debug!("event=live_flush module=live status=skip subscription_id={id} reason=busy");
                    }
                }
            }
        }
    }
}

struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
