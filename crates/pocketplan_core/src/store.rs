//! Store handle: one SQLite connection plus the live-query registry.
//!
//! # Responsibility
//! - Be the explicit context every service call receives.
//! - Funnel writes so each committed mutation notifies the live queries that
//!   read the touched tables.
//!
//! # Invariants
//! - Notification happens synchronously, after the write returns `Ok`.
//! - A failed write notifies nobody.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::live::registry::Evaluator;
use crate::live::{LiveQuery, LiveRegistry, QueryState};
use crate::repo::Table;
use log::{debug, warn};
use rusqlite::Connection;
use std::cell::RefCell;
use std::fmt::Display;
use std::path::Path;
use std::rc::Rc;

/// Process-local record store.
pub struct Store {
    conn: Connection,
    live: Rc<LiveRegistry>,
}

impl Store {
    /// Opens (or creates) a database file with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_migrated(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_migrated(open_db_in_memory()?))
    }

    fn from_migrated(conn: Connection) -> Self {
        Self {
            conn,
            live: Rc::new(LiveRegistry::new()),
        }
    }

    /// Raw connection for read-only access.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of registered live queries.
    pub fn live_query_count(&self) -> usize {
        self.live.len()
    }

    /// Runs a read against the current contents.
    pub fn read<T, E>(&self, query: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E> {
        query(&self.conn)
    }

    /// Runs a mutation and, when it succeeds, re-evaluates every live query
    /// reading one of `tables`.
    pub fn write<T, E: Display>(
        &self,
        tables: &[Table],
        mutation: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E> {
        let result = mutation(&self.conn);
        match &result {
            Ok(_) => {
                self.live.mark_dirty(tables);
                self.live.flush(&self.conn);
            }
            Err(err) => {
                debug!("event=store_write module=store status=error error={err}");
            }
        }
        result
    }

    /// Registers a live query without a callback; poll it via
    /// [`LiveQuery::current`].
    pub fn watch<T, E, Q>(&self, tables: &[Table], query: Q) -> LiveQuery<T>
    where
        T: Clone + PartialEq + 'static,
        E: Display + 'static,
        Q: Fn(&Connection) -> Result<T, E> + 'static,
    {
        self.subscribe(tables, query, |_: &QueryState<T>| {})
    }

    /// Registers a live query over `tables`.
    ///
    /// The query runs immediately; `on_change` receives the first ready value
    /// and then every value that differs from the previously delivered one.
    pub fn subscribe<T, E, Q, C>(&self, tables: &[Table], query: Q, mut on_change: C) -> LiveQuery<T>
    where
        T: Clone + PartialEq + 'static,
        E: Display + 'static,
        Q: Fn(&Connection) -> Result<T, E> + 'static,
        C: FnMut(&QueryState<T>) + 'static,
    {
        let state = Rc::new(RefCell::new(QueryState::Pending));
        let latest = Rc::clone(&state);
        let evaluator: Evaluator = Rc::new(RefCell::new(move |conn: &Connection| {
            let next = match query(conn) {
                Ok(value) => QueryState::Ready(value),
                Err(err) => {
                    warn!("event=live_evaluate module=live status=error error={err}");
                    QueryState::Pending
                }
            };
            if *latest.borrow() == next {
                return;
            }
            latest.replace(next.clone());
            on_change(&next);
        }));

        let id = self.live.register(tables, Rc::clone(&evaluator));
        self.live.evaluate_new(&evaluator, &self.conn);
        LiveQuery::new(id, state, Rc::downgrade(&self.live))
    }
}
