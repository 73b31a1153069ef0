//! Budget category use-case service.
//!
//! # Responsibility
//! - Category CRUD routed through the store.
//! - Rebalancing: normalize percentages to 100 and recompute allocations.
//!
//! # Invariants
//! - Rebalance and allocation refresh commit all categories in one
//!   transaction; live queries see either the old or the new set.
//! - Manual edits may leave percentages off 100 until the next rebalance.

use crate::analytics::{allocated_amount, normalize_allocations};
use crate::live::{LiveQuery, QueryState};
use crate::model::category::{Category, CategoryPatch, NewCategory};
use crate::model::{now_epoch_ms, RecordId};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::{RepoError, RepoResult, Table};
use crate::store::Store;
use log::info;
use rusqlite::{Transaction, TransactionBehavior};

/// Use-case service for budget categories.
pub struct CategoryService<'s> {
    store: &'s Store,
}

impl<'s> CategoryService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn add(&self, category: &NewCategory) -> RepoResult<RecordId> {
        self.store.write(&[Table::Categories], |conn| {
            SqliteCategoryRepository::new(conn).add(category, now_epoch_ms())
        })
    }

    pub fn update(&self, id: RecordId, patch: &CategoryPatch) -> RepoResult<()> {
        self.store.write(&[Table::Categories], |conn| {
            SqliteCategoryRepository::new(conn).update(id, patch, now_epoch_ms())
        })
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.store.write(&[Table::Categories], |conn| {
            SqliteCategoryRepository::new(conn).delete(id)
        })
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<Category>> {
        self.store
            .read(|conn| SqliteCategoryRepository::new(conn).get(id))
    }

    pub fn list(&self) -> RepoResult<Vec<Category>> {
        self.store.read(|conn| SqliteCategoryRepository::new(conn).list())
    }

    /// Sets one category's percentage and derives its allocation from
    /// `total_budget`. Other categories are left untouched.
    pub fn set_percentage(
        &self,
        id: RecordId,
        percentage: f64,
        total_budget: f64,
    ) -> RepoResult<()> {
        let patch = CategoryPatch::allocation(percentage, allocated_amount(percentage, total_budget));
        self.update(id, &patch)
    }

    /// Normalizes all percentages to sum to 100 and recomputes every
    /// allocation against `total_budget`.
    ///
    /// All-zero percentages fall back to an equal split. Returns the number
    /// of categories rewritten.
    pub fn rebalance(&self, total_budget: f64) -> RepoResult<usize> {
        let count = self.store.write(&[Table::Categories], |conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            let repo = SqliteCategoryRepository::new(&tx);
            let categories = repo.list()?;
            let percentages: Vec<f64> = categories.iter().map(|c| c.percentage).collect();
            let allocations = normalize_allocations(&percentages, total_budget);

            let now = now_epoch_ms();
            for (category, allocation) in categories.iter().zip(&allocations) {
                let patch = CategoryPatch::allocation(allocation.percentage, allocation.allocated);
                repo.update(category.id, &patch, now)?;
            }
            tx.commit()?;
            Ok::<_, RepoError>(categories.len())
        })?;
        info!(
            "event=category_rebalance module=service status=ok categories={count} total_budget={total_budget}"
        );
        Ok(count)
    }

    /// Recomputes every allocation from its current percentage without
    /// normalizing. Used after the total budget changes.
    pub fn recompute_allocations(&self, total_budget: f64) -> RepoResult<usize> {
        let count = self.store.write(&[Table::Categories], |conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            let repo = SqliteCategoryRepository::new(&tx);
            let categories = repo.list()?;
            let now = now_epoch_ms();
            for category in &categories {
                let patch = CategoryPatch {
                    allocated: Some(allocated_amount(category.percentage, total_budget)),
                    ..CategoryPatch::default()
                };
                repo.update(category.id, &patch, now)?;
            }
            tx.commit()?;
            Ok::<_, RepoError>(categories.len())
        })?;
        info!(
            "event=category_recompute module=service status=ok categories={count} total_budget={total_budget}"
        );
        Ok(count)
    }

    /// Live view of all categories in id order.
    pub fn subscribe(
        &self,
        on_change: impl FnMut(&QueryState<Vec<Category>>) + 'static,
    ) -> LiveQuery<Vec<Category>> {
        self.store.subscribe(
            &[Table::Categories],
            |conn| SqliteCategoryRepository::new(conn).list(),
            on_change,
        )
    }

    pub fn watch(&self) -> LiveQuery<Vec<Category>> {
        self.store
            .watch(&[Table::Categories], |conn| SqliteCategoryRepository::new(conn).list())
    }
}
