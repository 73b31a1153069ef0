//! Settings use-case service.
//!
//! # Responsibility
//! - Read and update the current settings row.
//! - Publish the current row as a live query.
//!
//! # Invariants
//! - The current row is the first one by id; extra rows are ignored.
//! - Updating while no row exists changes nothing.

use crate::live::{LiveQuery, QueryState};
use crate::model::now_epoch_ms;
use crate::model::settings::{NewSettings, Settings, SettingsPatch};
use crate::model::RecordId;
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::{RepoError, RepoResult, Table};
use crate::store::Store;
use log::info;

/// Use-case service for the settings singleton.
pub struct SettingsService<'s> {
    store: &'s Store,
}

impl<'s> SettingsService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn current(&self) -> RepoResult<Option<Settings>> {
        self.store
            .read(|conn| SqliteSettingsRepository::new(conn).current())
    }

    /// Current values, or the built-in defaults when no row exists.
    pub fn effective(&self) -> RepoResult<NewSettings> {
        Ok(self.current()?.map_or_else(Settings::defaults, |settings| NewSettings {
            total_budget: settings.total_budget,
            currency: settings.currency,
            currency_symbol: settings.currency_symbol,
            month_start_day: settings.month_start_day,
        }))
    }

    pub fn add(&self, settings: &NewSettings) -> RepoResult<RecordId> {
        let id = self.store.write(&[Table::Settings], |conn| {
            SqliteSettingsRepository::new(conn).add(settings, now_epoch_ms())
        })?;
        info!("event=settings_add module=service status=ok settings_id={id}");
        Ok(id)
    }

    /// Merges `patch` into a specific settings row.
    pub fn update(&self, id: RecordId, patch: &SettingsPatch) -> RepoResult<()> {
        self.store.write(&[Table::Settings], |conn| {
            SqliteSettingsRepository::new(conn).update(id, patch, now_epoch_ms())
        })
    }

    /// Merges `patch` into the current row.
    ///
    /// Returns the updated id, or `None` when there is no row to update.
    pub fn update_current(&self, patch: &SettingsPatch) -> RepoResult<Option<RecordId>> {
        let updated = self.store.write(&[Table::Settings], |conn| {
            let repo = SqliteSettingsRepository::new(conn);
            let Some(current) = repo.current()? else {
                return Ok::<_, RepoError>(None);
            };
            repo.update(current.id, patch, now_epoch_ms())?;
            Ok(Some(current.id))
        })?;
        if updated.is_none() {
            info!("event=settings_update module=service status=skip reason=no_settings_row");
        }
        Ok(updated)
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.store.write(&[Table::Settings], |conn| {
            SqliteSettingsRepository::new(conn).delete(id)
        })
    }

    /// Live view of the current row. `Ready(None)` means no row exists.
    pub fn subscribe(
        &self,
        on_change: impl FnMut(&QueryState<Option<Settings>>) + 'static,
    ) -> LiveQuery<Option<Settings>> {
        self.store.subscribe(
            &[Table::Settings],
            |conn| SqliteSettingsRepository::new(conn).current(),
            on_change,
        )
    }

    pub fn watch(&self) -> LiveQuery<Option<Settings>> {
        self.store.watch(&[Table::Settings], |conn| {
            SqliteSettingsRepository::new(conn).current()
        })
    }
}
