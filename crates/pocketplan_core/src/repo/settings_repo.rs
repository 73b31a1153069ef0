//! Settings repository contracts and SQLite implementation.

use super::{parse_month_start_day, RepoError, RepoResult, Table};
use crate::model::settings::{NewSettings, Settings, SettingsPatch};
use crate::model::{EpochMillis, RecordId};
use rusqlite::{params, Connection, Row};

const SETTINGS_SELECT_SQL: &str = "SELECT
    id,
    total_budget,
    currency,
    currency_symbol,
    month_start_day,
    created_at,
    updated_at
FROM settings";

/// Repository interface for the settings table.
pub trait SettingsRepository {
    fn add(&self, settings: &NewSettings, now: EpochMillis) -> RepoResult<RecordId>;
    fn update(&self, id: RecordId, patch: &SettingsPatch, now: EpochMillis) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Settings>>;
    /// First row by id, the one treated as current.
    fn current(&self) -> RepoResult<Option<Settings>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn add(&self, settings: &NewSettings, now: EpochMillis) -> RepoResult<RecordId> {
        settings.validate()?;

        self.conn.execute(
            "INSERT INTO settings (
                total_budget,
                currency,
                currency_symbol,
                month_start_day,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                settings.total_budget,
                settings.currency.as_str(),
                settings.currency_symbol.as_str(),
                settings.month_start_day,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: RecordId, patch: &SettingsPatch, now: EpochMillis) -> RepoResult<()> {
        let mut settings = self.get(id)?.ok_or(RepoError::NotFound {
            table: Table::Settings,
            id,
        })?;
        settings.apply(patch);
        settings.validate()?;

        let changed = self.conn.execute(
            "UPDATE settings
             SET
                total_budget = ?1,
                currency = ?2,
                currency_symbol = ?3,
                month_start_day = ?4,
                updated_at = ?5
             WHERE id = ?6;",
            params![
                settings.total_budget,
                settings.currency.as_str(),
                settings.currency_symbol.as_str(),
                settings.month_start_day,
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Settings,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM settings WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Settings>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SETTINGS_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_settings_row(row)?));
        }
        Ok(None)
    }

    fn current(&self) -> RepoResult<Option<Settings>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SETTINGS_SELECT_SQL} ORDER BY id ASC LIMIT 1;"))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_settings_row(row)?));
        }
        Ok(None)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get::<_, i64>(0))?;
        Ok(count.max(0) as u64)
    }
}

fn parse_settings_row(row: &Row<'_>) -> RepoResult<Settings> {
    Ok(Settings {
        id: row.get("id")?,
        total_budget: row.get("total_budget")?,
        currency: row.get("currency")?,
        currency_symbol: row.get("currency_symbol")?,
        month_start_day: parse_month_start_day(row.get("month_start_day")?)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
