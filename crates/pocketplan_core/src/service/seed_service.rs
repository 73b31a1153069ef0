//! First-run default data.
//!
//! # Invariants
//! - Seeding happens only while the settings table is empty; the presence of
//!   a settings row marks the store as initialized.
//! - All default rows are committed in one transaction.

use crate::analytics::allocated_amount;
use crate::model::category::NewCategory;
use crate::model::project::{NewProject, ProjectStatus};
use crate::model::settings::Settings;
use crate::model::task::NewTask;
use crate::model::{now_epoch_ms, Priority};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{RepoError, RepoResult, Table};
use crate::store::Store;
use chrono::{Duration, NaiveDateTime};
use log::info;
use rusqlite::{Transaction, TransactionBehavior};

/// `(name, icon, color, percentage)` of the starter categories.
const DEFAULT_CATEGORIES: [(&str, &str, &str, f64); 5] = [
    ("Food", "🍔", "#84cc16", 30.0),
    ("Dates", "💝", "#f472b6", 10.0),
    ("Accessories", "🎧", "#60a5fa", 10.0),
    ("Savings", "💰", "#a3e635", 40.0),
    ("Misc", "📦", "#a78bfa", 10.0),
];

const SAMPLE_PROJECT_NAME: &str = "Personal Goals";

/// Inserts default settings, categories and a sample project with two tasks
/// when the store has never been initialized.
///
/// `now` dates the sample tasks: one due now, one a week later. Returns
/// `false` when a settings row already exists.
pub fn seed_default_data(store: &Store, now: NaiveDateTime) -> RepoResult<bool> {
    let seeded = store.write(&Table::ALL, |conn| {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if SqliteSettingsRepository::new(&tx).count()? > 0 {
            return Ok::<_, RepoError>(false);
        }

        let stamp = now_epoch_ms();
        let settings = Settings::defaults();
        SqliteSettingsRepository::new(&tx).add(&settings, stamp)?;

        let categories = SqliteCategoryRepository::new(&tx);
        for (name, icon, color, percentage) in DEFAULT_CATEGORIES {
            categories.add(
                &NewCategory {
                    name: name.to_string(),
                    icon: icon.to_string(),
                    color: color.to_string(),
                    allocated: allocated_amount(percentage, settings.total_budget),
                    percentage,
                },
                stamp,
            )?;
        }

        let project_id = SqliteProjectRepository::new(&tx).add(
            &NewProject {
                name: SAMPLE_PROJECT_NAME.to_string(),
                description: "Track personal development goals".to_string(),
                color: "#84cc16".to_string(),
                priority: Priority::High,
                status: ProjectStatus::Active,
            },
            stamp,
        )?;

        let tasks = SqliteTaskRepository::new(&tx);
        let samples = [
            ("Review monthly budget", "Check spending patterns", Priority::High, now),
            (
                "Set savings goal",
                "Define target for next month",
                Priority::Medium,
                now + Duration::days(7),
            ),
        ];
        for (order, (title, description, priority, due)) in samples.into_iter().enumerate() {
            tasks.add(
                &NewTask {
                    project_id: Some(project_id),
                    title: title.to_string(),
                    description: description.to_string(),
                    priority,
                    due_date: Some(due),
                    completed: false,
                },
                order as i64,
                stamp,
            )?;
        }

        tx.commit()?;
        Ok(true)
    })?;

    if seeded {
        info!(
            "event=seed_defaults module=service status=ok categories={} project={SAMPLE_PROJECT_NAME}",
            DEFAULT_CATEGORIES.len()
        );
    } else {
        info!("event=seed_defaults module=service status=skip reason=already_initialized");
    }
    Ok(seeded)
}
