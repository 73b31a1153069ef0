use chrono::{NaiveDate, NaiveDateTime};
use pocketplan_core::db::open_db_in_memory;
use pocketplan_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use pocketplan_core::repo::expense_repo::{
    ExpenseListQuery, ExpenseRepository, SqliteExpenseRepository,
};
use pocketplan_core::repo::project_repo::{
    ProjectListQuery, ProjectRepository, SqliteProjectRepository,
};
use pocketplan_core::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use pocketplan_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use pocketplan_core::repo::SortDirection;
use pocketplan_core::{
    CategoryPatch, ExpensePatch, ModelValidationError, NewCategory, NewExpense,
    NewProject, NewSettings, NewTask, Priority, ProjectScope, ProjectStatus, RepoError, Settings,
    SettingsPatch, Table, TaskPatch,
};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn category(name: &str, percentage: f64) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        icon: "🍔".to_string(),
        color: "#84cc16".to_string(),
        allocated: 0.0,
        percentage,
    }
}

fn expense(category_id: i64, amount: f64, date: NaiveDateTime) -> NewExpense {
    NewExpense {
        category_id,
        amount,
        note: String::new(),
        date,
    }
}

fn project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: String::new(),
        color: "#60a5fa".to_string(),
        priority: Priority::Medium,
        status: ProjectStatus::Active,
    }
}

#[test]
fn add_stamps_created_and_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::new(&conn);

    let id = repo.add(&category("Food", 30.0), 1_000).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Food");
    assert_eq!(loaded.created_at, 1_000);
    assert_eq!(loaded.updated_at, 1_000);
}

#[test]
fn update_merges_fields_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::new(&conn);
    let id = repo.add(&category("Food", 30.0), 1_000).unwrap();

    let patch = CategoryPatch {
        name: Some("Groceries".to_string()),
        ..CategoryPatch::default()
    };
    repo.update(id, &patch, 2_000).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Groceries");
    assert_eq!(loaded.percentage, 30.0);
    assert_eq!(loaded.created_at, 1_000);
    assert_eq!(loaded.updated_at, 2_000);
}

#[test]
fn update_of_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExpenseRepository::new(&conn);

    let err = repo
        .update(42, &ExpensePatch::default(), 1_000)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        RepoError::NotFound {
            table: Table::Expenses,
            id: 42
        }
    ));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    let id = repo.add(&project("Home"), 1_000).unwrap();

    assert!(repo.delete(id).unwrap());
    assert!(!repo.delete(id).unwrap());
    assert!(repo.get(id).unwrap().is_none());
}

#[test]
fn ids_are_monotonic_and_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::new(&conn);

    let first = repo.add(&category("A", 10.0), 1).unwrap();
    let second = repo.add(&category("B", 10.0), 1).unwrap();
    repo.delete(second).unwrap();
    let third = repo.add(&category("C", 10.0), 1).unwrap();

    assert!(first < second);
    assert!(second < third);
}

#[test]
fn validation_rejects_blank_names_and_bad_colors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::new(&conn);

    let err = repo.add(&category("   ", 10.0), 1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::BlankField("name"))
    ));

    let mut css_color = category("Dates", 10.0);
    css_color.color = "#fff".to_string();
    assert!(repo.add(&css_color, 1).is_ok());

    let mut bad_color = category("Food", 10.0);
    bad_color.color = "#12".to_string();
    let err = repo.add(&bad_color, 1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::InvalidColor(_))
    ));
}

#[test]
fn settings_reject_month_start_day_out_of_range() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    let settings = NewSettings {
        month_start_day: 32,
        ..Settings::defaults()
    };
    let err = repo.add(&settings, 1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::MonthStartDayOutOfRange(32))
    ));

    let id = repo.add(&Settings::defaults(), 1).unwrap();
    let patch = SettingsPatch {
        month_start_day: Some(0),
        ..SettingsPatch::default()
    };
    assert!(repo.update(id, &patch, 2).is_err());
    assert_eq!(repo.get(id).unwrap().unwrap().month_start_day, 1);
}

#[test]
fn current_settings_is_the_first_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);
    assert!(repo.current().unwrap().is_none());

    let first = repo.add(&Settings::defaults(), 1).unwrap();
    let other = NewSettings {
        total_budget: 1.0,
        ..Settings::defaults()
    };
    repo.add(&other, 2).unwrap();

    assert_eq!(repo.current().unwrap().unwrap().id, first);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn expense_date_range_is_inclusive_on_both_ends() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExpenseRepository::new(&conn);
    repo.add(&expense(1, 10.0, at(2024, 2, 29, 23)), 1).unwrap();
    let on_start = repo.add(&expense(1, 20.0, at(2024, 3, 1, 0)), 1).unwrap();
    let on_end = repo.add(&expense(1, 30.0, at(2024, 3, 31, 0)), 1).unwrap();
    repo.add(&expense(1, 40.0, at(2024, 3, 31, 1)), 1).unwrap();

    let listed = repo
        .list(&ExpenseListQuery::between(at(2024, 3, 1, 0), at(2024, 3, 31, 0)))
        .unwrap();

    let ids: Vec<i64> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![on_start, on_end]);
}

#[test]
fn expenses_filter_by_category_and_sort_by_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExpenseRepository::new(&conn);
    let late = repo.add(&expense(7, 10.0, at(2024, 3, 9, 8)), 1).unwrap();
    let early = repo.add(&expense(7, 20.0, at(2024, 3, 2, 8)), 1).unwrap();
    repo.add(&expense(8, 30.0, at(2024, 3, 5, 8)), 1).unwrap();

    let query = ExpenseListQuery {
        category_id: Some(7),
        order: SortDirection::Descending,
        ..ExpenseListQuery::default()
    };
    let ids: Vec<i64> = repo.list(&query).unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![late, early]);

    let newest: Vec<i64> = repo
        .list(&ExpenseListQuery::newest_first())
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(newest.len(), 3);
    assert_eq!(newest[0], late);
}

#[test]
fn non_finite_amount_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExpenseRepository::new(&conn);

    let err = repo
        .add(&expense(1, f64::NAN, at(2024, 3, 1, 0)), 1)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::NonFiniteNumber("amount"))
    ));
}

#[test]
fn dangling_category_reference_is_stored() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExpenseRepository::new(&conn);

    let id = repo.add(&expense(999, 5.0, at(2024, 3, 1, 0)), 1).unwrap();
    assert_eq!(repo.get(id).unwrap().unwrap().category_id, 999);
}

#[test]
fn projects_list_newest_first_and_filter_by_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    let older = repo.add(&project("Older"), 1_000).unwrap();
    let newer = repo.add(&project("Newer"), 2_000).unwrap();
    let mut archived = project("Archived");
    archived.status = ProjectStatus::Archived;
    let archived_id = repo.add(&archived, 3_000).unwrap();

    let all: Vec<i64> = repo
        .list(&ProjectListQuery::default())
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(all, vec![archived_id, newer, older]);

    let active = repo
        .list(&ProjectListQuery {
            status: Some(ProjectStatus::Active),
        })
        .unwrap();
    assert_eq!(active.len(), 2);
}

#[test]
fn tasks_filter_by_scope_completion_and_due_range() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut in_project = NewTask::titled("plan trip");
    in_project.project_id = Some(3);
    in_project.due_date = Some(at(2024, 3, 10, 9));
    let planned = repo.add(&in_project, 1, 1).unwrap();

    let mut done = NewTask::titled("pay rent");
    done.completed = true;
    done.due_date = Some(at(2024, 3, 1, 9));
    let paid = repo.add(&done, 0, 1).unwrap();

    let loose = repo.add(&NewTask::titled("read"), 2, 1).unwrap();

    let in_scope: Vec<i64> = repo
        .list(&TaskListQuery::for_project(3))
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(in_scope, vec![planned]);

    let unassigned: Vec<i64> = repo
        .list(&TaskListQuery {
            project: ProjectScope::Unassigned,
            ..TaskListQuery::default()
        })
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(unassigned, vec![paid, loose]);

    let open = repo
        .list(&TaskListQuery {
            completed: Some(false),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(open.len(), 2);

    let due_early_march = repo
        .list(&TaskListQuery {
            due_from: Some(at(2024, 3, 1, 0)),
            due_before: Some(at(2024, 3, 10, 0)),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(due_early_march.len(), 1);
    assert_eq!(due_early_march[0].id, paid);
}

#[test]
fn task_nullable_fields_can_be_cleared() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let mut draft = NewTask::titled("call bank");
    draft.project_id = Some(1);
    draft.due_date = Some(at(2024, 3, 5, 10));
    let id = repo.add(&draft, 0, 1).unwrap();

    let patch = TaskPatch {
        project_id: Some(None),
        due_date: Some(None),
        ..TaskPatch::default()
    };
    repo.update(id, &patch, 2).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.project_id, None);
    assert_eq!(loaded.due_date, None);
    assert_eq!(loaded.title, "call bank");
}

#[test]
fn reorder_assigns_positions_and_skips_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let a = repo.add(&NewTask::titled("a"), 0, 1).unwrap();
    let b = repo.add(&NewTask::titled("b"), 1, 1).unwrap();
    let c = repo.add(&NewTask::titled("c"), 2, 1).unwrap();
    assert_eq!(repo.max_order().unwrap(), Some(2));

    let updated = repo.reorder(&[c, 404, a, b], 5).unwrap();
    assert_eq!(updated, 3);

    let ordered: Vec<(i64, i64)> = repo
        .list(&TaskListQuery::default())
        .unwrap()
        .iter()
        .map(|t| (t.id, t.order))
        .collect();
    assert_eq!(ordered, vec![(c, 0), (a, 2), (b, 3)]);
}

#[test]
fn max_order_of_empty_table_is_none() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(SqliteTaskRepository::new(&conn).max_order().unwrap(), None);
}

#[test]
fn bulk_task_writes_join_the_callers_transaction() {
    let mut conn = open_db_in_memory().unwrap();
    let (a, b) = {
        let repo = SqliteTaskRepository::new(&conn);
        let mut in_project = NewTask::titled("a");
        in_project.project_id = Some(9);
        (
            repo.add(&in_project, 0, 1).unwrap(),
            repo.add(&NewTask::titled("b"), 1, 1).unwrap(),
        )
    };

    let tx = conn.transaction().unwrap();
    {
        let repo = SqliteTaskRepository::new(&tx);
        assert_eq!(repo.reorder(&[b, a], 2).unwrap(), 2);
        assert_eq!(repo.delete_by_project(9).unwrap(), 1);
    }
    tx.rollback().unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    let ordered: Vec<(i64, i64)> = repo
        .list(&TaskListQuery::default())
        .unwrap()
        .iter()
        .map(|t| (t.id, t.order))
        .collect();
    assert_eq!(ordered, vec![(a, 0), (b, 1)]);
}
