use chrono::{NaiveDate, NaiveDateTime};
use pocketplan_core::analytics::{spent_by_category, TimeRange};
use pocketplan_core::{
    seed_default_data, AnalyticsService, Category, CategoryService, ExpenseService, NewCategory,
    NewExpense, NewSettings, QueryState, Settings, SettingsPatch, SettingsService, Store,
    TaskService,
};
use std::cell::RefCell;
use std::rc::Rc;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn noon(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0).unwrap()
}

fn category(name: &str, percentage: f64) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        icon: "💰".to_string(),
        color: "#a3e635".to_string(),
        allocated: 0.0,
        percentage,
    }
}

fn add_categories(store: &Store, percentages: &[f64]) -> Vec<i64> {
    let service = CategoryService::new(store);
    percentages
        .iter()
        .enumerate()
        .map(|(index, pct)| service.add(&category(&format!("c{index}"), *pct)).unwrap())
        .collect()
}

fn allocations(store: &Store) -> Vec<(f64, f64)> {
    CategoryService::new(store)
        .list()
        .unwrap()
        .iter()
        .map(|c| (c.percentage, c.allocated))
        .collect()
}

#[test]
fn rebalance_keeps_percentages_that_already_sum_to_100() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[10.0, 20.0, 30.0, 40.0]);

    let rewritten = CategoryService::new(&store).rebalance(1000.0).unwrap();

    assert_eq!(rewritten, 4);
    assert_eq!(
        allocations(&store),
        vec![(10.0, 100.0), (20.0, 200.0), (30.0, 300.0), (40.0, 400.0)]
    );
}

#[test]
fn rebalance_normalizes_to_100() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[5.0, 5.0]);

    CategoryService::new(&store).rebalance(200.0).unwrap();

    assert_eq!(allocations(&store), vec![(50.0, 100.0), (50.0, 100.0)]);
}

#[test]
fn rebalance_is_a_fixed_point() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[1.0, 1.0, 2.0]);
    let service = CategoryService::new(&store);

    service.rebalance(12_345.0).unwrap();
    let once = allocations(&store);
    service.rebalance(12_345.0).unwrap();

    assert_eq!(allocations(&store), once);
}

#[test]
fn rebalance_with_all_zero_percentages_splits_equally() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[0.0, 0.0, 0.0, 0.0]);

    CategoryService::new(&store).rebalance(1000.0).unwrap();

    assert_eq!(allocations(&store), vec![(25.0, 250.0); 4]);
}

#[test]
fn rebalance_without_categories_is_a_no_op() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(CategoryService::new(&store).rebalance(1000.0).unwrap(), 0);
}

#[test]
fn rebalance_notifies_category_subscribers_once() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[1.0, 3.0]);
    let deliveries: Rc<RefCell<Vec<Vec<Category>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&deliveries);
    let service = CategoryService::new(&store);
    let _live = service.subscribe(move |state: &QueryState<Vec<Category>>| {
        if let Some(categories) = state.as_ready() {
            sink.borrow_mut().push(categories.clone());
        }
    });

    service.rebalance(400.0).unwrap();

    let deliveries = deliveries.borrow();
    assert_eq!(deliveries.len(), 2);
    let percentages: Vec<f64> = deliveries[1].iter().map(|c| c.percentage).collect();
    assert_eq!(percentages, vec![25.0, 75.0]);
}

#[test]
fn set_percentage_derives_allocation_without_touching_others() {
    let store = Store::open_in_memory().unwrap();
    let ids = add_categories(&store, &[50.0, 50.0]);

    CategoryService::new(&store)
        .set_percentage(ids[0], 30.0, 50_000.0)
        .unwrap();

    assert_eq!(allocations(&store), vec![(30.0, 15_000.0), (50.0, 0.0)]);
}

#[test]
fn recompute_allocations_keeps_percentages() {
    let store = Store::open_in_memory().unwrap();
    add_categories(&store, &[30.0, 30.0]);

    CategoryService::new(&store)
        .recompute_allocations(1000.0)
        .unwrap();

    assert_eq!(allocations(&store), vec![(30.0, 300.0), (30.0, 300.0)]);
}

#[test]
fn spent_by_category_sums_matching_ids_only() {
    let store = Store::open_in_memory().unwrap();
    let expenses = ExpenseService::new(&store);
    for (category_id, amount) in [(1, 50.0), (2, 30.0), (1, 20.0)] {
        expenses
            .add(&NewExpense {
                category_id,
                amount,
                note: String::new(),
                date: noon(day(2024, 3, 4)),
            })
            .unwrap();
    }

    let all = expenses.list(&Default::default()).unwrap();
    assert_eq!(spent_by_category(&all, 1), 70.0);
    assert_eq!(spent_by_category(&all, 2), 30.0);
    assert_eq!(spent_by_category(&all, 99), 0.0);
}

#[test]
fn update_current_without_settings_row_changes_nothing() {
    let store = Store::open_in_memory().unwrap();
    let settings = SettingsService::new(&store);

    let updated = settings
        .update_current(&SettingsPatch {
            total_budget: Some(1.0),
            ..SettingsPatch::default()
        })
        .unwrap();

    assert_eq!(updated, None);
    assert!(settings.current().unwrap().is_none());
    assert_eq!(settings.effective().unwrap(), Settings::defaults());
}

#[test]
fn update_current_targets_the_first_row() {
    let store = Store::open_in_memory().unwrap();
    let settings = SettingsService::new(&store);
    let id = settings.add(&Settings::defaults()).unwrap();

    let updated = settings
        .update_current(&SettingsPatch {
            total_budget: Some(80_000.0),
            ..SettingsPatch::default()
        })
        .unwrap();

    assert_eq!(updated, Some(id));
    assert_eq!(settings.effective().unwrap().total_budget, 80_000.0);
}

#[test]
fn current_month_window_defaults_to_calendar_month() {
    let store = Store::open_in_memory().unwrap();
    let window = ExpenseService::new(&store)
        .current_month_window(day(2024, 2, 10))
        .unwrap();

    assert_eq!(window.start, day(2024, 2, 1));
    assert_eq!(window.end, day(2024, 2, 29));
}

#[test]
fn seeding_populates_defaults_once() {
    let store = Store::open_in_memory().unwrap();
    let now = noon(day(2024, 3, 10));

    assert!(seed_default_data(&store, now).unwrap());
    assert!(!seed_default_data(&store, now).unwrap());

    let settings = SettingsService::new(&store).current().unwrap().unwrap();
    assert_eq!(settings.total_budget, 50_000.0);
    assert_eq!(settings.currency, "INR");
    assert_eq!(settings.currency_symbol, "₹");
    assert_eq!(settings.month_start_day, 1);

    let categories = CategoryService::new(&store).list().unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Dates", "Accessories", "Savings", "Misc"]);
    let allocated: Vec<f64> = categories.iter().map(|c| c.allocated).collect();
    assert_eq!(allocated, vec![15_000.0, 5_000.0, 5_000.0, 20_000.0, 5_000.0]);
    let total_pct: f64 = categories.iter().map(|c| c.percentage).sum();
    assert_eq!(total_pct, 100.0);

    let tasks = TaskService::new(&store).all().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].order, 0);
    assert_eq!(tasks[1].order, 1);
    assert_eq!(tasks[0].due_date, Some(now));
    assert_eq!(TaskService::new(&store).due_today(day(2024, 3, 10)).unwrap().len(), 1);
}

#[test]
fn seeding_skips_when_settings_exist() {
    let store = Store::open_in_memory().unwrap();
    SettingsService::new(&store)
        .add(&NewSettings {
            total_budget: 1_000.0,
            ..Settings::defaults()
        })
        .unwrap();

    assert!(!seed_default_data(&store, noon(day(2024, 3, 10))).unwrap());
    assert!(CategoryService::new(&store).list().unwrap().is_empty());
}

#[test]
fn summary_combines_month_spend_and_tasks() {
    let store = Store::open_in_memory().unwrap();
    let today = day(2024, 3, 20);
    seed_default_data(&store, noon(day(2024, 3, 10))).unwrap();
    let food = CategoryService::new(&store).list().unwrap()[0].id;
    let expenses = ExpenseService::new(&store);
    for (amount, date) in [
        (1_000.0, day(2024, 3, 18)),
        (500.0, day(2024, 3, 5)),
        (9_999.0, day(2024, 2, 28)),
    ] {
        expenses
            .add(&NewExpense {
                category_id: food,
                amount,
                note: String::new(),
                date: noon(date),
            })
            .unwrap();
    }
    let tasks = TaskService::new(&store);
    let first_task = tasks.all().unwrap()[0].id;
    tasks.toggle(first_task).unwrap();

    let summary = AnalyticsService::new(&store).summary(today).unwrap();

    assert_eq!(summary.total_budget, 50_000.0);
    assert_eq!(summary.total_spent, 1_500.0);
    assert_eq!(summary.total_saved, 48_500.0);
    assert!((summary.savings_rate - 97.0).abs() < 1e-9);
    assert_eq!(summary.category_breakdown.len(), 5);
    let food_row = &summary.category_breakdown[0];
    assert_eq!(food_row.spent, 1_500.0);
    assert_eq!(food_row.remaining, 13_500.0);
    assert!((food_row.percent_spent - 10.0).abs() < 1e-9);
    assert_eq!(summary.weekly.len(), 4);
    assert_eq!(summary.weekly[3].label, "Week 4");
    assert_eq!(summary.weekly[3].spent, 1_000.0);
    assert_eq!(summary.productivity_score, 50);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.pending_tasks, 1);
}

#[test]
fn summary_subscription_tracks_every_source_table() {
    let store = Store::open_in_memory().unwrap();
    let today = day(2024, 3, 20);
    let analytics = AnalyticsService::new(&store);
    let live = analytics.subscribe_summary(today, |_| {});
    assert_eq!(
        live.current().as_ready().map(|s| s.productivity_score),
        Some(100)
    );

    seed_default_data(&store, noon(today)).unwrap();

    let summary = live.current().into_option().unwrap();
    assert_eq!(summary.total_budget, 50_000.0);
    assert_eq!(summary.pending_tasks, 2);
    assert_eq!(summary.productivity_score, 0);
}

#[test]
fn daily_spend_and_ranking_read_through_the_store() {
    let store = Store::open_in_memory().unwrap();
    seed_default_data(&store, noon(day(2024, 3, 10))).unwrap();
    let categories = CategoryService::new(&store).list().unwrap();
    let expenses = ExpenseService::new(&store);
    for (category_id, amount, date) in [
        (categories[1].id, 300.0, day(2024, 3, 9)),
        (categories[0].id, 100.0, day(2024, 3, 10)),
        (404, 50.0, day(2024, 3, 10)),
    ] {
        expenses
            .add(&NewExpense {
                category_id,
                amount,
                note: String::new(),
                date: noon(date),
            })
            .unwrap();
    }
    let analytics = AnalyticsService::new(&store);

    let series = analytics
        .daily_spend(day(2024, 3, 10), TimeRange::Last7Days)
        .unwrap();
    assert_eq!(series.days.len(), 7);
    assert_eq!(series.total, 450.0);
    assert_eq!(series.highest_day, 300.0);

    let ranking = analytics.category_ranking(day(2024, 3, 10), Some(2)).unwrap();
    let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Dates", "Food"]);
}
