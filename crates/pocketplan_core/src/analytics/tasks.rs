//! Task views: due-today, overdue and the productivity score.

use crate::model::task::Task;
use chrono::{Duration, NaiveDate, NaiveTime};

/// Tasks due in `[today 00:00, tomorrow 00:00)`, completed or not.
pub fn today_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let start = today.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    tasks
        .iter()
        .filter(|task| task.due_date.is_some_and(|due| due >= start && due < end))
        .cloned()
        .collect()
}

/// Open tasks due before today's midnight.
pub fn overdue_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let start = today.and_time(NaiveTime::MIN);
    tasks
        .iter()
        .filter(|task| !task.completed && task.due_date.is_some_and(|due| due < start))
        .cloned()
        .collect()
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

pub fn pending_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}

/// Completed share of all tasks, rounded to a whole percent.
///
/// With no tasks at all the score is 100: nothing tracked counts as fully
/// productive.
pub fn productivity_score(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 100;
    }
    let ratio = completed_count(tasks) as f64 / tasks.len() as f64;
    (ratio * 100.0).round() as u32
}
