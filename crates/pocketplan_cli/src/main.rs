//! Inspection CLI over a pocketplan store.
//!
//! # Responsibility
//! - Open a store file (or an in-memory one) and run one command against it.
//! - Print human-readable output; errors go to stderr with a non-zero exit.

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::info;
use pocketplan_core::{
    default_log_level, format_currency, init_logging, parse_record_id, seed_default_data,
    AnalyticsService, CategoryService, ExpenseService, NewExpense, SettingsService, Store,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "pocketplan")]
#[command(about = "Inspect and maintain a pocketplan budget store")]
struct Cli {
    /// SQLite database file. In-memory when omitted.
    #[arg(long, env = "POCKETPLAN_DB")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date.
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Month window, category breakdown, weekly spend and productivity.
    Summary,
    /// Insert default settings, categories and a sample project.
    Seed,
    /// Record an expense dated now (or on --today).
    AddExpense(AddExpenseArgs),
    /// Normalize category percentages against the budget.
    Rebalance,
}

#[derive(Args, Debug)]
struct AddExpenseArgs {
    #[arg(long)]
    category: String,
    #[arg(long)]
    amount: f64,
    #[arg(long, default_value = "")]
    note: String,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{raw}`: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let store = match cli.db.as_ref() {
        Some(path) => Store::open(path)?,
        None => Store::open_in_memory()?,
    };
    let now = match cli.today {
        Some(today) => today.and_time(Local::now().time()),
        None => Local::now().naive_local(),
    };

    match cli.command {
        Command::Summary => print_summary(&store, now.date()),
        Command::Seed => seed(&store, now),
        Command::AddExpense(args) => add_expense(&store, args, now),
        Command::Rebalance => rebalance(&store),
    }
}

fn print_summary(store: &Store, today: NaiveDate) -> CliResult<()> {
    let symbol = SettingsService::new(store).effective()?.currency_symbol;
    let window = ExpenseService::new(store).current_month_window(today)?;
    let summary = AnalyticsService::new(store).summary(today)?;

    println!("month {} .. {}", window.start, window.end);
    println!(
        "budget {}  spent {}  saved {}  savings rate {:.1}%",
        format_currency(summary.total_budget, &symbol),
        format_currency(summary.total_spent, &symbol),
        format_currency(summary.total_saved, &symbol),
        summary.savings_rate
    );
    for row in &summary.category_breakdown {
        let marker = if row.is_overspent() { "  OVER" } else { "" };
        println!(
            "  {:<14} {:>12} of {:>12}  {:>5.1}%{marker}",
            row.category.name,
            format_currency(row.spent, &symbol),
            format_currency(row.category.allocated, &symbol),
            row.percent_spent
        );
    }
    for week in &summary.weekly {
        println!(
            "  {} ({} .. {}) {}",
            week.label,
            week.start,
            week.end,
            format_currency(week.spent, &symbol)
        );
    }
    println!(
        "productivity {}%  completed {}  pending {}",
        summary.productivity_score, summary.completed_tasks, summary.pending_tasks
    );
    Ok(())
}

fn seed(store: &Store, now: NaiveDateTime) -> CliResult<()> {
    if seed_default_data(store, now)? {
        println!("seeded default data");
    } else {
        println!("store already initialized; nothing to seed");
    }
    Ok(())
}

fn add_expense(store: &Store, args: AddExpenseArgs, now: NaiveDateTime) -> CliResult<()> {
    let category_id = parse_record_id(&args.category)
        .ok_or_else(|| format!("invalid category id `{}`", args.category))?;
    let id = ExpenseService::new(store).add(&NewExpense {
        category_id,
        amount: args.amount,
        note: args.note,
        date: now,
    })?;
    info!("event=cli_add_expense module=cli status=ok expense_id={id}");
    println!("added expense {id}");
    Ok(())
}

fn rebalance(store: &Store) -> CliResult<()> {
    let budget = SettingsService::new(store).effective()?.total_budget;
    let count = CategoryService::new(store).rebalance(budget)?;
    println!("rebalanced {count} categories against {budget}");
    Ok(())
}
