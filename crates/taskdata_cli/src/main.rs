mod cli;

use clap::Parser;
use cli::{Cli, Command, ListCommand, overrides_from_cli};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdata_core::config::{self, Settings};
use taskdata_core::error::AppError;
use taskdata_core::logging;
use taskdata_core::model::{Category, DayOfWeek, RecurrenceType, Task};
use taskdata_core::report::{ProductivityReport, ProductivityStats};
use taskdata_core::storage::{DataFormat, Repository, create_repository};
use taskdata_core::task_api::{self, NewRecurrence, NewTask};
use taskdata_core::timefmt;
use tracing::{debug, warn};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Repeats")]
    repeats: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Completed")]
    completed: usize,
    #[tabled(rename = "Pending")]
    pending: usize,
    #[tabled(rename = "Overdue")]
    overdue: usize,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Avg Hours")]
    average_hours: String,
}

impl StatsRow {
    fn new(scope: String, stats: &ProductivityStats) -> Self {
        Self {
            scope,
            total: stats.total_tasks,
            completed: stats.completed_tasks,
            pending: stats.pending_tasks,
            overdue: stats.overdue_tasks,
            rate: format!("{:.1}%", stats.completion_rate * 100.0),
            average_hours: format!("{:.1}", stats.average_completion_hours),
        }
    }
}

fn timestamp(value: time::OffsetDateTime) -> String {
    timefmt::format_timestamp(value).unwrap_or_else(|_| "-".to_string())
}

fn category_label(task: &Task) -> String {
    match (task.category(), task.category_id()) {
        (Some(category), _) => category.name().to_string(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "-".to_string(),
    }
}

fn repeats_label(task: &Task) -> String {
    match task.recurrence() {
        Some(pattern) if pattern.is_recurring() => {
            format!("{} x{}", pattern.recurrence_type(), pattern.interval())
        }
        _ => "-".to_string(),
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    let recurrence = task.recurrence().map(|pattern| {
        serde_json::json!({
            "type": pattern.recurrence_type(),
            "interval": pattern.interval(),
            "days_of_week": pattern.days_of_week(),
            "occurrence_count": pattern.occurrence_count(),
            "end_date": pattern.end_date().map(timestamp),
        })
    });
    serde_json::json!({
        "id": task.id(),
        "title": task.title(),
        "description": task.description(),
        "due_date": timestamp(task.due_date()),
        "created_at": timestamp(task.created_at()),
        "completed_at": task.completed_at().map(timestamp),
        "priority": task.priority(),
        "status": task.status(),
        "category_id": task.category_id(),
        "category": task.category().map(|category| category.name()),
        "recurrence": recurrence,
        "tags": task.tags(),
    })
}

fn category_json(category: &Category) -> serde_json::Value {
    serde_json::json!({
        "id": category.id(),
        "name": category.name(),
        "description": category.description(),
        "color": category.color(),
        "created_at": timestamp(category.created_at()),
    })
}

fn print_tasks(tasks: &[Task], json: bool) {
    if json {
        let payload: Vec<_> = tasks.iter().map(task_json).collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id(),
        title: task.title().to_string(),
        due: timestamp(task.due_date()),
        priority: task.priority().to_string(),
        status: task.status().to_string(),
        category: category_label(task),
        repeats: repeats_label(task),
        tags: task.tags().join(", "),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn print_categories(categories: &[Category], json: bool) {
    if json {
        let payload: Vec<_> = categories.iter().map(category_json).collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }
    if categories.is_empty() {
        println!("No categories.");
        return;
    }

    let rows = categories.iter().map(|category| CategoryRow {
        id: category.id(),
        name: category.name().to_string(),
        color: category.color().to_string(),
        description: category.description().to_string(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn category_name(categories: &[Category], id: u32) -> String {
    categories
        .iter()
        .find(|category| category.id() == id)
        .map(|category| category.name().to_string())
        .unwrap_or_else(|| format!("#{id}"))
}

fn print_report(
    report: &ProductivityReport,
    categories: &[Category],
    json: bool,
    detailed: bool,
) -> Result<(), AppError> {
    if json {
        let to_value = |stats: &ProductivityStats| {
            serde_json::to_value(stats).map_err(|err| AppError::invalid_data(err.to_string()))
        };
        let mut per_category = Vec::new();
        for (id, stats) in report.by_category() {
            per_category.push(serde_json::json!({
                "category_id": id,
                "category": category_name(categories, *id),
                "stats": to_value(stats)?,
            }));
        }
        println!(
            "{}",
            serde_json::json!({
                "from": timestamp(report.start()),
                "to": timestamp(report.end()),
                "overall": to_value(report.overall())?,
                "categories": per_category,
                "performance": report.performance(),
                "efficiency_score": report.overall().efficiency_score(),
            })
        );
        return Ok(());
    }
    if detailed {
        print!("{}", report.detailed()?);
        return Ok(());
    }

    let mut rows = vec![StatsRow::new("All tasks".to_string(), report.overall())];
    rows.extend(
        report
            .by_category()
            .iter()
            .map(|(id, stats)| StatsRow::new(category_name(categories, *id), stats)),
    );
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!(
        "Tasks due {} to {}",
        timestamp(report.start()),
        timestamp(report.end())
    );
    println!("{table}");
    if let Some(performance) = report.performance() {
        println!("Performance: {performance}");
    }
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Config file, then `TASKDATA_DIR`, then command-line flags.
fn resolve_settings(cli: &Cli) -> Result<(Settings, Option<AppError>), AppError> {
    let loaded = config::load_config_with_fallback();
    let with_env = config::apply_env(&loaded.config);
    let merged = config::merge_overrides(&with_env, &overrides_from_cli(cli)?);
    Ok((merged.resolve()?, loaded.error))
}

fn open_repository(settings: &Settings) -> Result<Box<dyn Repository>, AppError> {
    debug!(folder = %settings.data_folder.display(), format = %settings.format, "opening repository");
    create_repository(settings.format, &settings.data_folder)
}

fn new_recurrence(
    repeat: Option<String>,
    interval: u32,
    days: Vec<String>,
    count: u32,
    until: Option<String>,
) -> Result<Option<NewRecurrence>, AppError> {
    let Some(repeat) = repeat else {
        if !days.is_empty() || until.is_some() {
            return Err(AppError::invalid_input("--days and --until require --repeat"));
        }
        return Ok(None);
    };
    let kind: RecurrenceType = repeat.parse()?;
    if kind == RecurrenceType::None {
        return Ok(None);
    }
    let days_of_week = days
        .iter()
        .map(|day| day.parse::<DayOfWeek>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(NewRecurrence {
        kind,
        interval,
        days_of_week,
        occurrence_count: count,
        end_date: until,
    }))
}

fn run_command(cli: Cli, settings: &Settings) -> Result<(), AppError> {
    match cli.command {
        Command::AddCategory {
            name,
            description,
            color,
        } => {
            let repository = open_repository(settings)?;
            let category = task_api::add_category(repository.as_ref(), &name, &description, &color)?;
            if cli.json {
                println!("{}", category_json(&category));
            } else {
                println!("Added category: {} ({})", category.name(), category.id());
            }
        }
        Command::AddTask {
            title,
            description,
            due,
            priority,
            category,
            tags,
            repeat,
            interval,
            days,
            count,
            until,
        } => {
            let new_task = NewTask {
                title,
                description,
                due,
                priority: priority.parse()?,
                category_id: category,
                tags,
                recurrence: new_recurrence(repeat, interval, days, count, until)?,
            };
            let repository = open_repository(settings)?;
            let task = task_api::add_task(repository.as_ref(), new_task)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} ({})", task.title(), task.id());
            }
        }
        Command::List { list } => {
            let repository = open_repository(settings)?;
            match list {
                ListCommand::Tasks => print_tasks(&task_api::list_tasks(repository.as_ref()), cli.json),
                ListCommand::Categories => {
                    print_categories(&task_api::list_categories(repository.as_ref()), cli.json)
                }
            }
        }
        Command::Convert {
            from,
            to,
            target_dir,
        } => {
            let from: DataFormat = from.parse()?;
            let to: DataFormat = to.parse()?;
            let target_folder = target_dir
                .as_deref()
                .map(Path::new)
                .unwrap_or(settings.data_folder.as_path());
            if from == to && target_folder == settings.data_folder.as_path() {
                return Err(AppError::invalid_input(
                    "source and target are the same; pass a different --to or --target-dir",
                ));
            }

            let source = create_repository(from, &settings.data_folder)?;
            let target = create_repository(to, target_folder)?;
            let summary = task_api::convert(source.as_ref(), target.as_ref())?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "from": from,
                        "to": to,
                        "tasks": summary.tasks,
                        "categories": summary.categories,
                    })
                );
            } else {
                println!(
                    "Converted {} tasks and {} categories from {} to {}",
                    summary.tasks, summary.categories, from, to
                );
            }
        }
        Command::Report { from, to, detailed } => {
            let repository = open_repository(settings)?;
            let report = task_api::productivity_report(repository.as_ref(), &from, &to)?;
            let categories = task_api::list_categories(repository.as_ref());
            print_report(&report, &categories, cli.json, detailed)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let (settings, config_error) = match resolve_settings(&cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };
    logging::init_subscriber(settings.log_level);
    if let Some(err) = config_error {
        warn!(error = %err, "ignoring unreadable config file");
    }

    if let Err(err) = run_command(cli, &settings) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
