//! Productivity statistics over the tasks due in a period.

use crate::error::AppError;
use crate::model::{Priority, Task, TaskStatus};
use crate::timefmt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use time::OffsetDateTime;
use tracing::debug;

/// Share of overdue tasks above which the detailed report asks for focus on deadlines.
const OVERDUE_WARNING_RATE: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductivityStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// `PENDING` plus `IN_PROGRESS`.
    pub pending_tasks: usize,
    /// Not completed or cancelled and due before the report was taken.
    pub overdue_tasks: usize,
    pub completion_rate: f64,
    pub average_completion_hours: f64,
    pub tasks_by_priority: BTreeMap<Priority, usize>,
    pub tasks_by_status: BTreeMap<TaskStatus, usize>,
}

impl ProductivityStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, as_of: OffsetDateTime) -> Self {
        let mut stats = Self::default();
        let mut completion_hours = Vec::new();

        for task in tasks {
            stats.total_tasks += 1;
            *stats.tasks_by_priority.entry(task.priority()).or_default() += 1;
            *stats.tasks_by_status.entry(task.status()).or_default() += 1;

            match task.status() {
                TaskStatus::Completed => {
                    stats.completed_tasks += 1;
                    if let Some(done) = task.completed_at() {
                        completion_hours.push((done - task.created_at()).as_seconds_f64() / 3600.0);
                    }
                }
                TaskStatus::Pending | TaskStatus::InProgress => {
                    stats.pending_tasks += 1;
                    if task.due_date() < as_of {
                        stats.overdue_tasks += 1;
                    }
                }
                TaskStatus::Cancelled => {}
            }
        }

        if stats.total_tasks > 0 {
            stats.completion_rate = stats.completed_tasks as f64 / stats.total_tasks as f64;
        }
        if !completion_hours.is_empty() {
            stats.average_completion_hours =
                completion_hours.iter().sum::<f64>() / completion_hours.len() as f64;
        }
        stats
    }

    pub fn overdue_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        self.overdue_tasks as f64 / self.total_tasks as f64
    }

    /// Completion percentage per average hour to complete.
    pub fn efficiency_score(&self) -> f64 {
        let percent = self.completion_rate * 100.0;
        if self.average_completion_hours > 0.0 {
            percent / self.average_completion_hours
        } else {
            percent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Performance {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Performance {
    pub fn from_rate(completion_rate: f64) -> Self {
        if completion_rate >= 0.8 {
            Self::Excellent
        } else if completion_rate >= 0.6 {
            Self::Good
        } else if completion_rate >= 0.4 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::NeedsImprovement => "NEEDS IMPROVEMENT",
        })
    }
}

/// Stats for tasks due in `[start, end)`, overall and per category id.
///
/// Tasks without a category count toward the overall figures only.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductivityReport {
    start: OffsetDateTime,
    end: OffsetDateTime,
    overall: ProductivityStats,
    by_category: BTreeMap<u32, ProductivityStats>,
}

impl ProductivityReport {
    pub fn build(
        tasks: &[Task],
        start: OffsetDateTime,
        end: OffsetDateTime,
        as_of: OffsetDateTime,
    ) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::invalid_input("end date must be after start date"));
        }

        let in_period: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.due_date() >= start && task.due_date() < end)
            .collect();

        let mut grouped: BTreeMap<u32, Vec<&Task>> = BTreeMap::new();
        for task in &in_period {
            if let Some(id) = task.category_id() {
                grouped.entry(id).or_default().push(*task);
            }
        }
        let by_category = grouped
            .into_iter()
            .map(|(id, tasks)| (id, ProductivityStats::from_tasks(tasks, as_of)))
            .collect();

        debug!(total = tasks.len(), in_period = in_period.len(), "built productivity report");
        Ok(Self {
            start,
            end,
            overall: ProductivityStats::from_tasks(in_period, as_of),
            by_category,
        })
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    pub fn end(&self) -> OffsetDateTime {
        self.end
    }

    pub fn overall(&self) -> &ProductivityStats {
        &self.overall
    }

    pub fn by_category(&self) -> &BTreeMap<u32, ProductivityStats> {
        &self.by_category
    }

    /// `None` when the period holds no tasks.
    pub fn performance(&self) -> Option<Performance> {
        (self.overall.total_tasks > 0).then(|| Performance::from_rate(self.overall.completion_rate))
    }

    pub fn summary(&self) -> Result<String, AppError> {
        let stats = &self.overall;
        let mut out = String::new();
        let _ = writeln!(out, "PRODUCTIVITY REPORT");
        let _ = writeln!(out, "===================");
        let _ = writeln!(
            out,
            "Period: {} to {}\n",
            timefmt::format_timestamp(self.start)?,
            timefmt::format_timestamp(self.end)?
        );

        let _ = writeln!(out, "OVERALL STATISTICS");
        let _ = writeln!(out, "------------------");
        let _ = writeln!(out, "Total Tasks: {}", stats.total_tasks);
        let _ = writeln!(
            out,
            "Completed: {} ({:.1}%)",
            stats.completed_tasks,
            stats.completion_rate * 100.0
        );
        let _ = writeln!(out, "Pending: {}", stats.pending_tasks);
        let _ = writeln!(out, "Overdue: {}", stats.overdue_tasks);
        let _ = writeln!(
            out,
            "Avg Completion Time: {:.1} hours\n",
            stats.average_completion_hours
        );

        if !stats.tasks_by_priority.is_empty() {
            let _ = writeln!(out, "TASKS BY PRIORITY");
            let _ = writeln!(out, "-----------------");
            for (priority, count) in &stats.tasks_by_priority {
                let _ = writeln!(out, "{priority}: {count}");
            }
            out.push('\n');
        }

        if !self.by_category.is_empty() {
            let _ = writeln!(out, "CATEGORY SUMMARY");
            let _ = writeln!(out, "----------------");
            for (id, stats) in &self.by_category {
                let _ = writeln!(out, "Category ID: {id}");
                let _ = writeln!(
                    out,
                    "  Tasks: {} (Completed: {}, Rate: {:.1}%)",
                    stats.total_tasks,
                    stats.completed_tasks,
                    stats.completion_rate * 100.0
                );
            }
        }
        Ok(out)
    }

    /// The summary followed by a per-category breakdown and a performance verdict.
    pub fn detailed(&self) -> Result<String, AppError> {
        let mut out = self.summary()?;
        out.push('\n');

        if !self.by_category.is_empty() {
            let _ = writeln!(out, "DETAILED CATEGORY ANALYSIS");
            let _ = writeln!(out, "--------------------------");
            for (id, stats) in &self.by_category {
                let heading = format!("CATEGORY ID: {id}");
                let _ = writeln!(out, "\n{heading}\n{}", "-".repeat(heading.len()));
                let _ = writeln!(out, "Total Tasks: {}", stats.total_tasks);
                let _ = writeln!(out, "Completed: {}", stats.completed_tasks);
                let _ = writeln!(out, "Pending: {}", stats.pending_tasks);
                let _ = writeln!(out, "Overdue: {}", stats.overdue_tasks);
                let _ = writeln!(out, "Completion Rate: {:.1}%", stats.completion_rate * 100.0);
                let _ = writeln!(
                    out,
                    "Average Completion Time: {:.1} hours",
                    stats.average_completion_hours
                );
                if !stats.tasks_by_priority.is_empty() {
                    let _ = writeln!(out, "Priority Breakdown:");
                    for (priority, count) in &stats.tasks_by_priority {
                        let _ = writeln!(out, "  {priority}: {count}");
                    }
                }
                if !stats.tasks_by_status.is_empty() {
                    let _ = writeln!(out, "Status Breakdown:");
                    for (status, count) in &stats.tasks_by_status {
                        let _ = writeln!(out, "  {status}: {count}");
                    }
                }
            }
        }

        let _ = writeln!(out, "\nPERFORMANCE ANALYSIS");
        let _ = writeln!(out, "--------------------");
        if let Some(performance) = self.performance() {
            let stats = &self.overall;
            let _ = writeln!(out, "Efficiency Score: {:.2}", stats.efficiency_score());
            let _ = writeln!(out, "Performance: {performance}");
            if stats.overdue_tasks > 0 {
                let rate = stats.overdue_rate();
                let _ = writeln!(out, "Overdue Rate: {:.1}%", rate * 100.0);
                if rate > OVERDUE_WARNING_RATE {
                    let _ = writeln!(out, "Recommendation: Focus on meeting deadlines");
                }
            }
        }
        Ok(out)
    }
}
