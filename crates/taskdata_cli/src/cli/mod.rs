use clap::{Parser, Subcommand};
use taskdata_core::config::{ConfigOverrides, canonical_key};
use taskdata_core::error::AppError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Folder holding the data files
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<String>,

    /// Storage format: json or csv
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a category
    ///
    /// Example: taskdata add-category Work --color "#FF8800"
    AddCategory {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "#000000")]
        color: String,
    },
    /// Add a task
    ///
    /// Example: taskdata add-task "Write report" --due 2030-01-15 --priority high --tag work
    /// Example: taskdata add-task Standup --repeat weekly --days MONDAY,THURSDAY
    AddTask {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value = "MEDIUM")]
        priority: String,
        /// Category id
        #[arg(long)]
        category: Option<u32>,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// daily, weekly, monthly or yearly
        #[arg(long)]
        repeat: Option<String>,
        #[arg(long, default_value_t = 1)]
        interval: u32,
        /// Comma-separated day names for weekly recurrence
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
        /// Number of occurrences, 0 for no limit
        #[arg(long, default_value_t = 0)]
        count: u32,
        /// Last date the task repeats
        #[arg(long)]
        until: Option<String>,
    },
    /// List stored records
    ///
    /// Example: taskdata list tasks
    /// Example: taskdata list categories --json
    List {
        #[command(subcommand)]
        list: ListCommand,
    },
    /// Copy every task and category into another format
    ///
    /// Example: taskdata convert --from json --to csv
    Convert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Write into this folder instead of the data folder
        #[arg(long = "target-dir", value_name = "DIR")]
        target_dir: Option<String>,
    },
    /// Productivity statistics for tasks due in a period
    ///
    /// Example: taskdata report --from 2030-01-01 --to 2030-01-31
    /// Example: taskdata report --from 2030-01-01 --to 2030-03-31 --detailed
    Report {
        /// Start of the period, inclusive
        #[arg(long)]
        from: String,
        /// End of the period; a bare date covers that whole day
        #[arg(long)]
        to: String,
        /// Print the full text report with per-category breakdowns
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List tasks with their categories
    Tasks,
    /// List categories
    Categories,
}

/// Parse a raw `KEY=VALUE` override string.
pub fn parse_config_override(raw: &str) -> Result<(&'static str, String), AppError> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;

    let key = canonical_key(key_raw)
        .ok_or_else(|| AppError::invalid_input(format!("unknown config field '{}'", key_raw.trim())))?;
    Ok((key, value_raw.trim().to_string()))
}

/// `--config-override` values first, then the dedicated flags on top.
pub fn overrides_from_cli(cli: &Cli) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        let (key, value) = parse_config_override(raw)?;
        overrides.set(key, value)?;
    }
    if let Some(dir) = cli.data_dir.as_ref() {
        overrides.data_dir = Some(dir.clone());
    }
    if let Some(format) = cli.format.as_ref() {
        overrides.format = Some(format.clone());
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::{Cli, overrides_from_cli, parse_config_override};
    use clap::Parser;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Data-Dir = /tmp/x ").unwrap();
        assert_eq!(parsed, ("data_dir", "/tmp/x".to_string()));

        let parsed = parse_config_override("LOG_LEVEL=debug").unwrap();
        assert_eq!(parsed.0, "log_level");
    }

    #[test]
    fn parse_config_override_rejects_bad_input() {
        assert_eq!(
            parse_config_override("format").unwrap_err().code(),
            "invalid_input"
        );
        assert!(parse_config_override("theme=noir").is_err());
    }

    #[test]
    fn report_requires_both_ends_of_the_period() {
        assert!(Cli::try_parse_from(["taskdata", "report", "--from", "2030-01-01"]).is_err());

        let cli = Cli::try_parse_from([
            "taskdata", "report", "--from", "2030-01-01", "--to", "2030-01-31", "--detailed",
        ])
        .unwrap();
        assert!(matches!(cli.command, super::Command::Report { detailed: true, .. }));
    }

    #[test]
    fn dedicated_flags_beat_generic_overrides() {
        let cli = Cli::try_parse_from([
            "taskdata",
            "--config-override",
            "format=json",
            "--config-override",
            "log_level=warn",
            "--format",
            "csv",
            "list",
            "tasks",
        ])
        .unwrap();

        let overrides = overrides_from_cli(&cli).unwrap();
        assert_eq!(overrides.format.as_deref(), Some("csv"));
        assert_eq!(overrides.log_level.as_deref(), Some("warn"));
        assert_eq!(overrides.data_dir, None);
    }

    #[test]
    fn add_task_splits_days() {
        let cli = Cli::try_parse_from([
            "taskdata", "add-task", "Standup", "--repeat", "weekly", "--days", "MONDAY,FRIDAY",
        ])
        .unwrap();
        match cli.command {
            super::Command::AddTask { days, interval, .. } => {
                assert_eq!(days, vec!["MONDAY", "FRIDAY"]);
                assert_eq!(interval, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
