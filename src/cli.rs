use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{self, Settings};
use crate::error::OffdayError;
use crate::models::offday::{self, OffdayRecord};
use crate::models::viewer::Viewer;
use crate::service::{shared_days, summary, timeline};

#[derive(Parser, Debug)]
#[command(name = "offdayCalendar", about = "Shared off-day calendar views")]
pub struct Cli {
    /// KEY=VALUE settings file (falls back to CONFIG_FILE)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Off-day JSON document
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// First day of the displayed week, e.g. sun or mon (WEEK_START)
    #[arg(long, global = true, value_parser = config::parse_week_start)]
    pub week_start: Option<Weekday>,

    /// IANA time zone used to pick "today" (TIMEZONE)
    #[arg(long = "tz", global = true, value_parser = config::parse_timezone)]
    pub timezone: Option<Tz>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Week-bucketed bars for a month
    Timeline {
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },
    /// Who is off today and tomorrow
    Summary {
        #[arg(long)]
        viewer: Option<String>,
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Days where enough other people are off together
    Shared {
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
        #[arg(long, value_parser = config::parse_threshold)]
        threshold: Option<usize>,
        #[arg(long)]
        viewer: Option<String>,
    },
}

/// `yyyy-MM`, returned as the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected yyyy-MM, got {:?}", value))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected yyyy-MM-dd, got {:?}", value))
}

impl Cli {
    /// Command-line flags win over file and environment settings.
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(path) = &self.data {
            settings.data_location = path.clone();
        }
        if let Some(week_start) = self.week_start {
            settings.week_start = week_start;
        }
        if let Some(tz) = self.timezone {
            settings.timezone = tz;
        }
        settings
    }
}

/// Loads the off-day document and renders the requested view as JSON.
pub fn run(cli: &Cli, settings: &Settings, now: DateTime<Utc>) -> Result<String, OffdayError> {
    let records = offday::load_offdays(&settings.data_location, settings.timezone)?;
    render(&cli.command, &records, settings, now)
}

pub fn render(
    command: &Commands,
    records: &[OffdayRecord],
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<String, OffdayError> {
    let today = now.with_timezone(&settings.timezone).date_naive();
    let json = match command {
        Commands::Timeline { month } => {
            let month = month.unwrap_or(today);
            info!(%month, "rendering timeline");
            let layout = timeline::layout_month(records, month, settings.week_start);
            serde_json::to_string_pretty(&layout)
        }
        Commands::Summary { viewer, today: day } => {
            let viewer = viewer.as_deref().map(|name| Viewer::resolve(name, records));
            let day = day.unwrap_or(today);
            info!(%day, viewer = ?viewer.as_ref().map(|v| v.name.as_str()), "rendering summary");
            let summary = summary::summarize(records, day, viewer.as_ref());
            serde_json::to_string_pretty(&summary)
        }
        Commands::Shared {
            month,
            threshold,
            viewer,
        } => {
            let viewer = viewer.as_deref().map(|name| Viewer::resolve(name, records));
            let month = month.unwrap_or(today);
            let threshold = threshold.unwrap_or(settings.shared_threshold);
            info!(%month, threshold, "rendering shared days");
            let days = shared_days::shared_days(records, month, threshold, viewer.as_ref())?;
            serde_json::to_string_pretty(&days)
        }
    };
    json.map_err(OffdayError::Serialize)
}
