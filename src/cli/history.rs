use std::fmt::Display;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    store::{activity::Activity, persistence::StateStorage, ActivityStore},
    utils::time::{day_label, format_duration, format_time},
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of the range. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\""
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Only show entries whose text contains this value")]
    search: Option<String>,
}

/// Command to process `history`. Renders closed activities grouped by day,
/// most recent first, optionally restricted to a date range or a search term.
pub fn process_history_command<S: StateStorage>(
    store: &mut ActivityStore<S>,
    HistoryCommand {
        start_date,
        end_date,
        date_style,
        search,
    }: HistoryCommand,
) -> Result<()> {
    let range = parse_range(start_date, end_date, date_style)?;

    store.request_history();

    let now = Local::now();

    if let Some(current) = store.current() {
        println!(
            "{} {}  {}",
            Colour::Green.paint("●"),
            current.text,
            Style::new().dimmed().paint(format!(
                "Started {}",
                format_time(current.started_at.with_timezone(&Local))
            )),
        );
        println!();
    }

    let entries: Vec<&Activity> = store
        .history()
        .iter()
        .filter(|activity| range.contains(activity.started_at))
        .filter(|activity| matches_search(activity, search.as_deref()))
        .collect();

    if entries.is_empty() {
        println!("No activities yet");
        return Ok(());
    }

    for (label, group) in group_by_day(&entries, now) {
        println!("{}", Style::new().bold().paint(label));
        for activity in group {
            println!("  {}", render_row(activity));
        }
        println!();
    }

    println!(
        "{} {}",
        entries.len(),
        if entries.len() == 1 {
            "activity"
        } else {
            "activities"
        }
    );
    Ok(())
}

struct HistoryRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl HistoryRange {
    fn contains(&self, moment: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| moment >= start)
            && self.end.map_or(true, |end| moment <= end)
    }
}

fn parse_range(
    start_date: Option<String>,
    end_date: Option<String>,
    date_style: DateStyle,
) -> Result<HistoryRange> {
    let now = Local::now();
    let dialect: chrono_english::Dialect = date_style.into();

    let start = match start_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => Some(v.with_timezone(&Utc)),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate start date {e}"),
                )
                .into());
        }
        None => None,
    };
    let end = match end_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => Some(v.with_timezone(&Utc)),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate end date {e}"),
                )
                .into());
        }
        None => None,
    };

    Ok(HistoryRange { start, end })
}

fn matches_search(activity: &Activity, search: Option<&str>) -> bool {
    match search {
        Some(term) => activity.text.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

/// Groups consecutive entries sharing a day. Entries arrive most recent
/// first, so runs of equal labels are exactly the per-day groups.
fn group_by_day<'a>(
    entries: &[&'a Activity],
    today: DateTime<Local>,
) -> Vec<(String, Vec<&'a Activity>)> {
    let mut groups: Vec<(String, Vec<&'a Activity>)> = Vec::new();
    for activity in entries {
        let label = day_label(activity.started_at.with_timezone(&Local), today);
        match groups.last_mut() {
            Some((last_label, group)) if *last_label == label => group.push(activity),
            _ => groups.push((label, vec![activity])),
        }
    }
    groups
}

fn render_row(activity: &Activity) -> String {
    let start = format_time(activity.started_at.with_timezone(&Local));
    let times = match activity.ended_at {
        Some(end) => format!("{start} - {}", format_time(end.with_timezone(&Local))),
        None => format!("Started {start}"),
    };
    match activity.duration() {
        Some(duration) => format!(
            "{times}  {}  {}",
            activity.text,
            Style::new().dimmed().paint(format_duration(duration))
        ),
        None => format!("{times}  {}", activity.text),
    }
}
