pub mod history;

use std::path::PathBuf;

use ansi_term::{Colour, Style};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use history::{process_history_command, HistoryCommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::level_filters::LevelFilter;

use crate::{
    display::fit::{fit, truncate_by_count, MonospaceMetrics},
    store::{
        persistence::{FileStateStorage, StateStorage},
        ActivityStore, MAX_HISTORY_SIZE,
    },
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::enable_logging,
        time::{format_duration, time_ago},
    },
};

/// Longest activity text accepted from the command line. The store itself
/// doesn't enforce a limit.
const MAX_INPUT_LENGTH: usize = 100;

/// Width budget for the status line, in terminal columns.
const STATUS_WIDTH_BUDGET: f64 = 60.0;

/// Character budget for recent activity labels.
const RECENT_LABEL_BUDGET: usize = 40;

const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "Whatnow", version, long_about = None)]
#[command(about = "Command line journal for recording what you are doing right now", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Set the activity you are working on. Prompts for text when none is given")]
    Start {
        #[arg(help = "Activity text, for example \"reviewing PR #42\"")]
        text: Option<String>,
    },
    #[command(about = "Show the current activity")]
    Status {},
    #[command(about = "Stop the current activity without starting a new one")]
    Clear {},
    #[command(about = "List recent activities for quick reuse")]
    Recent {
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_RECENT_LIMIT,
            help = "Maximum amount of entries to show"
        )]
        limit: usize,
        #[arg(help = "Only show entries containing this text")]
        query: Option<String>,
    },
    #[command(about = "Browse closed activities grouped by day")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Delete all closed activities. The current activity is kept")]
    ClearHistory {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    let storage = FileStateStorage::new(dir.join("state"))?;
    let mut store = ActivityStore::load(storage, Box::new(DefaultClock), MAX_HISTORY_SIZE).await;

    match args.commands {
        Commands::Start { text } => process_start_command(&mut store, text).await,
        Commands::Status {} => {
            print_status(&store);
            Ok(())
        }
        Commands::Clear {} => {
            store.clear_current().await;
            print_status(&store);
            Ok(())
        }
        Commands::Recent { limit, query } => {
            print_recent(&store, limit, query.as_deref());
            Ok(())
        }
        Commands::History { command } => process_history_command(&mut store, command),
        Commands::ClearHistory {} => {
            store.clear_history().await;
            println!("History cleared");
            Ok(())
        }
    }
}

async fn process_start_command<S: StateStorage>(
    store: &mut ActivityStore<S>,
    text: Option<String>,
) -> Result<()> {
    let text = match text {
        Some(v) => v,
        None => prompt_for_activity().await?,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                "Activity text can't be empty",
            )
            .into());
    }
    if trimmed.chars().count() > MAX_INPUT_LENGTH {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Activity text can't be longer than {MAX_INPUT_LENGTH} characters"),
            )
            .into());
    }

    store.start_activity(trimmed).await;
    print_status(store);
    Ok(())
}

async fn prompt_for_activity() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"What are you doing right now? ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line)
}

fn print_status<S: StateStorage>(store: &ActivityStore<S>) {
    match store.current() {
        Some(activity) => {
            let title = fit(
                &activity.text,
                STATUS_WIDTH_BUDGET,
                &MonospaceMetrics::terminal(),
            );
            println!(
                "{} {} {}",
                Colour::Green.paint("●"),
                title,
                Style::new()
                    .dimmed()
                    .paint(format!("({})", time_ago(activity.started_at, chrono::Utc::now()))),
            );
        }
        None => println!("○ Not set"),
    }
}

fn print_recent<S: StateStorage>(store: &ActivityStore<S>, limit: usize, query: Option<&str>) {
    let query_lower = query.map(str::to_lowercase);
    let entries: Vec<_> = store
        .recent_activities(limit)
        .into_iter()
        .filter(|activity| match &query_lower {
            Some(q) => activity.text.to_lowercase().contains(q),
            None => true,
        })
        .collect();

    if entries.is_empty() {
        println!("No recent activities");
        return;
    }

    for activity in entries {
        let label = truncate_by_count(&activity.text, RECENT_LABEL_BUDGET);
        match activity.duration() {
            Some(duration) => println!(
                "{label}\t{}",
                Style::new().dimmed().paint(format_duration(duration))
            ),
            None => println!("{label}"),
        }
    }
}
