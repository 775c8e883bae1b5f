//! Command-line driver for the roster core.
//!
//! # Responsibility
//! - Print the `racetimer_core` health check when run without a subcommand.
//! - Run one roster command per invocation against the configured database.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use racetimer_core::db::open_db;
use racetimer_core::view::format::{elapsed_label, start_time_label, status_label};
use racetimer_core::{
    sort_by_elapsed, CoreConfig, Participant, ParticipantId, ParticipantNumber, RegistrySession,
    SortDirection, SqliteKvStore,
};

#[derive(Parser)]
#[command(name = "racetimer")]
#[command(version, about = "Participant roster and race timer")]
struct Cli {
    /// Prints the core health check when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create COUNT unnamed participants
    Create { count: i64 },
    /// Add one unnamed participant
    Add,
    /// Set the name of participant NUMBER
    Name {
        number: ParticipantNumber,
        #[arg(num_args = 1.., required = true)]
        name: Vec<String>,
    },
    /// Start the timer of participant NUMBER
    Start { number: ParticipantNumber },
    /// Stop the timer of participant NUMBER
    Stop { number: ParticipantNumber },
    /// Clear the timer of participant NUMBER
    Reset { number: ParticipantNumber },
    /// Permanently remove participant NUMBER
    Remove {
        number: ParticipantNumber,
        /// Required; removal cannot be undone
        #[arg(long)]
        confirm: bool,
    },
    /// Show the roster in stored order
    List,
    /// Show the roster ordered by elapsed time
    Sort {
        #[arg(value_enum, default_value_t = Order::Asc)]
        order: Order,
    },
    /// Save and submit the whole roster
    SaveAll,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortDirection {
    fn from(value: Order) -> Self {
        match value {
            Order::Asc => SortDirection::Ascending,
            Order::Desc => SortDirection::Descending,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("racetimer_core ping={}", racetimer_core::ping());
        println!("racetimer_core version={}", racetimer_core::core_version());
        return Ok(());
    };

    let config = CoreConfig::from_env()?;
    if let Err(err) = racetimer_core::init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let store = SqliteKvStore::try_new(&conn)?;
    let mut session = RegistrySession::open(store)?;
    run(&mut session, command)
}

fn run(session: &mut RegistrySession<SqliteKvStore<'_>>, command: Command) -> Result<()> {
    match command {
        Command::Create { count } => {
            let created = session.create(count)?;
            println!("created {} participant(s)", created.len());
            print_rows(session.participants());
        }
        Command::Add => {
            let added = session.add_single()?;
            println!("added participant #{}", added.participant_number);
        }
        Command::Name { number, name } => {
            let id = id_for(session, number)?;
            session.rename(id, name.join(" "))?;
        }
        Command::Start { number } => {
            let started = session.start(number)?;
            println!(
                "#{number} started at {}",
                start_time_label(started.start_time)
            );
        }
        Command::Stop { number } => {
            let stopped = session.stop(number)?;
            println!("#{number} stopped: {}", elapsed_label(stopped.elapsed));
        }
        Command::Reset { number } => {
            let id = id_for(session, number)?;
            session.reset(id)?;
        }
        Command::Remove { number, confirm } => {
            if !confirm {
                bail!("removal is permanent; repeat with --confirm");
            }
            let id = id_for(session, number)?;
            session.remove(id);
        }
        Command::List => print_rows(session.participants()),
        Command::Sort { order } => {
            print_rows(&sort_by_elapsed(session.participants(), order.into()));
        }
        Command::SaveAll => {
            let saved = session.save_all()?;
            println!("saved {saved} participant(s)");
        }
    }

    Ok(())
}

fn id_for(
    session: &RegistrySession<SqliteKvStore<'_>>,
    number: ParticipantNumber,
) -> Result<ParticipantId> {
    let participant = session.registry().lookup_by_number(number)?;
    Ok(participant.id)
}

fn print_rows(participants: &[Participant]) {
    for participant in participants {
        let name = if participant.name.is_empty() {
            "-"
        } else {
            participant.name.as_str()
        };
        println!(
            "#{:<4} {:<24} start={:<8} {:<8} elapsed={}",
            participant.participant_number,
            name,
            start_time_label(participant.start_time),
            status_label(participant),
            elapsed_label(participant.elapsed)
        );
    }
}
