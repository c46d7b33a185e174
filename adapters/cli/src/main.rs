#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for playing Pathway mazes in a terminal.

mod input;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use pathway_core::{Level, GAME_ID, GAME_NAME};
use pathway_progress::{ProgressBook, ProgressStore, DEFAULT_LEADERBOARD_LIMIT};
use pathway_session::{Config, Session};

use crate::input::Action;

/// Session time advanced by the tick command.
const TICK: Duration = Duration::from_secs(2);

/// Play Pathway mazes from the terminal.
#[derive(Debug, Parser)]
#[command(name = "pathway", version, about)]
struct Args {
    /// Level to start on, from 1 to 10
    #[arg(short, long, default_value_t = 1)]
    level: u8,

    /// Seed for maze generation; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file recording completed mazes
    #[arg(short, long)]
    progress: Option<PathBuf>,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Entry point for the Pathway command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let store = args.progress.map(ProgressStore::new);
    let book = match &store {
        Some(store) => store
            .load()
            .with_context(|| format!("failed to load {}", store.path().display()))?,
        None => ProgressBook::new(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {seed}");
    let mut session = Session::new(Config::new(Level::new(args.level), seed), book);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{GAME_NAME}: w/a/s/d to move, t to wait, r for a new maze, q to quit")?;
    draw(&mut stdout, &session)?;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        let Some(action) = input::parse(&line) else {
            continue;
        };

        let reported_before = session.has_reported();
        match action {
            Action::Move(direction) => {
                if !session.move_player(direction) {
                    writeln!(stdout, "bump")?;
                }
            }
            Action::Tick => session.tick(TICK),
            Action::Reset => session.reset(),
            Action::Quit => break,
        }

        if session.has_reported() && !reported_before {
            save(store.as_ref(), session.reporter());
            print_leaderboard(&mut stdout, session.reporter())?;
        }
        draw(&mut stdout, &session)?;
    }

    save(store.as_ref(), session.reporter());
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn draw(out: &mut impl Write, session: &Session<ProgressBook>) -> io::Result<()> {
    let drawn = render::maze(session.grid_snapshot(), |cell| session.is_visible(cell));
    write!(out, "{drawn}")?;
    writeln!(
        out,
        "{}",
        render::status_line(session.level().get(), &session.status())
    )?;
    out.flush()
}

fn print_leaderboard(out: &mut impl Write, book: &ProgressBook) -> io::Result<()> {
    if let Some(progress) = book.game(GAME_ID) {
        let levels: Vec<String> = progress
            .completed_levels
            .iter()
            .map(|level| level.get().to_string())
            .collect();
        writeln!(
            out,
            "completed levels: {} | best score {}",
            levels.join(", "),
            progress.best_score
        )?;
    }
    for (rank, entry) in book.leaderboard(DEFAULT_LEADERBOARD_LIMIT).iter().enumerate() {
        writeln!(
            out,
            "{:>2}. level {:>2}  {:>3}/{}",
            rank + 1,
            entry.level.get(),
            entry.score,
            entry.max_score
        )?;
    }
    Ok(())
}

fn save(store: Option<&ProgressStore>, book: &ProgressBook) {
    let Some(store) = store else {
        return;
    };
    if let Err(error) = store.save(book) {
        warn!("{error}");
    }
}
