use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use ouroboros::{
    DEFAULT_FRAME_MS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_HIGHSCORE_FILE, EndReason,
    Event, HighScoreStore, Mode, Session, SessionConfig, Strategy, TickResult,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod bench;
mod play;

use bench::run_bench;
use play::run_play;

#[derive(Parser)]
#[command(
    name = "ouroboros",
    version,
    about = "Snake on a wrap-around grid, played by hand or by a pathfinding pilot",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play interactively in the terminal
    Play {
        /// Who steers: human (W/A/S/D or arrows) or auto. Omit to pick from a menu.
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        #[command(flatten)]
        grid: GridArgs,
        /// Seed for target placement (omit for a random game)
        #[arg(long)]
        seed: Option<u64>,
        /// Frame interval in milliseconds
        #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
        frame_ms: u64,
        /// High score file
        #[arg(long, default_value = DEFAULT_HIGHSCORE_FILE)]
        highscore_file: PathBuf,
    },
    /// Run an autonomous session headless, printing one line per tick
    Run {
        #[command(flatten)]
        grid: GridArgs,
        /// Seed for target placement (omit for a random game)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many ticks (omit to run until the snake dies)
        #[arg(short = 't', long)]
        ticks: Option<u64>,
        /// Delay between ticks in milliseconds
        #[arg(short = 'd', long, default_value_t = 0)]
        delay_ms: u64,
        /// Only print the final summary
        #[arg(short = 'q', long, action = ArgAction::SetTrue, default_value_t = false)]
        quiet: bool,
        /// Print the final report as JSON
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        json: bool,
        /// High score file
        #[arg(long, default_value = DEFAULT_HIGHSCORE_FILE)]
        highscore_file: PathBuf,
    },
    /// Play many seeded autonomous sessions and report aggregate results
    Bench {
        #[command(flatten)]
        grid: GridArgs,
        /// Number of sessions
        #[arg(short = 'n', long, default_value_t = 20)]
        runs: u64,
        /// Seed of the first session; later sessions count up from it
        #[arg(long, default_value_t = 0)]
        seed_start: u64,
        /// Per-session tick limit
        #[arg(long, default_value_t = 100_000)]
        max_ticks: u64,
        /// Print per-run lines as well as the summary
        #[arg(short = 'v', long, action = ArgAction::SetTrue, default_value_t = false)]
        verbose: bool,
        /// Print results as JSON
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        json: bool,
    },
    /// Show or reset the stored high score
    Highscore {
        /// Overwrite the stored high score with 0
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        reset: bool,
        /// High score file
        #[arg(long, default_value = DEFAULT_HIGHSCORE_FILE)]
        highscore_file: PathBuf,
    },
}

#[derive(Args, Clone, Debug)]
pub struct GridArgs {
    /// Grid width in cells
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    pub width: i32,
    /// Grid height in cells
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    pub height: i32,
    /// Autonomous move strategy
    #[arg(long, default_value_t = Strategy::Smarter, value_enum)]
    pub strategy: Strategy,
    /// Max A* node expansions per decision (defaults to the grid's cell count)
    #[arg(long)]
    pub search_cap: Option<usize>,
}

impl GridArgs {
    fn config(&self, mode: Mode, seed: Option<u64>) -> SessionConfig {
        SessionConfig {
            width: self.width,
            height: self.height,
            strategy: self.strategy,
            search_cap: self.search_cap,
            seed,
            mode,
            ..SessionConfig::default()
        }
    }
}

pub fn run() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Play {
            mode,
            grid,
            seed,
            frame_ms,
            highscore_file,
        } => {
            let config = SessionConfig {
                frame_ms,
                ..grid.config(mode.unwrap_or(Mode::Human), seed)
            };
            run_play(config, mode, HighScoreStore::new(highscore_file))
        }
        Command::Run {
            grid,
            seed,
            ticks,
            delay_ms,
            quiet,
            json,
            highscore_file,
        } => run_headless(
            grid.config(Mode::Autonomous, seed),
            ticks,
            Duration::from_millis(delay_ms),
            quiet,
            json,
            HighScoreStore::new(highscore_file),
        ),
        Command::Bench {
            grid,
            runs,
            seed_start,
            max_ticks,
            verbose,
            json,
        } => run_bench(&grid, runs, seed_start, max_ticks, verbose, json),
        Command::Highscore {
            reset,
            highscore_file,
        } => run_highscore(reset, HighScoreStore::new(highscore_file)),
    }
}

fn run_headless(
    config: SessionConfig,
    ticks: Option<u64>,
    delay: Duration,
    quiet: bool,
    json: bool,
    store: HighScoreStore,
) -> Result<(), String> {
    let high_score = store.load_high_score();
    let mut session = Session::new(config).map_err(|e| e.to_string())?;
    session.start(Mode::Autonomous, 0);

    if !quiet && !json {
        println!(
            "Grid {}x{} | strategy={} | target at {} | high score {}",
            session.grid().width(),
            session.grid().height(),
            session.config().strategy,
            session.target(),
            high_score
        );
    }

    let mut remaining = ticks;
    loop {
        match remaining {
            Some(0) => break,
            Some(ref mut n) => *n -= 1,
            None => {}
        }

        let Some(tick) = session.step() else { break };
        if !quiet && !json {
            print_tick(&tick, &session);
        }
        if session.is_over() {
            break;
        }

        if delay > Duration::ZERO {
            std::thread::sleep(delay);
        }
    }

    finish_session(&session, &store, high_score, json)
}

fn run_highscore(reset: bool, store: HighScoreStore) -> Result<(), String> {
    if reset {
        store.save_high_score(0).map_err(|e| e.to_string())?;
        println!("High score reset ({})", store.path().display());
        return Ok(());
    }
    println!(
        "High score: {} ({})",
        store.load_high_score(),
        store.path().display()
    );
    Ok(())
}

/// Prints the outcome and records a beaten high score. A failed save only warns.
fn finish_session(
    session: &Session,
    store: &HighScoreStore,
    previous_high: u32,
    json: bool,
) -> Result<(), String> {
    let report = session.report();
    let beaten = match store.submit(report.score, previous_high) {
        Ok(beaten) => beaten,
        Err(err) => {
            warn!(path = %store.path().display(), error = %err, "failed to save high score");
            false
        }
    };

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }

    match report.end {
        Some(EndReason::Collision) => println!("Snake died!"),
        Some(EndReason::GridFull) => println!("Grid full - nowhere left to grow!"),
        Some(EndReason::Quit) => println!("Session ended by player."),
        None => println!("Tick limit reached."),
    }
    println!(
        "Final Score: {} | length={} | ticks={} | mode={}",
        report.score, report.length, report.ticks, report.mode
    );
    if beaten {
        println!("NEW HIGH SCORE! (previous {})", previous_high);
    }
    Ok(())
}

fn print_tick(tick: &TickResult, session: &Session) {
    println!(
        "Tick {}: score={} length={} delay={}ms",
        tick.tick,
        session.score(),
        session.snake().len(),
        session.move_delay_ms()
    );
    for event in &tick.events {
        println!(" - {}", describe_event(event));
    }
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::Decided {
            strategy,
            direction,
        } => format!("{} pilot chose {}", strategy, direction),
        Event::TurnRejected { requested, heading } => {
            format!("turn {} dropped (heading {})", requested, heading)
        }
        Event::Moved {
            from,
            to,
            direction,
        } => format!("moved {} from {} to {}", direction, from, to),
        Event::TargetConsumed { at, score, length } => {
            format!("ate target at {} (score={}, length={})", at, score, length)
        }
        Event::TargetSpawned { at } => format!("new target at {}", at),
        Event::CadenceChanged { delay_ms } => format!("move delay now {}ms", delay_ms),
        Event::Died { at, score } => format!("collided with itself at {} (score={})", at, score),
        Event::GridFull { score } => format!("no room for another target (score={})", score),
    }
}
