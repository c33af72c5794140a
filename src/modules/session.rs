use std::fmt;

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modules::config::{ConfigError, SessionConfig};
use crate::modules::grid::{Cell, Direction, Grid};
use crate::modules::snake::{Outcome, Snake};
use crate::modules::strategy::Strategy;
use crate::modules::target;
use crate::modules::view::FrameView;

/// Who drives the snake. Fixed once the session leaves the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Human,
    #[value(name = "auto", alias = "ai")]
    #[serde(rename = "auto")]
    Autonomous,
}

impl Mode {
    pub const fn label(self) -> &'static str {
        match self {
            Mode::Human => "Human",
            Mode::Autonomous => "AI",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Collision,
    /// No free cell left for a new target.
    GridFull,
    Quit,
}

impl EndReason {
    pub const fn label(self) -> &'static str {
        match self {
            EndReason::Collision => "collision",
            EndReason::GridFull => "grid full",
            EndReason::Quit => "quit",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Running,
    Terminated(EndReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Decided {
        strategy: Strategy,
        direction: Direction,
    },
    TurnRejected {
        requested: Direction,
        heading: Direction,
    },
    Moved {
        from: Cell,
        to: Cell,
        direction: Direction,
    },
    TargetConsumed {
        at: Cell,
        score: u32,
        length: usize,
    },
    TargetSpawned {
        at: Cell,
    },
    CadenceChanged {
        delay_ms: u64,
    },
    Died {
        at: Cell,
        score: u32,
    },
    GridFull {
        score: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickResult {
    pub tick: u64,
    pub outcome: Outcome,
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub mode: Mode,
    pub strategy: Strategy,
    pub width: i32,
    pub height: i32,
    pub seed: Option<u64>,
    pub ticks: u64,
    pub score: u32,
    pub length: usize,
    /// `None` while the session is still running (e.g. a tick limit was hit).
    pub end: Option<EndReason>,
}

/// One game: the grid, the snake, the current target and the RNG that places targets.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    grid: Grid,
    snake: Snake,
    target: Cell,
    rng: StdRng,
    phase: Phase,
    mode: Mode,
    search_cap: usize,
    tick: u64,
    move_delay_ms: u64,
    last_move_ms: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let snake = Snake::spawn(&grid);
        let target = target::respawn(&grid, &snake, &mut rng).ok_or(ConfigError::GridTooSmall {
            width: grid.width(),
            height: grid.height(),
        })?;
        let search_cap = config.search_cap_for(&grid);
        let move_delay_ms = config.cadence_ms(snake.body().len());

        Ok(Self {
            mode: config.mode,
            config,
            grid,
            snake,
            target,
            rng,
            phase: Phase::Menu,
            search_cap,
            tick: 0,
            move_delay_ms,
            last_move_ms: 0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn score(&self) -> u32 {
        self.snake.score()
    }

    pub fn move_delay_ms(&self) -> u64 {
        self.move_delay_ms
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    /// Leaves the menu. `now_ms` anchors the move cadence to the caller's clock.
    pub fn start(&mut self, mode: Mode, now_ms: u64) {
        if self.phase != Phase::Menu {
            return;
        }
        self.mode = mode;
        self.phase = Phase::Running;
        self.last_move_ms = now_ms;
        info!(
            mode = %mode,
            strategy = %self.config.strategy,
            width = self.grid.width(),
            height = self.grid.height(),
            target = %self.target,
            "session started"
        );
    }

    /// Human input. Only accepted while a human-driven session is running.
    pub fn queue_move(&mut self, direction: Direction) -> bool {
        if self.mode != Mode::Human || !self.is_running() {
            return false;
        }
        self.snake.queue_move(direction);
        true
    }

    pub fn quit(&mut self) {
        if !self.is_over() {
            self.phase = Phase::Terminated(EndReason::Quit);
            info!(score = self.score(), ticks = self.tick, "session quit");
        }
    }

    /// Advances one tick if more than the current move delay has passed since the last one.
    pub fn update(&mut self, now_ms: u64) -> Option<TickResult> {
        if !self.is_running() {
            return None;
        }
        if now_ms.saturating_sub(self.last_move_ms) <= self.move_delay_ms {
            return None;
        }
        self.last_move_ms = now_ms;
        self.step()
    }

    /// Advances exactly one tick, ignoring the cadence. `None` unless running.
    pub fn step(&mut self) -> Option<TickResult> {
        if !self.is_running() {
            return None;
        }

        let tick = self.tick + 1;
        let mut events = Vec::new();

        if self.mode == Mode::Autonomous && self.snake.pending_moves().is_empty() {
            let strategy = self.config.strategy;
            let direction = strategy.decide(&self.snake, self.target, &self.grid, self.search_cap);
            self.snake.queue_move(direction);
            events.push(Event::Decided {
                strategy,
                direction,
            });
        }

        let step = self.snake.advance(&self.grid);
        if let Some(requested) = step.rejected {
            events.push(Event::TurnRejected {
                requested,
                heading: step.direction,
            });
        }
        events.push(Event::Moved {
            from: step.from,
            to: step.to,
            direction: step.direction,
        });

        let outcome = self.snake.check_target(self.target);
        match outcome {
            Outcome::Consumed => self.on_consumed(&mut events),
            Outcome::Dead => {
                self.phase = Phase::Terminated(EndReason::Collision);
                events.push(Event::Died {
                    at: step.to,
                    score: self.score(),
                });
                info!(at = %step.to, score = self.score(), tick, "snake died");
            }
            Outcome::Alive => {}
        }

        self.tick = tick;
        Some(TickResult {
            tick,
            outcome,
            events,
        })
    }

    fn on_consumed(&mut self, events: &mut Vec<Event>) {
        events.push(Event::TargetConsumed {
            at: self.target,
            score: self.score(),
            length: self.snake.len(),
        });

        match target::respawn(&self.grid, &self.snake, &mut self.rng) {
            Some(cell) => {
                debug!(at = %cell, "target respawned");
                self.target = cell;
                events.push(Event::TargetSpawned { at: cell });
            }
            None => {
                self.phase = Phase::Terminated(EndReason::GridFull);
                events.push(Event::GridFull {
                    score: self.score(),
                });
                info!(score = self.score(), "grid full; nowhere left for a target");
            }
        }

        let delay_ms = self.config.cadence_ms(self.snake.body().len());
        if delay_ms != self.move_delay_ms {
            self.move_delay_ms = delay_ms;
            events.push(Event::CadenceChanged { delay_ms });
        }
    }

    pub fn view(&self, high_score: u32) -> FrameView {
        FrameView {
            width: self.grid.width(),
            height: self.grid.height(),
            head: self.snake.head(),
            body: self.snake.body().to_vec(),
            target: self.target,
            score: self.score(),
            high_score,
            mode: self.mode,
            tick: self.tick,
            over: self.is_over(),
        }
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            mode: self.mode,
            strategy: self.config.strategy,
            width: self.grid.width(),
            height: self.grid.height(),
            seed: self.config.seed,
            ticks: self.tick,
            score: self.score(),
            length: self.snake.len(),
            end: match self.phase {
                Phase::Terminated(reason) => Some(reason),
                _ => None,
            },
        }
    }
}

/// Plays an autonomous session to the end or until `max_ticks` ticks have run.
pub fn simulate(config: SessionConfig, max_ticks: Option<u64>) -> Result<SessionReport, ConfigError> {
    let mut session = Session::new(config)?;
    session.start(Mode::Autonomous, 0);
    while session.is_running() {
        if max_ticks.is_some_and(|limit| session.tick() >= limit) {
            break;
        }
        session.step();
    }
    Ok(session.report())
}
