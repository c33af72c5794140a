pub mod modules;

pub use modules::config::{
    ConfigError, DEFAULT_CADENCE_BASE_MS, DEFAULT_CADENCE_DECAY, DEFAULT_CADENCE_FLOOR_MS,
    DEFAULT_FRAME_MS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, SessionConfig,
};
pub use modules::grid::{Cell, Direction, Grid, MIN_GRID_HEIGHT, MIN_GRID_WIDTH};
pub use modules::highscore::{DEFAULT_HIGHSCORE_FILE, HighScoreStore};
pub use modules::session::{
    EndReason, Event, Mode, Phase, Session, SessionReport, TickResult, simulate,
};
pub use modules::snake::{INITIAL_BODY_LEN, Outcome, Snake, Step};
pub use modules::stats::{BenchStats, summarize};
pub use modules::strategy::{
    Strategy, decide_simple, decide_smarter, decide_smarter_capped, find_path,
};
pub use modules::target::respawn;
pub use modules::view::FrameView;
