use std::collections::HashSet;

use crate::modules::grid::Cell;
use crate::modules::session::Mode;

pub const HEAD_GLYPH: char = '@';
pub const BODY_GLYPH: char = 'o';
pub const TARGET_GLYPH: char = '*';
pub const EMPTY_GLYPH: char = '.';

/// Read-only snapshot handed to renderers once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub width: i32,
    pub height: i32,
    pub head: Cell,
    pub body: Vec<Cell>,
    pub target: Cell,
    pub score: u32,
    pub high_score: u32,
    pub mode: Mode,
    pub tick: u64,
    pub over: bool,
}

impl FrameView {
    /// One string per grid row. The head is drawn last so it wins over an overlapping segment.
    pub fn rows(&self) -> Vec<String> {
        let body: HashSet<Cell> = self.body.iter().copied().collect();
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let cell = Cell::new(x, y);
                        if cell == self.head {
                            HEAD_GLYPH
                        } else if body.contains(&cell) {
                            BODY_GLYPH
                        } else if cell == self.target {
                            TARGET_GLYPH
                        } else {
                            EMPTY_GLYPH
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn hud(&self) -> String {
        let mut line = format!(
            "Score: {} | High Score: {} | Mode: {} | Tick: {}",
            self.score, self.high_score, self.mode, self.tick
        );
        if self.over {
            line.push_str(" | GAME OVER");
        }
        line
    }
}
