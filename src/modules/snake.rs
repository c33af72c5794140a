use std::collections::VecDeque;

use tracing::debug;

use crate::modules::config::ConfigError;
use crate::modules::grid::{Cell, Direction, Grid};

/// Number of segments behind the head at spawn.
pub const INITIAL_BODY_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Head landed on the target; the caller must place a new one.
    Consumed,
    Alive,
    Dead,
}

/// What a single [`Snake::advance`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub from: Cell,
    pub to: Cell,
    pub direction: Direction,
    /// A queued turn that was dropped because it would reverse the heading.
    pub rejected: Option<Direction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    head: Cell,
    /// Index 0 trails the head; the last entry is the tail.
    body: Vec<Cell>,
    direction: Direction,
    pending_moves: VecDeque<Direction>,
    score: u32,
}

impl Snake {
    /// Three segments centred on the grid, heading right.
    pub fn spawn(grid: &Grid) -> Self {
        let head = grid.center();
        let body = (1..=INITIAL_BODY_LEN as i32)
            .map(|i| grid.wrap(Cell::new(head.x - i, head.y)))
            .collect();
        Self::assemble(head, body, Direction::Right)
    }

    /// Builds a snake from explicit segments, nearest to the head first.
    pub fn from_parts(
        head: Cell,
        body: Vec<Cell>,
        direction: Direction,
    ) -> Result<Self, ConfigError> {
        if body.len() < INITIAL_BODY_LEN {
            return Err(ConfigError::BodyTooShort { len: body.len() });
        }
        Ok(Self::assemble(head, body, direction))
    }

    fn assemble(head: Cell, body: Vec<Cell>, direction: Direction) -> Self {
        Self {
            head,
            body,
            direction,
            pending_moves: VecDeque::new(),
            score: 0,
        }
    }

    pub fn head(&self) -> Cell {
        self.head
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn tail(&self) -> Cell {
        self.body.last().copied().unwrap_or(self.head)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Segments including the head.
    pub fn len(&self) -> usize {
        self.body.len() + 1
    }

    pub fn pending_moves(&self) -> &VecDeque<Direction> {
        &self.pending_moves
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.head == cell || self.body.contains(&cell)
    }

    pub fn body_contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Queues a turn. Reversals are filtered later, in [`Snake::advance`].
    pub fn queue_move(&mut self, direction: Direction) {
        self.pending_moves.push_back(direction);
    }

    /// Consumes at most one queued turn, shifts the body up by one and moves the head.
    pub fn advance(&mut self, grid: &Grid) -> Step {
        let mut rejected = None;
        if let Some(next) = self.pending_moves.pop_front() {
            if next == self.direction.opposite() {
                debug!(requested = %next, heading = %self.direction, "dropped reversing turn");
                rejected = Some(next);
            } else {
                self.direction = next;
            }
        }

        let from = self.head;
        if !self.body.is_empty() {
            self.body.rotate_right(1);
            self.body[0] = from;
        }
        self.head = grid.step(from, self.direction);

        Step {
            from,
            to: self.head,
            direction: self.direction,
            rejected,
        }
    }

    /// Resolves the head against the target and the body after an advance.
    ///
    /// Growth appends a copy of the tail, so the new segment sits on the old tail cell until
    /// the next shift separates them.
    pub fn check_target(&mut self, target: Cell) -> Outcome {
        if self.head == target {
            self.score += 1;
            let tail = self.tail();
            self.body.push(tail);
            Outcome::Consumed
        } else if self.body.contains(&self.head) {
            Outcome::Dead
        } else {
            Outcome::Alive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(10, 10).unwrap()
    }

    #[test]
    fn spawns_centered_heading_right() {
        let snake = Snake::spawn(&grid());
        assert_eq!(snake.head(), Cell::new(5, 5));
        assert_eq!(snake.body(), &[Cell::new(4, 5), Cell::new(3, 5)]);
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn advance_shifts_every_segment() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        let step = snake.advance(&grid);

        assert_eq!(step.from, Cell::new(5, 5));
        assert_eq!(step.to, Cell::new(6, 5));
        assert_eq!(snake.head(), Cell::new(6, 5));
        assert_eq!(snake.body(), &[Cell::new(5, 5), Cell::new(4, 5)]);
    }

    #[test]
    fn from_parts_rejects_a_short_body() {
        let err = Snake::from_parts(Cell::new(3, 3), vec![Cell::new(2, 3)], Direction::Right)
            .unwrap_err();
        assert_eq!(err, ConfigError::BodyTooShort { len: 1 });
        assert!(Snake::from_parts(Cell::new(3, 3), Vec::new(), Direction::Up).is_err());

        let snake = Snake::from_parts(
            Cell::new(3, 3),
            vec![Cell::new(2, 3), Cell::new(1, 3)],
            Direction::Right,
        )
        .unwrap();
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn advance_wraps_at_the_edge() {
        let grid = grid();
        let mut snake = Snake::from_parts(
            Cell::new(9, 0),
            vec![Cell::new(8, 0), Cell::new(7, 0)],
            Direction::Right,
        )
        .unwrap();
        snake.advance(&grid);
        assert_eq!(snake.head(), Cell::new(0, 0));

        snake.queue_move(Direction::Up);
        snake.advance(&grid);
        assert_eq!(snake.head(), Cell::new(0, 9));
        assert_eq!(snake.body(), &[Cell::new(0, 0), Cell::new(9, 0)]);
    }

    #[test]
    fn reversal_is_dropped_silently() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        snake.queue_move(Direction::Left);
        let step = snake.advance(&grid);

        assert_eq!(step.rejected, Some(Direction::Left));
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.head(), Cell::new(6, 5));
        assert!(snake.pending_moves().is_empty());
    }

    #[test]
    fn queued_turns_are_consumed_one_per_tick() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        snake.queue_move(Direction::Up);
        snake.queue_move(Direction::Left);
        assert_eq!(snake.pending_moves().len(), 2);

        snake.advance(&grid);
        assert_eq!(snake.direction(), Direction::Up);
        assert_eq!(snake.head(), Cell::new(5, 4));

        // Left is only a reversal of the initial heading, not of Up.
        let step = snake.advance(&grid);
        assert_eq!(step.rejected, None);
        assert_eq!(snake.direction(), Direction::Left);
        assert_eq!(snake.head(), Cell::new(4, 4));
    }

    #[test]
    fn no_step_ever_reverses_the_heading() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        let script = [
            Direction::Left,
            Direction::Up,
            Direction::Down,
            Direction::Right,
            Direction::Left,
            Direction::Down,
            Direction::Up,
            Direction::Up,
            Direction::Right,
        ];
        for requested in script {
            let before = snake.direction();
            snake.queue_move(requested);
            snake.advance(&grid);
            assert_ne!(snake.direction(), before.opposite());
        }
    }

    #[test]
    fn consuming_grows_by_one_on_the_tail() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        snake.advance(&grid);
        let tail_before = snake.tail();

        assert_eq!(snake.check_target(Cell::new(6, 5)), Outcome::Consumed);
        assert_eq!(snake.score(), 1);
        assert_eq!(snake.body().len(), 3);
        assert_eq!(snake.body()[2], tail_before);
        assert_eq!(snake.body()[1], tail_before);

        snake.advance(&grid);
        assert_eq!(snake.check_target(Cell::new(0, 0)), Outcome::Alive);
        assert_ne!(snake.body()[1], snake.body()[2]);
        assert_eq!(snake.body().len(), 3);
    }

    #[test]
    fn running_into_the_body_is_fatal() {
        let grid = grid();
        // Head at (5,5) with a hook of body so that turning down bites (5,6).
        let mut snake = Snake::from_parts(
            Cell::new(5, 5),
            vec![
                Cell::new(4, 5),
                Cell::new(4, 6),
                Cell::new(5, 6),
                Cell::new(6, 6),
            ],
            Direction::Right,
        )
        .unwrap();
        snake.queue_move(Direction::Down);
        snake.advance(&grid);
        assert_eq!(snake.head(), Cell::new(5, 6));
        assert_eq!(snake.check_target(Cell::new(0, 0)), Outcome::Dead);
    }

    #[test]
    fn chasing_the_tail_is_safe() {
        let grid = grid();
        // A 2x2 loop: the head moves into the cell the tail is vacating.
        let mut snake = Snake::from_parts(
            Cell::new(5, 5),
            vec![Cell::new(5, 6), Cell::new(6, 6), Cell::new(6, 5)],
            Direction::Up,
        )
        .unwrap();
        snake.queue_move(Direction::Right);
        snake.advance(&grid);
        assert_eq!(snake.head(), Cell::new(6, 5));
        assert_eq!(snake.check_target(Cell::new(0, 0)), Outcome::Alive);
    }

    #[test]
    fn target_takes_priority_over_collision() {
        let grid = grid();
        let mut snake = Snake::spawn(&grid);
        snake.advance(&grid);
        let head = snake.head();
        assert_eq!(snake.check_target(head), Outcome::Consumed);
        // The fresh growth segment overlaps the old tail, never the head.
        assert!(!snake.body_contains(snake.head()));
    }
}
