use rand::Rng;
use tracing::debug;

use crate::modules::grid::{Cell, Grid};
use crate::modules::snake::Snake;

/// Random draws per free-cell lookup before falling back to a scan.
const SAMPLES_PER_CELL: usize = 4;

/// Picks a uniformly random cell that the snake does not occupy.
///
/// Rejection sampling is bounded; once the budget runs out the first free cell in row-major
/// order is used instead. Returns `None` only when the snake fills the whole grid.
pub fn respawn<R: Rng>(grid: &Grid, snake: &Snake, rng: &mut R) -> Option<Cell> {
    let budget = grid.cell_count().saturating_mul(SAMPLES_PER_CELL);
    for _ in 0..budget {
        let candidate = Cell::new(
            rng.gen_range(0..grid.width()),
            rng.gen_range(0..grid.height()),
        );
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    debug!(budget, "target sampling exhausted; scanning for a free cell");
    grid.cells().find(|cell| !snake.occupies(*cell))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::modules::grid::Direction;

    #[test]
    fn never_lands_on_the_snake() {
        let grid = Grid::new(6, 4).unwrap();
        let snake = Snake::spawn(&grid);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let cell = respawn(&grid, &snake, &mut rng).unwrap();
            assert!(grid.contains(cell));
            assert!(!snake.occupies(cell));
        }
    }

    #[test]
    fn same_seed_same_cell() {
        let grid = Grid::new(40, 30).unwrap();
        let snake = Snake::spawn(&grid);
        let a = respawn(&grid, &snake, &mut StdRng::seed_from_u64(42));
        let b = respawn(&grid, &snake, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn finds_the_last_free_cell() {
        let grid = Grid::new(3, 2).unwrap();
        // Five of six cells occupied; only (2, 1) is free.
        let snake = Snake::from_parts(
            Cell::new(0, 0),
            vec![
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(0, 1),
                Cell::new(1, 1),
            ],
            Direction::Left,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(respawn(&grid, &snake, &mut rng), Some(Cell::new(2, 1)));
    }

    #[test]
    fn full_grid_has_no_target() {
        let grid = Grid::new(3, 2).unwrap();
        let snake = Snake::from_parts(
            Cell::new(0, 0),
            vec![
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(2, 1),
                Cell::new(1, 1),
                Cell::new(0, 1),
            ],
            Direction::Left,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(respawn(&grid, &snake, &mut rng), None);
    }
}
