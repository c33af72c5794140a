use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::modules::grid::{Cell, Direction, Grid};
use crate::modules::snake::Snake;

/// Move-selection policy for autonomous play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Greedy: step towards the target along the plain Manhattan gradient.
    Simple,
    /// A* over the wrapping grid, avoiding the body.
    #[default]
    Smarter,
}

impl Strategy {
    pub const fn label(self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Smarter => "smarter",
        }
    }

    /// `search_cap` only bounds [`Strategy::Smarter`].
    pub fn decide(self, snake: &Snake, target: Cell, grid: &Grid, search_cap: usize) -> Direction {
        match self {
            Strategy::Simple => decide_simple(snake, target, grid),
            Strategy::Smarter => decide_smarter_capped(snake, target, grid, search_cap),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ranks the four directions by plain Manhattan distance from the unwrapped next head to the
/// target and takes the best one that does not run into the body.
///
/// Ties keep [`Direction::ALL`] order. With every direction blocked the current heading is
/// returned and the snake dies on the next tick.
pub fn decide_simple(snake: &Snake, target: Cell, grid: &Grid) -> Direction {
    let head = snake.head();
    let mut ranked = Direction::ALL;
    ranked.sort_by_key(|d| head.offset(*d).manhattan(target));

    ranked
        .into_iter()
        .find(|d| !snake.body_contains(grid.step(head, *d)))
        .unwrap_or_else(|| {
            debug!(heading = %snake.direction(), "simple: boxed in, keeping heading");
            snake.direction()
        })
}

/// A* with the default budget of one expansion per grid cell.
pub fn decide_smarter(snake: &Snake, target: Cell, grid: &Grid) -> Direction {
    decide_smarter_capped(snake, target, grid, grid.cell_count())
}

/// Shortest wrap-aware route to the target around the body; first step of that route.
///
/// Falls back to the current heading when the target is walled off or the search runs out of
/// budget.
pub fn decide_smarter_capped(
    snake: &Snake,
    target: Cell,
    grid: &Grid,
    max_expansions: usize,
) -> Direction {
    let blocked: HashSet<Cell> = snake.body().iter().copied().collect();
    let first_step = find_path(grid, snake.head(), target, &blocked, max_expansions)
        .and_then(|path| path.first().copied())
        .and_then(|next| grid.direction_between(snake.head(), next));

    match first_step {
        Some(direction) => direction,
        None => {
            debug!(
                head = %snake.head(),
                target = %target,
                heading = %snake.direction(),
                "smarter: no route, keeping heading"
            );
            snake.direction()
        }
    }
}

/// Open-set entry. Lower `f` pops first; equal `f` pops in insertion order.
/// Equality follows the heap order, so `g` and `cell` do not take part in it.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    f: i32,
    g: i32,
    seq: u64,
    cell: Cell,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both keys are reversed.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* from `start` to `goal` on the torus, never entering `blocked`.
///
/// Returns the cells after `start` up to and including `goal`; an empty path when they
/// coincide. `None` when the goal is unreachable or more than `max_expansions` nodes would
/// need expanding.
pub fn find_path(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    blocked: &HashSet<Cell>,
    max_expansions: usize,
) -> Option<Vec<Cell>> {
    let start = grid.wrap(start);
    let goal = grid.wrap(goal);

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, i32> = HashMap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    open.push(Frontier {
        f: grid.distance(start, goal),
        g: 0,
        seq,
        cell: start,
    });

    while let Some(current) = open.pop() {
        if current.cell == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        // Stale duplicate of a node already expanded at a lower cost.
        if !closed.insert(current.cell) {
            continue;
        }
        if closed.len() > max_expansions {
            debug!(max_expansions, "search budget exhausted");
            return None;
        }

        for (_, neighbor) in grid.neighbors(current.cell) {
            if blocked.contains(&neighbor) || closed.contains(&neighbor) {
                continue;
            }
            let tentative = current.g + 1;
            let improved = g_score
                .get(&neighbor)
                .map_or(true, |known| tentative < *known);
            if improved {
                came_from.insert(neighbor, current.cell);
                g_score.insert(neighbor, tentative);
                seq += 1;
                open.push(Frontier {
                    f: tentative + grid.distance(neighbor, goal),
                    g: tentative,
                    seq,
                    cell: neighbor,
                });
            }
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(previous) => current = *previous,
            None => break,
        }
    }
    path.reverse();
    path
}
