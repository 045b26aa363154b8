//! Grid pathfinding with deterministic tie-breaking.
//!
//! Movement is 4-directional with unit step cost, so Manhattan distance is
//! a consistent heuristic and A* returns true shortest paths. Every choice
//! between equal alternatives is settled by reading order, which makes the
//! returned path a pure function of the grid and the two endpoints.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::trace;

use crate::grid::{Grid, Position};

/// A sequence of cells from start to goal, both inclusive.
pub type Path = Vec<Position>;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    pos: Position,
    /// g_score + heuristic
    f_score: u32,
    g_score: u32,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lower f_score first, then lower
        // reading order.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.pos.cmp(&self.pos),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Number of steps a path takes.
#[must_use]
pub fn steps(path: &[Position]) -> usize {
    path.len().saturating_sub(1)
}

/// Find a shortest path from `start` to `goal` using A*.
///
/// Only empty floor cells may be entered; `start` itself may be occupied
/// (usually by the unit that is about to move). Returns `None` when the
/// goal is not empty floor or cannot be reached.
#[must_use]
pub fn shortest_path(grid: &Grid, start: Position, goal: Position) -> Option<Path> {
    if start == goal {
        return grid.in_bounds(start).then(|| vec![start]);
    }
    if !grid.in_bounds(start) || !grid.is_occupiable(goal) {
        return None;
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, u32> = HashMap::new();
    let mut closed: HashSet<Position> = HashSet::new();

    g_score.insert(start, 0);
    open_set.push(AStarNode {
        pos: start,
        f_score: start.manhattan(goal),
        g_score: 0,
    });

    while let Some(current) = open_set.pop() {
        // Stale duplicate of an already expanded node
        if !closed.insert(current.pos) {
            continue;
        }

        if current.pos == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        trace!(pos = %current.pos, g = current.g_score, f = current.f_score, "expanding");

        for next in grid.neighbors(current.pos) {
            if closed.contains(&next) || !grid.is_occupiable(next) {
                continue;
            }

            let tentative_g = current.g_score + 1;
            let neighbor_g = g_score.get(&next).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(next, current.pos);
                g_score.insert(next, tentative_g);
                open_set.push(AStarNode {
                    pos: next,
                    f_score: tentative_g + next.manhattan(goal),
                    g_score: tentative_g,
                });
            }
        }
    }

    None
}

/// Find the canonical shortest path from `start` to `goal`.
///
/// Every empty neighbour of `start` is tried as a first step and completed
/// with [`shortest_path`]. The winner is the shortest completion; among
/// equally short ones the first step with the lowest reading order wins.
/// This is the path a unit follows, so the tie-break on the first step is
/// what decides where it moves.
#[must_use]
pub fn best_path(grid: &Grid, start: Position, goal: Position) -> Option<Path> {
    if start == goal {
        return grid.in_bounds(start).then(|| vec![start]);
    }

    grid.neighbors(start)
        .filter(|&step| grid.is_occupiable(step))
        .filter_map(|step| shortest_path(grid, step, goal).map(|tail| (tail.len(), step, tail)))
        .min_by_key(|&(len, step, _)| (len, step))
        .map(|(len, _, tail)| {
            let mut path = Vec::with_capacity(len + 1);
            path.push(start);
            path.extend(tail);
            path
        })
}

/// Reconstruct path from came_from map.
fn reconstruct_path(came_from: &HashMap<Position, Position>, goal: Position) -> Path {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
