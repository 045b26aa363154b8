//! The static battlefield: floor and wall cells plus who stands where.
//!
//! Cells are stored row-major, so iterating the cell vector visits
//! positions in reading order. Occupancy is an index into the unit
//! roster owned by [`Simulation`](crate::simulation::Simulation); the
//! grid never owns units.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, MalformedGrid, Result};
use crate::unit::{Faction, UnitId};

/// A cell coordinate. Ordering is reading order: row first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing to the right.
    pub x: u32,
    /// Row, growing downwards.
    pub y: u32,
}

impl Position {
    /// Create a position from column and row.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether the two positions share an edge.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One battlefield cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable rock. Never occupied.
    Wall,
    /// Open ground, possibly holding one living unit.
    Floor {
        /// The unit standing here, if any.
        occupant: Option<UnitId>,
    },
}

impl Cell {
    /// An empty floor cell.
    pub const EMPTY: Self = Self::Floor { occupant: None };

    /// Returns true for floor cells, occupied or not.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, Self::Floor { .. })
    }

    /// The unit standing on this cell.
    #[must_use]
    pub const fn occupant(self) -> Option<UnitId> {
        match self {
            Self::Floor { occupant } => occupant,
            Self::Wall => None,
        }
    }

    /// Floor with nobody on it.
    #[must_use]
    pub const fn is_occupiable(self) -> bool {
        matches!(self, Self::Floor { occupant: None })
    }
}

/// Rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major cell storage.
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell empty floor.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");

        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; (width as usize) * (height as usize)],
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Check if a position lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok((pos.y as usize) * (self.width as usize) + (pos.x as usize))
        } else {
            Err(CombatError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Get the cell at a position.
    pub fn cell_at(&self, pos: Position) -> Result<Cell> {
        self.index(pos).map(|index| self.cells[index])
    }

    /// Turn an empty cell into a wall.
    pub fn set_wall(&mut self, pos: Position) -> Result<()> {
        let index = self.index(pos)?;
        if let Some(id) = self.cells[index].occupant() {
            return Err(CombatError::InvalidState(format!(
                "cannot wall over unit {id} at {pos}"
            )));
        }
        self.cells[index] = Cell::Wall;
        Ok(())
    }

    /// The unit standing at a position. `None` for walls, empty floor and
    /// out-of-bounds positions.
    #[must_use]
    pub fn occupant(&self, pos: Position) -> Option<UnitId> {
        self.cell_at(pos).ok().and_then(Cell::occupant)
    }

    /// Floor with no occupant. Out-of-bounds positions are not occupiable.
    #[must_use]
    pub fn is_occupiable(&self, pos: Position) -> bool {
        self.cell_at(pos).is_ok_and(Cell::is_occupiable)
    }

    /// In-bounds orthogonal neighbours in reading order: up, left, right, down.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let Position { x, y } = pos;
        let candidates = [
            y.checked_sub(1).map(|y| Position::new(x, y)),
            x.checked_sub(1).map(|x| Position::new(x, y)),
            x.checked_add(1).map(|x| Position::new(x, y)),
            y.checked_add(1).map(|y| Position::new(x, y)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |p| self.in_bounds(*p))
    }

    /// All positions in reading order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Occupied positions in reading order.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, UnitId)> + '_ {
        self.positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.occupant().map(|id| (pos, id)))
    }

    /// Put a unit on an empty floor cell.
    pub fn place(&mut self, pos: Position, id: UnitId) -> Result<()> {
        let index = self.index(pos)?;
        match self.cells[index] {
            Cell::Floor { occupant: None } => {
                self.cells[index] = Cell::Floor { occupant: Some(id) };
                Ok(())
            }
            Cell::Floor { occupant: Some(other) } => Err(CombatError::InvalidState(format!(
                "cannot place unit {id} at {pos}: occupied by unit {other}"
            ))),
            Cell::Wall => Err(CombatError::InvalidState(format!(
                "cannot place unit {id} at {pos}: wall"
            ))),
        }
    }

    /// Move whoever stands on `from` to the empty floor cell `to`.
    ///
    /// Both cells are validated before either is touched, so a failed
    /// move leaves the grid unchanged.
    pub fn move_occupant(&mut self, from: Position, to: Position) -> Result<UnitId> {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;

        let id = self.cells[from_index].occupant().ok_or_else(|| {
            CombatError::InvalidState(format!("no unit to move at {from}"))
        })?;
        if !self.cells[to_index].is_occupiable() {
            return Err(CombatError::InvalidState(format!(
                "cannot move unit {id} to {to}: not empty floor"
            )));
        }

        self.cells[from_index] = Cell::EMPTY;
        self.cells[to_index] = Cell::Floor { occupant: Some(id) };
        Ok(id)
    }

    /// Clear the occupant of a cell, returning who stood there.
    pub fn vacate(&mut self, pos: Position) -> Result<UnitId> {
        let index = self.index(pos)?;
        let id = self.cells[index]
            .occupant()
            .ok_or_else(|| CombatError::InvalidState(format!("no unit to remove at {pos}")))?;
        self.cells[index] = Cell::EMPTY;
        Ok(id)
    }
}

/// A unit's starting placement as read from the battlefield text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    /// Starting cell.
    pub position: Position,
    /// Side the unit fights for.
    pub faction: Faction,
}

/// A parsed battlefield: empty terrain plus starting placements.
///
/// Spawns are listed in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlefield {
    /// Terrain with no occupants.
    pub grid: Grid,
    /// Unit placements in reading order.
    pub spawns: Vec<Spawn>,
}

impl Battlefield {
    /// Parse the `#`/`.`/`E`/`G` battlefield notation.
    ///
    /// Leading and trailing blank lines and trailing whitespace on each
    /// row are ignored. Every remaining row must have the same width.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows: Vec<&str> = text.lines().map(str::trim_end).collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let first = rows.iter().position(|row| !row.is_empty()).unwrap_or(rows.len());
        let rows = &rows[first..];

        let Some(top) = rows.first() else {
            return Err(MalformedGrid::Empty.into());
        };
        let width = top.chars().count();

        let mut grid = Grid::new(width as u32, rows.len() as u32);
        let mut spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MalformedGrid::Ragged {
                    row: y,
                    expected: width,
                    found,
                }
                .into());
            }

            for (x, marker) in row.chars().enumerate() {
                let pos = Position::new(x as u32, y as u32);
                match marker {
                    '#' => grid.set_wall(pos)?,
                    '.' => {}
                    other => {
                        let faction = Faction::from_marker(other).ok_or(
                            MalformedGrid::UnknownMarker {
                                marker: other,
                                x,
                                y,
                            },
                        )?;
                        spawns.push(Spawn {
                            position: pos,
                            faction,
                        });
                    }
                }
            }
        }

        Ok(Self { grid, spawns })
    }
}

impl FromStr for Battlefield {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: u32, y: u32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_reading_order() {
        assert!(pos(5, 0) < pos(0, 1));
        assert!(pos(1, 3) < pos(2, 3));

        let mut positions = vec![pos(2, 2), pos(0, 3), pos(9, 1), pos(1, 2)];
        positions.sort();
        assert_eq!(positions, vec![pos(9, 1), pos(1, 2), pos(2, 2), pos(0, 3)]);
    }

    #[test]
    fn test_neighbors_order() {
        let grid = Grid::new(3, 3);
        let around: Vec<_> = grid.neighbors(pos(1, 1)).collect();
        assert_eq!(around, vec![pos(1, 0), pos(0, 1), pos(2, 1), pos(1, 2)]);

        // Reading order and enumeration order agree
        let mut sorted = around.clone();
        sorted.sort();
        assert_eq!(around, sorted);
    }

    #[test]
    fn test_neighbors_at_edges() {
        let grid = Grid::new(3, 2);
        let corner: Vec<_> = grid.neighbors(pos(0, 0)).collect();
        assert_eq!(corner, vec![pos(1, 0), pos(0, 1)]);

        let far: Vec<_> = grid.neighbors(pos(2, 1)).collect();
        assert_eq!(far, vec![pos(2, 0), pos(1, 1)]);
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let grid = Grid::new(4, 4);
        assert!(grid.cell_at(pos(3, 3)).is_ok());
        assert_eq!(
            grid.cell_at(pos(4, 0)),
            Err(CombatError::OutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 4
            })
        );
        assert!(!grid.is_occupiable(pos(0, 9)));
    }

    #[test]
    fn test_place_and_move() {
        let mut grid = Grid::new(3, 1);
        grid.place(pos(0, 0), 7).unwrap();
        assert!(!grid.is_occupiable(pos(0, 0)));
        assert_eq!(grid.occupant(pos(0, 0)), Some(7));

        assert_eq!(grid.move_occupant(pos(0, 0), pos(1, 0)), Ok(7));
        assert!(grid.is_occupiable(pos(0, 0)));
        assert_eq!(grid.occupant(pos(1, 0)), Some(7));

        assert_eq!(grid.vacate(pos(1, 0)), Ok(7));
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_failed_move_leaves_grid_unchanged() {
        let mut grid = Grid::new(3, 1);
        grid.place(pos(0, 0), 1).unwrap();
        grid.place(pos(1, 0), 2).unwrap();
        grid.set_wall(pos(2, 0)).unwrap();

        let before = grid.clone();
        assert!(grid.move_occupant(pos(0, 0), pos(1, 0)).is_err());
        assert!(grid.move_occupant(pos(1, 0), pos(2, 0)).is_err());
        assert!(grid.move_occupant(pos(1, 0), pos(3, 0)).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_walls_reject_units() {
        let mut grid = Grid::new(2, 1);
        grid.set_wall(pos(1, 0)).unwrap();
        assert!(grid.place(pos(1, 0), 0).is_err());
        assert_eq!(grid.occupant(pos(1, 0)), None);

        grid.place(pos(0, 0), 0).unwrap();
        assert!(grid.set_wall(pos(0, 0)).is_err());
    }

    #[test]
    fn test_parse_battlefield() {
        let field = Battlefield::parse("#####\n#G.E#\n#####\n").unwrap();
        assert_eq!(field.grid.width(), 5);
        assert_eq!(field.grid.height(), 3);
        assert_eq!(field.grid.cell_at(pos(0, 0)), Ok(Cell::Wall));
        assert_eq!(field.grid.cell_at(pos(2, 1)), Ok(Cell::EMPTY));
        assert_eq!(
            field.spawns,
            vec![
                Spawn {
                    position: pos(1, 1),
                    faction: Faction::Goblin
                },
                Spawn {
                    position: pos(3, 1),
                    faction: Faction::Elf
                },
            ]
        );
        // Spawns are not placed until a simulation owns them
        assert_eq!(field.grid.occupied().count(), 0);
    }

    #[test]
    fn test_parse_ignores_blank_edges() {
        let field: Battlefield = "\n\n###\n#E#\n###  \n\n".parse().unwrap();
        assert_eq!(field.grid.height(), 3);
        assert_eq!(field.spawns.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Battlefield::parse("\n  \n"),
            Err(CombatError::MalformedGrid(MalformedGrid::Empty))
        );
        assert_eq!(
            Battlefield::parse("####\n#.#\n"),
            Err(CombatError::MalformedGrid(MalformedGrid::Ragged {
                row: 1,
                expected: 4,
                found: 3
            }))
        );
        assert_eq!(
            Battlefield::parse("###\n#X#\n###"),
            Err(CombatError::MalformedGrid(MalformedGrid::UnknownMarker {
                marker: 'X',
                x: 1,
                y: 1
            }))
        );
    }
}
