//! Grid maze with food.
//!
//! The agent perceives its eight neighbours clockwise from north and moves in
//! one of eight directions. Walls block movement; reaching food ends the trial.

use crate::agent::{Environment, Step, TransitionModel};
use crate::error::{Acs2Error, Acs2Result};
use crate::rules::{Action, Perception, Symbol};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Reward for reaching food.
pub const FOOD_REWARD: f64 = 1000.0;

/// Action names, indexed by action.
pub const ACTION_NAMES: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Offsets of the eight moves, in action order.
const MOVES: [(isize, isize); 8] = [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

/// Named layouts. `#` wall, `.` path, `F` food.
pub const LAYOUTS: [(&str, &str); 2] = [
    (
        "simple",
        "#######\n\
         #..#.F#\n\
         #.##..#\n\
         #.....#\n\
         #######",
    ),
    (
        "medium",
        "########\n\
         #..#..F#\n\
         ##.#.#.#\n\
         #......#\n\
         #.##.#.#\n\
         #....#.#\n\
         ########",
    ),
];

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    fn offset(self, (dx, dy): (isize, isize)) -> Option<Self> {
        Some(Self::new(self.x.checked_add_signed(dx)?, self.y.checked_add_signed(dy)?))
    }
}

/// Content of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Free cell.
    Path,
    /// Impassable cell.
    Wall,
    /// Goal cell.
    Food,
}

impl Cell {
    /// Perception symbol of the cell.
    #[must_use]
    pub const fn symbol(self) -> Symbol {
        match self {
            Self::Path => '0',
            Self::Wall => '1',
            Self::Food => '9',
        }
    }

    const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// A maze trial environment.
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    position: Coord,
    rng: SmallRng,
}

impl Maze {
    /// Parse a layout. Start cells are drawn from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] for ragged rows, unknown
    /// characters, or a layout without path or food cells.
    pub fn parse(layout: &str, seed: u64) -> Acs2Result<Self> {
        let rows: Vec<&str> = layout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(Acs2Error::Configuration("maze rows differ in length".into()));
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for c in rows.iter().flat_map(|r| r.chars()) {
            cells.push(match c {
                '.' => Cell::Path,
                '#' => Cell::Wall,
                'F' => Cell::Food,
                other => {
                    return Err(Acs2Error::Configuration(format!("unknown maze cell '{other}'")));
                }
            });
        }
        if !cells.contains(&Cell::Food) {
            return Err(Acs2Error::Configuration("maze has no food".into()));
        }

        let mut maze = Self {
            width,
            height: rows.len(),
            cells,
            position: Coord::new(0, 0),
            rng: SmallRng::seed_from_u64(seed),
        };
        maze.position = maze
            .path_cells()
            .first()
            .copied()
            .ok_or_else(|| Acs2Error::Configuration("maze has no path cells".into()))?;
        Ok(maze)
    }

    /// One of the [`LAYOUTS`] by name.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] for an unknown name.
    pub fn by_name(name: &str, seed: u64) -> Acs2Result<Self> {
        let (_, layout) = LAYOUTS
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| Acs2Error::Configuration(format!("unknown maze layout '{name}'")))?;
        Self::parse(layout, seed)
    }

    /// Name of an action, `?` when out of range.
    #[must_use]
    pub fn action_name(action: Action) -> &'static str {
        ACTION_NAMES.get(action).copied().unwrap_or("?")
    }

    /// Grid width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Current agent position.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Place the agent. Returns false and leaves it in place for walls.
    pub fn set_position(&mut self, at: Coord) -> bool {
        if self.cell(at).is_passable() {
            self.position = at;
            true
        } else {
            false
        }
    }

    /// Cell at `at`; outside the grid counts as wall.
    #[must_use]
    pub fn cell(&self, at: Coord) -> Cell {
        if at.x >= self.width || at.y >= self.height {
            return Cell::Wall;
        }
        self.cells[at.y * self.width + at.x]
    }

    /// Neighbours of `at`, clockwise from north.
    #[must_use]
    pub fn perception_at(&self, at: Coord) -> Perception {
        MOVES
            .iter()
            .map(|&m| at.offset(m).map_or(Cell::Wall, |c| self.cell(c)).symbol())
            .collect()
    }

    /// Perception at the current position.
    #[must_use]
    pub fn perception(&self) -> Perception {
        self.perception_at(self.position)
    }

    fn path_cells(&self) -> Vec<Coord> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Coord::new(x, y)))
            .filter(|&c| self.cell(c) == Cell::Path)
            .collect()
    }

    fn target(&self, from: Coord, action: Action) -> Option<Coord> {
        MOVES
            .get(action)
            .and_then(|&m| from.offset(m))
            .filter(|&c| self.cell(c).is_passable())
    }
}

impl Environment for Maze {
    type Observation = Perception;
    type Action = Action;

    fn reset(&mut self) -> Perception {
        let starts = self.path_cells();
        if !starts.is_empty() {
            self.position = starts[self.rng.gen_range(0..starts.len())];
        }
        self.perception()
    }

    fn step(&mut self, action: Action) -> Step<Perception> {
        if let Some(to) = self.target(self.position, action) {
            self.position = to;
        }
        let done = self.cell(self.position) == Cell::Food;
        let reward = if done { FOOD_REWARD } else { 0.0 };
        let mut step = Step::new(self.perception(), reward, done);
        step.info.insert("x".into(), Value::from(self.position.x));
        step.info.insert("y".into(), Value::from(self.position.y));
        step
    }
}

impl TransitionModel for Maze {
    fn possible_transitions(&self) -> Vec<(Perception, Action, Perception)> {
        let mut transitions = Vec::new();
        for from in self.path_cells() {
            let p0 = self.perception_at(from);
            for action in 0..MOVES.len() {
                if let Some(to) = self.target(from, action) {
                    transitions.push((p0.clone(), action, self.perception_at(to)));
                }
            }
        }
        transitions
    }
}
