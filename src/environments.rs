//! Built-in environments.
//!
//! Currently a single deterministic grid maze, used by the CLI, the
//! integration tests and the benchmarks.

mod maze;

pub use maze::{ACTION_NAMES, Cell, Coord, FOOD_REWARD, LAYOUTS, Maze};
