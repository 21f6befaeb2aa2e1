//! A single agent exploring a 2-D grid maze under partial observability.
//!
//! The agent senses a 3x3 neighborhood per tick, accumulates a private
//! memory of the maze, and must collect every food marker before the exit
//! becomes passable. [`environment::Maze`] owns the grid and answers sensor
//! and move-commit requests; [`agent::Agent`] owns memory, visit counts and
//! the perception-decision-action loop; [`policy`] holds the decision rules;
//! [`replay`] consumes a finished run's trajectory.

pub mod agent;
pub mod environment;
pub mod policy;
pub mod replay;

pub use agent::{Agent, RunOutcome, TickReport, TickStatus};
pub use environment::{Heading, Maze, MazeError, Pos};
pub use policy::{Action, GreedyExplorer, Policy};
