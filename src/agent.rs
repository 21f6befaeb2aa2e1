use std::collections::HashMap;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::environment::{Heading, Maze, Memory, Pos, CORRIDOR, EXIT, FOOD, WALL};
use crate::policy::{Action, AgentView, GreedyExplorer, Policy};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Terminated,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All food collected and the exit reached. Score is reporting only.
    Completed { score: i64 },
    /// The harness tick ceiling was hit before the goal. The simulation
    /// itself never detects non-progress.
    TickLimit,
}

/// Per-tick snapshot handed to the observer callback. Presentation only;
/// nothing here feeds back into the simulation.
pub struct TickReport<'a> {
    pub render: &'a str,
    pub pos: Pos,
    pub heading: Heading,
    pub steps: u64,
    pub collected: usize,
    pub total_food: usize,
}

/// The explorer. Owns everything the maze does not: believed position and
/// heading, sensed memory, visit counts, the trajectory, and the counters.
pub struct Agent {
    pos: Pos,
    heading: Heading,
    memory: Memory,
    visits: HashMap<Pos, u32>,
    trajectory: Vec<Pos>,
    steps: u64,
    collected: usize,
    total_food: usize,
    policy: Box<dyn Policy>,
}

impl Agent {
    pub fn new(maze: &Maze) -> Self {
        Self::with_policy(maze, Box::new(GreedyExplorer))
    }

    pub fn with_policy(maze: &Maze, policy: Box<dyn Policy>) -> Self {
        let pos = maze.agent_pos();
        Agent {
            pos,
            heading: Heading::South,
            memory: Memory::new(),
            visits: HashMap::new(),
            trajectory: vec![pos],
            steps: 0,
            collected: 0,
            total_food: maze.total_food(),
            policy,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn total_food(&self) -> usize {
        self.total_food
    }

    pub fn trajectory(&self) -> &[Pos] {
        &self.trajectory
    }

    pub fn visit_count(&self, pos: Pos) -> u32 {
        self.visits.get(&pos).copied().unwrap_or(0)
    }

    pub fn remembered(&self, pos: Pos) -> Option<char> {
        self.memory.get(&pos).copied()
    }

    /// Final score: 10 per food item minus one per step.
    pub fn score(&self) -> i64 {
        self.collected as i64 * 10 - self.steps as i64
    }

    /// Pulls the 3x3 sensor window at the believed position and folds it
    /// into memory. First observation wins: a coordinate already in memory
    /// is never refreshed here, even when the live grid has moved on.
    pub fn sense(&mut self, maze: &Maze) -> Array2<char> {
        let window = maze.sense_window(self.pos);
        for dy in -1..=1i32 {
            for dx in -1..=1i32 {
                let pos = self.pos.offset((dx, dy));
                let observed = window[[(dy + 1) as usize, (dx + 1) as usize]];
                self.memory.entry(pos).or_insert(observed);
            }
        }
        window
    }

    /// Turns to `heading` and repaints the glyph at the current cell.
    pub fn face(&mut self, maze: &mut Maze, heading: Heading) {
        self.heading = heading;
        maze.set_glyph(self.pos, heading);
    }

    /// Glyph-level actuator: an unknown glyph is reported and ignored,
    /// state left unchanged.
    pub fn face_glyph(&mut self, maze: &mut Maze, glyph: char) {
        match Heading::from_glyph(glyph) {
            Ok(heading) => self.face(maze, heading),
            Err(e) => warn!("{}", e),
        }
    }

    /// Attempts one step forward along the current heading. The destination
    /// is consulted in memory only; unknown cells are optimistically
    /// passable. A remembered wall rejects the move silently: no counter,
    /// no position change. Returns whether the step was committed.
    pub fn advance(&mut self, maze: &mut Maze) -> bool {
        let dest = self.pos.offset(self.heading.into_vector());
        if self.memory.get(&dest) == Some(&WALL) {
            return false;
        }

        let from = self.pos;
        self.pos = dest;
        *self.visits.entry(dest).or_insert(0) += 1;
        self.steps += 1;
        maze.commit_move(from, dest, self.heading);
        self.trajectory.push(dest);

        // The only place memory is overwritten after first observation:
        // food under the agent is consumed in its belief as well.
        if self.memory.get(&dest) == Some(&FOOD) {
            self.collected += 1;
            self.memory.insert(dest, CORRIDOR);
            info!("food collected: {}/{}", self.collected, self.total_food);
        }
        true
    }

    fn goal_reached(&self) -> bool {
        self.collected == self.total_food && self.memory.get(&self.pos) == Some(&EXIT)
    }

    fn decide_and_apply(&mut self, maze: &mut Maze) {
        let view = AgentView {
            pos: self.pos,
            heading: self.heading,
            memory: &self.memory,
            visits: &self.visits,
            collected: self.collected,
            total_food: self.total_food,
        };
        let action = self.policy.decide(&view);
        debug!("tick decision at {:?}: {:?}", self.pos, action);
        match action {
            Action::Advance(heading) => {
                self.face(maze, heading);
                self.advance(maze);
            }
            Action::Reorient(heading) => {
                self.face(maze, heading);
            }
        }
    }

    /// One perception-decision-action cycle. Sensing always happens first;
    /// the decision only runs while the goal is not reached.
    pub fn tick(&mut self, maze: &mut Maze) -> TickStatus {
        self.sense(maze);
        if self.goal_reached() {
            return TickStatus::Terminated;
        }
        self.decide_and_apply(maze);
        TickStatus::Running
    }

    /// Drives the loop to termination, invoking `on_tick` once per tick with
    /// the fresh render and counters. `max_ticks` is a harness ceiling for
    /// mazes whose goal is unreachable; pass `None` to run unbounded.
    pub fn run<F>(&mut self, maze: &mut Maze, max_ticks: Option<u64>, mut on_tick: F) -> RunOutcome
    where
        F: FnMut(&TickReport<'_>),
    {
        let mut ticks = 0u64;
        loop {
            if let Some(limit) = max_ticks {
                if ticks >= limit {
                    return RunOutcome::TickLimit;
                }
            }
            ticks += 1;

            self.sense(maze);
            let render = maze.render();
            on_tick(&TickReport {
                render: &render,
                pos: self.pos,
                heading: self.heading,
                steps: self.steps,
                collected: self.collected,
                total_food: self.total_food,
            });

            if self.goal_reached() {
                let score = self.score();
                info!(
                    "goal reached: {} food in {} steps, score {}",
                    self.collected, self.steps, score
                );
                return RunOutcome::Completed { score };
            }
            self.decide_and_apply(maze);
        }
    }
}
