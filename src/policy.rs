use std::collections::HashMap;

use crate::environment::{Heading, Memory, Pos, EXIT, FOOD, WALL};

/// What the policy decided for this tick: either turn and step forward, or
/// only turn. The agent applies the action; a policy never touches the maze.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Advance(Heading),
    Reorient(Heading),
}

/// Read-only snapshot of the agent state the policy is allowed to see.
pub struct AgentView<'a> {
    pub pos: Pos,
    pub heading: Heading,
    pub memory: &'a Memory,
    pub visits: &'a HashMap<Pos, u32>,
    pub collected: usize,
    pub total_food: usize,
}

impl AgentView<'_> {
    fn remembered(&self, pos: Pos) -> Option<char> {
        self.memory.get(&pos).copied()
    }

    fn all_food_collected(&self) -> bool {
        self.collected == self.total_food
    }

    /// Terrain rule: walls are never free, the exit glyph is a temporary
    /// wall until every food item is collected, everything else (including
    /// unknown cells) is free.
    fn is_free(&self, pos: Pos) -> bool {
        match self.remembered(pos) {
            Some(WALL) => false,
            Some(EXIT) if !self.all_food_collected() => false,
            _ => true,
        }
    }
}

pub trait Policy {
    fn decide(&self, view: &AgentView<'_>) -> Action;
}

/// The exploration policy: reactive goals first, then least-visited
/// exploration over remembered terrain. Evaluated in strict priority order;
/// the first matching rule wins.
pub struct GreedyExplorer;

impl Policy for GreedyExplorer {
    fn decide(&self, view: &AgentView<'_>) -> Action {
        // Adjacent remembered food, or the exit once everything is collected.
        // Heading::ALL fixes the tie-break order.
        for heading in Heading::ALL {
            let target = view.pos.offset(heading.into_vector());
            match view.remembered(target) {
                Some(FOOD) => return Action::Advance(heading),
                Some(EXIT) if view.all_food_collected() => return Action::Advance(heading),
                _ => {}
            }
        }

        // Exploration: among free neighbors, the least-visited one.
        let mut best: Option<(Heading, u32)> = None;
        for heading in Heading::ALL {
            let target = view.pos.offset(heading.into_vector());
            if !view.is_free(target) {
                continue;
            }
            let count = view.visits.get(&target).copied().unwrap_or(0);
            match best {
                Some((_, best_count)) if best_count <= count => {}
                _ => best = Some((heading, count)),
            }
        }

        match best {
            Some((heading, _)) => Action::Advance(heading),
            // Boxed in according to memory: reset to a known orientation and
            // try again next tick.
            None => Action::Reorient(Heading::North),
        }
    }
}
