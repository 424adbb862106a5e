use std::collections::VecDeque;

use crate::util::position::{Direction, Position};

/// Queued movement for one actor, applied by the pre-sync phase.
///
/// Pathfinding lives elsewhere; by the time steps land here they are a
/// validated route of single-tile moves.
#[derive(Debug, Default)]
pub struct Motion {
    steps: VecDeque<Direction>,
    running: bool,
}

impl Motion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_step(&mut self, direction: Direction) {
        self.steps.push_back(direction);
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Discards the queued route. Used on teleport, where continuing a stale
    /// path from the new tile would walk the actor somewhere nonsensical.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Pops up to this tick's step allowance (one walking, two running) and
    /// applies them to `position`. Returns the number of steps taken.
    pub fn advance(&mut self, position: &mut Position) -> usize {
        let allowance = if self.running { 2 } else { 1 };
        let mut taken = 0;
        while taken < allowance {
            let Some(direction) = self.steps.pop_front() else {
                break;
            };
            *position = position.step(direction);
            taken += 1;
        }
        taken
    }
}
