//! Simulation clock and run state
//!
//! The clock only advances while running and stops for good once every
//! agent has evacuated.

use super::types::CLOCK_INCREMENT;

/// Lifecycle of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing started yet, or reset
    Idle,
    Running,
    Paused,
    /// Every agent has evacuated
    Finished,
}

/// Elapsed simulation time and run state
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Elapsed simulation time in seconds
    pub elapsed: f32,

    /// Number of ticks that advanced the clock
    pub ticks: u64,

    pub state: RunState,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            ticks: 0,
            state: RunState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Start a fresh run or resume a paused one. A running clock is left
    /// untouched.
    pub fn start(&mut self) {
        match self.state {
            RunState::Running => return,
            RunState::Paused => {}
            RunState::Idle | RunState::Finished => {
                self.elapsed = 0.0;
                self.ticks = 0;
            }
        }
        self.state = RunState::Running;
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn finish(&mut self) {
        self.state = RunState::Finished;
    }

    /// Advance by one tick at the given speed scale
    pub fn advance(&mut self, speed_scale: f32) {
        if self.is_running() {
            self.elapsed += CLOCK_INCREMENT * speed_scale;
            self.ticks += 1;
        }
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "State: {:?} | Time: {:.1}s | Ticks: {}",
            self.state, self.elapsed, self.ticks
        )
    }
}
