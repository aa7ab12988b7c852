//! Status - worker ごとの状態
//!
//! shutdown 時に「どの worker がどこで止まっていないか」を説明するために使う。

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Per-worker state machine.
///
/// ```text
/// Idle → Delaying → (Completing | Abandoned) → Idle
///                                 ↓
///                              Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Waiting for a request.
    Idle,
    /// Holding a request, waiting out the delay.
    Delaying,
    /// Inside the task store call.
    Completing,
    /// Dropped its request because of shutdown.
    Abandoned,
    /// Loop exited.
    Stopped,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Idle,
            1 => WorkerState::Delaying,
            2 => WorkerState::Completing,
            3 => WorkerState::Abandoned,
            _ => WorkerState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Idle => 0,
            WorkerState::Delaying => 1,
            WorkerState::Completing => 2,
            WorkerState::Abandoned => 3,
            WorkerState::Stopped => 4,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Delaying => "delaying",
            WorkerState::Completing => "completing",
            WorkerState::Abandoned => "abandoned",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Lock-free board of every worker's current state, indexed by worker id.
#[derive(Debug)]
pub struct WorkerBoard {
    slots: Vec<AtomicU8>,
}

impl WorkerBoard {
    pub fn new(workers: usize) -> Self {
        Self {
            slots: (0..workers)
                .map(|_| AtomicU8::new(WorkerState::Idle.as_u8()))
                .collect(),
        }
    }

    pub fn set(&self, worker_id: usize, state: WorkerState) {
        if let Some(slot) = self.slots.get(worker_id) {
            slot.store(state.as_u8(), Ordering::Release);
        }
    }

    pub fn get(&self, worker_id: usize) -> Option<WorkerState> {
        self.slots
            .get(worker_id)
            .map(|slot| WorkerState::from_u8(slot.load(Ordering::Acquire)))
    }

    pub fn snapshot(&self) -> Vec<WorkerState> {
        self.slots
            .iter()
            .map(|slot| WorkerState::from_u8(slot.load(Ordering::Acquire)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_starts_idle_and_tracks_updates() {
        let board = WorkerBoard::new(3);
        assert_eq!(board.snapshot(), vec![WorkerState::Idle; 3]);

        board.set(1, WorkerState::Delaying);
        board.set(2, WorkerState::Stopped);

        assert_eq!(board.get(1), Some(WorkerState::Delaying));
        assert_eq!(board.get(2), Some(WorkerState::Stopped));
        assert_eq!(board.get(3), None);
    }

    #[test]
    fn state_roundtrips_through_u8() {
        for state in [
            WorkerState::Idle,
            WorkerState::Delaying,
            WorkerState::Completing,
            WorkerState::Abandoned,
            WorkerState::Stopped,
        ] {
            assert_eq!(WorkerState::from_u8(state.as_u8()), state);
        }
    }
}
