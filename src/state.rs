use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle states of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No run has started, or the previous result has been consumed
    Idle,
    /// Reserved for attended-mode flows that pause for manual browser
    /// interaction. No transition currently produces this state.
    Waiting,
    /// The batch loop is processing URLs
    Scraping,
    /// The batch loop finished every URL in the request
    Completed,
}

/// Rejected lifecycle transitions. The state is left unchanged.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("a batch is already scraping; only one run may be in flight")]
    AlreadyScraping,

    #[error("cannot complete a run from the {0:?} state")]
    NotScraping(RunState),
}

/// Tracks the orchestration lifecycle for one session.
///
/// Exactly one machine is live per session. `Idle` is the initial state;
/// relaunching from `Completed` returns to `Scraping`. Launching while a
/// batch is in flight is rejected so the caller cannot start overlapping
/// runs against the shared browser handle.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    /// The current lifecycle state, for progress display.
    pub fn current(&self) -> RunState {
        self.state
    }

    /// Enter `Scraping` from `Idle` or `Completed`.
    ///
    /// The caller is expected to have validated the request first; this
    /// transition only guards against overlapping launches.
    pub fn launch(&mut self) -> Result<(), StateError> {
        match self.state {
            RunState::Idle | RunState::Completed => {
                self.state = RunState::Scraping;
                Ok(())
            }
            RunState::Scraping | RunState::Waiting => Err(StateError::AlreadyScraping),
        }
    }

    /// Enter `Completed` once the batch loop has processed every URL,
    /// regardless of per-URL success or failure.
    pub fn complete(&mut self) -> Result<(), StateError> {
        match self.state {
            RunState::Scraping => {
                self.state = RunState::Completed;
                Ok(())
            }
            other => Err(StateError::NotScraping(other)),
        }
    }
}
