use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::RelayError;

/// Result of one retrieval call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// Extracted page text that passed verification
    Succeeded(String),
    /// Every round ran out without a verified page
    Exhausted,
}

impl RetrievalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RetrievalOutcome::Succeeded(_))
    }

    /// The text handed back to callers: the content, or an empty string.
    pub fn into_text(self) -> String {
        match self {
            RetrievalOutcome::Succeeded(text) => text,
            RetrievalOutcome::Exhausted => String::new(),
        }
    }
}

/// Orchestrator state over discrete rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    Start,
    RoundInProgress { round: u32 },
    Succeeded,
    Exhausted,
}

/// Inputs that move the orchestrator between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalEvent {
    /// Session and blacklist are ready
    Begin,
    /// A candidate in the current round produced verified content
    RoundVerified,
    /// The current round ended without verified content
    RoundMissed,
}

impl RetrievalState {
    /// Transition table.
    ///
    /// | state              | event         | next                                    |
    /// |--------------------|---------------|-----------------------------------------|
    /// | Start              | Begin         | RoundInProgress(1), or Exhausted if 0   |
    /// | RoundInProgress(n) | RoundVerified | Succeeded                               |
    /// | RoundInProgress(n) | RoundMissed   | RoundInProgress(n+1), Exhausted at max  |
    /// | terminal           | any           | unchanged                               |
    ///
    /// Any other pairing leaves the state as it is.
    pub fn advance(self, event: RetrievalEvent, max_rounds: u32) -> Self {
        match (self, event) {
            (RetrievalState::Start, RetrievalEvent::Begin) => {
                if max_rounds == 0 {
                    RetrievalState::Exhausted
                } else {
                    RetrievalState::RoundInProgress { round: 1 }
                }
            }
            (RetrievalState::RoundInProgress { .. }, RetrievalEvent::RoundVerified) => {
                RetrievalState::Succeeded
            }
            (RetrievalState::RoundInProgress { round }, RetrievalEvent::RoundMissed) => {
                if round >= max_rounds {
                    RetrievalState::Exhausted
                } else {
                    RetrievalState::RoundInProgress { round: round + 1 }
                }
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RetrievalState::Succeeded | RetrievalState::Exhausted)
    }

    /// The blacklist is written back only when a call ends without content.
    pub fn persists_blacklist(&self) -> bool {
        matches!(self, RetrievalState::Exhausted)
    }
}

/// Counters reported by the status endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalSnapshot {
    pub succeeded: u64,
    pub exhausted: u64,
    pub failed: u64,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Process-wide retrieval counters
#[derive(Debug, Default)]
pub struct RetrievalStats {
    inner: RwLock<RetrievalSnapshot>,
}

impl RetrievalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: &Result<RetrievalOutcome, RelayError>) {
        let mut stats = self.inner.write();
        match result {
            Ok(RetrievalOutcome::Succeeded(_)) => stats.succeeded += 1,
            Ok(RetrievalOutcome::Exhausted) => stats.exhausted += 1,
            Err(e) => {
                stats.failed += 1;
                stats.last_error = Some(e.to_string());
            }
        }
        stats.last_finished_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> RetrievalSnapshot {
        self.inner.read().clone()
    }
}
