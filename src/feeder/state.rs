use serde::Serialize;
use std::fmt;

/// Lifecycle of a single feeder instance.
///
/// ```text
/// Idle ──start──▶ Streaming ──source end, nothing pending──▶ Closed
///                    │   └──source end, queue or write pending──▶ Draining ──drained──▶ Closed
///                    └──────────────┬──────────────────────────────────┘
///                          source/sink error ──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeederState {
    /// Sink not attached yet, nothing pulled from the source.
    #[default]
    Idle,
    /// Source is still producing chunks.
    Streaming,
    /// Source exhausted; waiting for the sink to consume the remainder.
    Draining,
    /// Everything delivered and the sink closed.
    Closed,
    /// Source or sink failed; the sink is left unclosed.
    Failed,
}

impl FeederState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FeederState::Closed | FeederState::Failed)
    }

    /// States in which source and sink events are still processed.
    pub fn is_active(self) -> bool {
        matches!(self, FeederState::Streaming | FeederState::Draining)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeederState::Idle => "idle",
            FeederState::Streaming => "streaming",
            FeederState::Draining => "draining",
            FeederState::Closed => "closed",
            FeederState::Failed => "failed",
        }
    }
}

impl fmt::Display for FeederState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
