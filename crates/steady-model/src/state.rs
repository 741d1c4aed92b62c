//! Service lifecycle states, sub-states and modes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle state of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Not running
    Down,
    /// Start action in progress
    Starting,
    /// Running
    Up,
    /// Start action failed
    Failed,
    /// Being removed from the runtime
    Removing,
    /// Removed from the runtime
    Removed,
}

impl State {
    /// Upper-case name, as shown to operators
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            State::Down => "DOWN",
            State::Starting => "STARTING",
            State::Up => "UP",
            State::Failed => "FAILED",
            State::Removing => "REMOVING",
            State::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fine-grained lifecycle state
///
/// [`Substate::Problem`] marks a service that cannot reach its target state
/// because a dependency is unavailable, failed, or itself blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Substate {
    /// Just installed, not yet resolved
    New,
    /// Resolved and waiting
    Down,
    /// Blocked by an unavailable or failed dependency
    Problem,
    /// Start action running
    Starting,
    /// Start action threw
    StartFailed,
    /// Running
    Up,
    /// Removal in progress
    Removing,
    /// Gone
    Removed,
}

impl Substate {
    /// Coarse state for this sub-state
    #[must_use]
    pub const fn state(self) -> State {
        match self {
            Substate::New | Substate::Down | Substate::Problem => State::Down,
            Substate::Starting => State::Starting,
            Substate::StartFailed => State::Failed,
            Substate::Up => State::Up,
            Substate::Removing => State::Removing,
            Substate::Removed => State::Removed,
        }
    }

    /// Whether a service in this sub-state has stopped changing
    #[must_use]
    pub const fn is_rest_state(self) -> bool {
        !matches!(self, Substate::New | Substate::Starting | Substate::Removing)
    }

    /// Upper-case name, as shown to operators
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Substate::New => "NEW",
            Substate::Down => "DOWN",
            Substate::Problem => "PROBLEM",
            Substate::Starting => "STARTING",
            Substate::StartFailed => "START_FAILED",
            Substate::Up => "UP",
            Substate::Removing => "REMOVING",
            Substate::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for Substate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Start as soon as dependencies allow
    #[default]
    Active,
    /// Start when demanded by a dependent
    OnDemand,
    /// Start opportunistically, never demand dependencies
    Passive,
    /// Never start
    Never,
    /// Scheduled for removal
    Remove,
}

impl Mode {
    /// Whether services in this mode are excluded from graph-wide scans
    #[must_use]
    pub const fn is_inert(self) -> bool {
        matches!(self, Mode::Never | Mode::Remove)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Active => "ACTIVE",
            Mode::OnDemand => "ON_DEMAND",
            Mode::Passive => "PASSIVE",
            Mode::Never => "NEVER",
            Mode::Remove => "REMOVE",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substate_maps_to_state() {
        assert_eq!(Substate::Problem.state(), State::Down);
        assert_eq!(Substate::New.state(), State::Down);
        assert_eq!(Substate::StartFailed.state(), State::Failed);
        assert_eq!(Substate::Up.state(), State::Up);
    }

    #[test]
    fn transitional_substates_are_not_rest() {
        assert!(!Substate::New.is_rest_state());
        assert!(!Substate::Starting.is_rest_state());
        assert!(!Substate::Removing.is_rest_state());
        assert!(Substate::Problem.is_rest_state());
        assert!(Substate::StartFailed.is_rest_state());
    }

    #[test]
    fn inert_modes() {
        assert!(Mode::Never.is_inert());
        assert!(Mode::Remove.is_inert());
        assert!(!Mode::Active.is_inert());
        assert!(!Mode::OnDemand.is_inert());
    }

    #[test]
    fn names_are_upper_case() {
        assert_eq!(State::Failed.to_string(), "FAILED");
        assert_eq!(Substate::StartFailed.to_string(), "START_FAILED");
        assert_eq!(Mode::OnDemand.to_string(), "ON_DEMAND");
    }
}
