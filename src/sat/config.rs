#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Solver configuration.
//!
//! The cutoff and the backjump policy are the only knobs the search loop
//! reads; the branching heuristics are passed alongside as strategy values.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Wall-clock budget used when the caller does not give one.
pub const DEFAULT_CUTOFF: Duration = Duration::from_secs(1200);

/// What the solver does after a conflict above decision level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackjumpPolicy {
    /// Learn a first-UIP clause by resolution, jump to its asserting level
    /// and let the clause imply the flipped literal.
    #[default]
    ConflictDriven,
    /// Learn nothing; flip the most recent decision that still has an
    /// untried branch.
    Chronological,
}

impl fmt::Display for BackjumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictDriven => write!(f, "conflict-driven"),
            Self::Chronological => write!(f, "chronological"),
        }
    }
}

impl FromStr for BackjumpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conflict-driven" | "cdcl" => Ok(Self::ConflictDriven),
            "chronological" | "dpll" => Ok(Self::Chronological),
            other => Err(format!("unknown backjump policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpllConfig {
    pub cutoff: Duration,
    pub backjump: BackjumpPolicy,
    /// Whether pure-literal deletion runs. Under `ConflictDriven` it is only
    /// ever applied at decision level 0.
    pub pure_literal_deletion: bool,
}

impl Default for DpllConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            backjump: BackjumpPolicy::default(),
            pure_literal_deletion: true,
        }
    }
}

impl DpllConfig {
    #[must_use]
    pub const fn with_cutoff(mut self, cutoff: Duration) -> Self {
        self.cutoff = cutoff;
        self
    }

    #[must_use]
    pub const fn with_backjump(mut self, backjump: BackjumpPolicy) -> Self {
        self.backjump = backjump;
        self
    }

    #[must_use]
    pub const fn with_pure_literal_deletion(mut self, enabled: bool) -> Self {
        self.pure_literal_deletion = enabled;
        self
    }

    /// Whether pure-literal deletion may run at `level`.
    #[must_use]
    pub const fn pure_literals_at(&self, level: usize) -> bool {
        self.pure_literal_deletion
            && (level == 0 || matches!(self.backjump, BackjumpPolicy::Chronological))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DpllConfig::default();
        assert_eq!(config.cutoff, Duration::from_secs(1200));
        assert_eq!(config.backjump, BackjumpPolicy::ConflictDriven);
        assert!(config.pure_literal_deletion);
    }

    #[test]
    fn test_pure_literal_levels() {
        let cdcl = DpllConfig::default();
        assert!(cdcl.pure_literals_at(0));
        assert!(!cdcl.pure_literals_at(3));

        let chrono = DpllConfig::default().with_backjump(BackjumpPolicy::Chronological);
        assert!(chrono.pure_literals_at(3));

        let off = chrono.with_pure_literal_deletion(false);
        assert!(!off.pure_literals_at(0));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("chronological".parse::<BackjumpPolicy>(), Ok(BackjumpPolicy::Chronological));
        assert_eq!("conflict-driven".parse::<BackjumpPolicy>(), Ok(BackjumpPolicy::ConflictDriven));
        assert!("sideways".parse::<BackjumpPolicy>().is_err());
        assert_eq!(BackjumpPolicy::Chronological.to_string(), "chronological");
    }
}
