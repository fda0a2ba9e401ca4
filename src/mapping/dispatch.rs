//! Dispatch phases and their composition.
//!
//! # Responsibilities
//! - Enumerate the four base phases a filter can run in
//! - Represent any combination of phases as a single composite value
//! - Default an unconfigured composite to REQUEST-only
//!
//! # Design Decisions
//! - Composite is a 4-bit set; composing is a bitwise OR
//! - Zero is reserved as the "unset" sentinel, distinct from {REQUEST}

use std::fmt;
use std::str::FromStr;

/// A single request-processing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPhase {
    Request,
    Forward,
    Include,
    Error,
}

impl DispatchPhase {
    pub const ALL: [DispatchPhase; 4] = [
        DispatchPhase::Request,
        DispatchPhase::Forward,
        DispatchPhase::Include,
        DispatchPhase::Error,
    ];

    const fn bit(self) -> u8 {
        match self {
            DispatchPhase::Request => 0b0001,
            DispatchPhase::Forward => 0b0010,
            DispatchPhase::Include => 0b0100,
            DispatchPhase::Error => 0b1000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DispatchPhase::Request => "REQUEST",
            DispatchPhase::Forward => "FORWARD",
            DispatchPhase::Include => "INCLUDE",
            DispatchPhase::Error => "ERROR",
        }
    }
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dispatcher name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dispatcher '{0}' (expected REQUEST, FORWARD, INCLUDE or ERROR)")]
pub struct UnknownDispatcher(pub String);

impl FromStr for DispatchPhase {
    type Err = UnknownDispatcher;

    /// Dispatcher names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DispatchPhase::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDispatcher(trimmed.to_string()))
    }
}

/// A set of dispatch phases, or the explicit "unset" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DispatchTypes(u8);

impl DispatchTypes {
    /// No phase configured. Resolves to REQUEST-only.
    pub const UNSET: DispatchTypes = DispatchTypes(0);
    pub const REQUEST: DispatchTypes = DispatchTypes(DispatchPhase::Request.bit());

    pub fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Union of `self` and `phase`.
    #[must_use]
    pub fn compose(self, phase: DispatchPhase) -> DispatchTypes {
        self.union(DispatchTypes(phase.bit()))
    }

    /// Union of two stored values. Unset is the identity.
    #[must_use]
    pub fn union(self, other: DispatchTypes) -> DispatchTypes {
        DispatchTypes(self.0 | other.0)
    }

    /// The effective set: unset becomes {REQUEST}.
    #[must_use]
    pub fn resolve(self) -> DispatchTypes {
        if self.is_unset() {
            Self::REQUEST
        } else {
            self
        }
    }

    /// Membership over the resolved set.
    pub fn contains(self, phase: DispatchPhase) -> bool {
        self.resolve().0 & phase.bit() != 0
    }

    /// Phases in the resolved set, in declaration order.
    pub fn phases(self) -> impl Iterator<Item = DispatchPhase> {
        let resolved = self.resolve();
        DispatchPhase::ALL
            .into_iter()
            .filter(move |p| resolved.0 & p.bit() != 0)
    }
}

impl From<DispatchPhase> for DispatchTypes {
    fn from(phase: DispatchPhase) -> Self {
        DispatchTypes::UNSET.compose(phase)
    }
}

impl FromIterator<DispatchPhase> for DispatchTypes {
    fn from_iter<I: IntoIterator<Item = DispatchPhase>>(iter: I) -> Self {
        iter.into_iter().fold(DispatchTypes::UNSET, DispatchTypes::compose)
    }
}

impl fmt::Display for DispatchTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return f.write_str("UNSET");
        }
        for (i, phase) in self.phases().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(phase.as_str())?;
        }
        Ok(())
    }
}
