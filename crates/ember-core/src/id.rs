//! Strongly-typed identifiers.

use std::fmt;

/// Monotonically increasing inference cycle counter.
///
/// Incremented once per executed cycle, whether the cycle reported a
/// result or its invoke failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

impl CycleId {
    /// The cycle that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_id_advances_by_one() {
        assert_eq!(CycleId(0).next(), CycleId(1));
        assert_eq!(CycleId(41).next().next(), CycleId(43));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_preserves_order(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
                prop_assert_eq!(CycleId(a) < CycleId(b), CycleId(a).next() < CycleId(b).next());
            }
        }
    }
}
