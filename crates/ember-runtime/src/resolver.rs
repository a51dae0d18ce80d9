//! Bounded operator whitelist.
//!
//! [`OpResolver`] records which [`OpKind`]s a model may use. Its
//! capacity is fixed at construction so an application registers
//! exactly the operators its model uses, and registering one more than
//! planned is an error instead of a silent allocation.

use std::error::Error;
use std::fmt;

use ember_core::OpKind;
use indexmap::IndexSet;

/// Errors from registering an operator kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverError {
    /// Every slot is already in use.
    Full {
        /// Number of slots the resolver was built with.
        capacity: usize,
        /// The kind that could not be registered.
        kind: OpKind,
    },
    /// The kind is already registered.
    Duplicate {
        /// The kind registered twice.
        kind: OpKind,
    },
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity, kind } => {
                write!(f, "cannot register {kind}: all {capacity} operator slots in use")
            }
            Self::Duplicate { kind } => write!(f, "{kind} is already registered"),
        }
    }
}

impl Error for ResolverError {}

/// Operator kinds the interpreter will accept, in registration order.
#[derive(Clone, Debug)]
pub struct OpResolver {
    capacity: usize,
    kinds: IndexSet<OpKind>,
}

impl OpResolver {
    /// Create a resolver with room for `capacity` operator kinds.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            kinds: IndexSet::with_capacity(capacity),
        }
    }

    /// Register `kind`.
    ///
    /// # Errors
    ///
    /// [`ResolverError::Duplicate`] if the kind is already present,
    /// [`ResolverError::Full`] if no slot is left.
    pub fn add(&mut self, kind: OpKind) -> Result<(), ResolverError> {
        if self.kinds.contains(&kind) {
            return Err(ResolverError::Duplicate { kind });
        }
        if self.kinds.len() >= self.capacity {
            return Err(ResolverError::Full {
                capacity: self.capacity,
                kind,
            });
        }
        self.kinds.insert(kind);
        Ok(())
    }

    /// Register the dense layer.
    pub fn add_fully_connected(&mut self) -> Result<(), ResolverError> {
        self.add(OpKind::FullyConnected)
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: OpKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Registered kinds, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_within_capacity() {
        let mut r = OpResolver::with_capacity(2);
        r.add_fully_connected().unwrap();
        r.add(OpKind::Relu).unwrap();
        assert_eq!(r.len(), 2);
        assert!(r.contains(OpKind::FullyConnected));
        assert!(!r.contains(OpKind::MatMul));
        assert_eq!(
            r.kinds().collect::<Vec<_>>(),
            vec![OpKind::FullyConnected, OpKind::Relu]
        );
    }

    #[test]
    fn zero_capacity_rejects_registration() {
        let mut r = OpResolver::with_capacity(0);
        assert_eq!(
            r.add_fully_connected().unwrap_err(),
            ResolverError::Full {
                capacity: 0,
                kind: OpKind::FullyConnected
            }
        );
        assert!(r.is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut r = OpResolver::with_capacity(4);
        r.add_fully_connected().unwrap();
        assert_eq!(
            r.add_fully_connected().unwrap_err(),
            ResolverError::Duplicate {
                kind: OpKind::FullyConnected
            }
        );
        assert_eq!(r.len(), 1);
    }
}
