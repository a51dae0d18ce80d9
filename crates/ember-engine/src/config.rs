//! Driver configuration, validation, and error types.
//!
//! [`DriverConfig`] is the builder-input for an
//! [`InferenceDriver`](crate::InferenceDriver). Defaults reproduce the
//! device build: a 500-byte arena, a single operator slot, and one
//! cycle per second.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Arena capacity of the device build, in bytes.
pub const DEFAULT_ARENA_BYTES: usize = 500;

/// Largest accepted arena capacity.
pub const MAX_ARENA_BYTES: usize = 64 * 1024 * 1024;

/// Spacing between cycles on the device build.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Longest accepted cycle interval.
pub const MAX_CYCLE_INTERVAL: Duration = Duration::from_secs(3600);

// ── SchemaPolicy ───────────────────────────────────────────────────

/// What setup does when the model's schema version differs from
/// [`SCHEMA_VERSION`](ember_core::SCHEMA_VERSION).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Report the mismatch on the sink and continue setup.
    #[default]
    Warn,
    /// Fail setup with [`SetupError::SchemaMismatch`](crate::SetupError::SchemaMismatch).
    Reject,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`DriverConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `arena_bytes` is zero.
    ArenaEmpty,
    /// `arena_bytes` exceeds [`MAX_ARENA_BYTES`].
    ArenaTooLarge {
        /// The configured capacity.
        bytes: usize,
    },
    /// `cycle_interval` exceeds [`MAX_CYCLE_INTERVAL`].
    IntervalTooLong {
        /// The configured interval.
        interval: Duration,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArenaEmpty => write!(f, "arena_bytes must be at least 1"),
            Self::ArenaTooLarge { bytes } => {
                write!(f, "arena_bytes {bytes} exceeds maximum of {MAX_ARENA_BYTES}")
            }
            Self::IntervalTooLong { interval } => write!(
                f,
                "cycle_interval {interval:?} exceeds maximum of {MAX_CYCLE_INTERVAL:?}"
            ),
        }
    }
}

impl Error for ConfigError {}

// ── DriverConfig ───────────────────────────────────────────────────

/// Configuration for an [`InferenceDriver`](crate::InferenceDriver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Tensor arena capacity in bytes. Fixed for the driver's lifetime.
    pub arena_bytes: usize,
    /// Operator slots in the resolver. The driver registers one operator kind,
    /// so anything below 1 makes setup fail.
    pub op_slots: usize,
    /// Pause after every executed cycle.
    pub cycle_interval: Duration,
    /// Handling of schema version mismatches.
    pub schema_policy: SchemaPolicy,
    /// Seed for the random source built by
    /// [`InferenceDriver::seeded`](crate::InferenceDriver::seeded).
    pub seed: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            arena_bytes: DEFAULT_ARENA_BYTES,
            op_slots: 1,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            schema_policy: SchemaPolicy::Warn,
            seed: 0,
        }
    }
}

impl DriverConfig {
    /// Check structural invariants.
    ///
    /// Does not check that the arena is large enough for any particular
    /// model; that is only known once tensors are allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_bytes == 0 {
            return Err(ConfigError::ArenaEmpty);
        }
        if self.arena_bytes > MAX_ARENA_BYTES {
            return Err(ConfigError::ArenaTooLarge {
                bytes: self.arena_bytes,
            });
        }
        if self.cycle_interval > MAX_CYCLE_INTERVAL {
            return Err(ConfigError::IntervalTooLong {
                interval: self.cycle_interval,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_build() {
        let c = DriverConfig::default();
        assert_eq!(c.arena_bytes, 500);
        assert_eq!(c.op_slots, 1);
        assert_eq!(c.cycle_interval, Duration::from_secs(1));
        assert_eq!(c.schema_policy, SchemaPolicy::Warn);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_arena_rejected() {
        let c = DriverConfig {
            arena_bytes: 0,
            ..DriverConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ArenaEmpty));
    }

    #[test]
    fn oversized_arena_rejected() {
        let c = DriverConfig {
            arena_bytes: usize::MAX,
            ..DriverConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ArenaTooLarge { bytes: usize::MAX })
        );

        let at_limit = DriverConfig {
            arena_bytes: MAX_ARENA_BYTES,
            ..DriverConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_valid() {
        let c = DriverConfig {
            cycle_interval: Duration::ZERO,
            ..DriverConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn overlong_interval_rejected() {
        let c = DriverConfig {
            cycle_interval: Duration::from_secs(3601),
            ..DriverConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::IntervalTooLong { .. })
        ));
    }

    #[test]
    fn zero_op_slots_pass_validation() {
        // Registration, not validation, reports a resolver without room.
        let c = DriverConfig {
            op_slots: 0,
            ..DriverConfig::default()
        };
        assert!(c.validate().is_ok());
    }
}
