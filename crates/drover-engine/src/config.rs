//! Engine configuration and validation.

use drover_collision::ResolverConfig;
use drover_core::MoveClass;
use std::fmt;

/// Tunables for [`MovementEngine`](crate::MovementEngine), validated at
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Collision relaxation passes per tick. Default: 2.
    pub resolver_passes: u32,
    /// Spatial-hash bucket size in world units. Must be at least twice
    /// the largest agent radius. Default: 2.0.
    pub hash_cell_size: f32,
    /// Nudge separating zero-distance collision pairs. Default: 1e-4.
    pub push_epsilon: f32,
    /// Overshoot past a cell boundary for escape corrections.
    /// Default: 1e-3.
    pub escape_overshoot: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolver_passes: 2,
            hash_cell_size: 2.0,
            push_epsilon: 1e-4,
            escape_overshoot: 1e-3,
        }
    }
}

impl EngineConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver_passes == 0 {
            return Err(ConfigError::ZeroResolverPasses);
        }
        if !self.hash_cell_size.is_finite() || self.hash_cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                value: self.hash_cell_size,
            });
        }
        if !self.push_epsilon.is_finite() || self.push_epsilon <= 0.0 {
            return Err(ConfigError::InvalidPushEpsilon {
                value: self.push_epsilon,
            });
        }
        if !self.escape_overshoot.is_finite() || self.escape_overshoot <= 0.0 {
            return Err(ConfigError::InvalidEscapeOvershoot {
                value: self.escape_overshoot,
            });
        }
        Ok(())
    }

    /// The collision-resolver view of this configuration.
    pub(crate) fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            passes: self.resolver_passes,
            hash_cell_size: self.hash_cell_size,
            push_epsilon: self.push_epsilon,
            escape_overshoot: self.escape_overshoot,
        }
    }
}

/// Errors detected while constructing a [`MovementEngine`](crate::MovementEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `resolver_passes` is zero — overlaps would never be corrected.
    ZeroResolverPasses,
    /// `hash_cell_size` is non-positive, NaN, or infinite.
    InvalidCellSize {
        /// The rejected value.
        value: f32,
    },
    /// `push_epsilon` is non-positive, NaN, or infinite.
    InvalidPushEpsilon {
        /// The rejected value.
        value: f32,
    },
    /// `escape_overshoot` is non-positive, NaN, or infinite.
    InvalidEscapeOvershoot {
        /// The rejected value.
        value: f32,
    },
    /// The three per-class obstacle maps do not share dimensions.
    MapDimensionMismatch {
        /// Dimensions of the ground map.
        expected: (u32, u32),
        /// Dimensions of the mismatching map.
        found: (u32, u32),
    },
    /// A map was supplied under the wrong movement-class slot.
    WrongMapClass {
        /// The slot the map was supplied for.
        expected: MoveClass,
        /// The class the map actually carries.
        found: MoveClass,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroResolverPasses => write!(f, "resolver_passes must be at least 1"),
            Self::InvalidCellSize { value } => {
                write!(f, "hash_cell_size must be finite and positive, got {value}")
            }
            Self::InvalidPushEpsilon { value } => {
                write!(f, "push_epsilon must be finite and positive, got {value}")
            }
            Self::InvalidEscapeOvershoot { value } => {
                write!(f, "escape_overshoot must be finite and positive, got {value}")
            }
            Self::MapDimensionMismatch { expected, found } => write!(
                f,
                "obstacle maps must share dimensions: {}x{} vs {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            Self::WrongMapClass { expected, found } => {
                write!(f, "expected a {expected} map, got a {found} map")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_passes_rejected() {
        let config = EngineConfig {
            resolver_passes: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroResolverPasses));
    }

    #[test]
    fn non_finite_cell_size_rejected() {
        for value in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = EngineConfig {
                hash_cell_size: value,
                ..EngineConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {value}");
        }
    }

    #[test]
    fn non_positive_epsilons_rejected() {
        let config = EngineConfig {
            push_epsilon: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
        let config = EngineConfig {
            escape_overshoot: -1e-3,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn positive_finite_configs_validate(
                passes in 1u32..8,
                cell in 0.5f32..8.0,
                eps in 1e-6f32..1e-2,
                overshoot in 1e-6f32..1e-2,
            ) {
                let config = EngineConfig {
                    resolver_passes: passes,
                    hash_cell_size: cell,
                    push_epsilon: eps,
                    escape_overshoot: overshoot,
                };
                prop_assert!(config.validate().is_ok());
            }
        }
    }
}
