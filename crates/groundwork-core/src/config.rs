use serde::{Deserialize, Serialize};

/// Largest distance grid side the validator will allocate.
pub const DEFAULT_MAX_GRID_SIZE: usize = 22;

/// Fixed thresholds and limits used by the placement validator.
///
/// Missing fields fall back to their defaults when deserialized, so a data
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Cap on the distance grid side length.
    pub max_grid_size: usize,
    /// A structure this close (Chebyshev) to the footprint rejects with
    /// `AgainstHouse`.
    pub house_clearance: u16,
    /// A structure not owned by the territory this close rejects with
    /// `NearNeutralHouse`.
    pub neutral_house_clearance: u16,
    /// A teleporter this close rejects with `NearTeleporter`.
    pub teleporter_clearance: u16,
    /// Added to the anchor's z when the anchor sits on a structure staircase.
    pub staircase_z_offset: i32,
    /// Vertical extent of a standing mobile.
    pub mobile_height: i32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_grid_size: DEFAULT_MAX_GRID_SIZE,
            house_clearance: 1,
            neutral_house_clearance: 5,
            teleporter_clearance: 2,
            staircase_z_offset: 1,
            mobile_height: 16,
        }
    }
}

impl ValidatorConfig {
    /// Largest distance at which any structure rule applies.
    pub fn structure_clearance(&self) -> u16 {
        self.house_clearance.max(self.neutral_house_clearance)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        if self.house_clearance > self.neutral_house_clearance {
            return Err(ConfigError::ClearanceOrder {
                house: self.house_clearance,
                neutral: self.neutral_house_clearance,
            });
        }
        if self.mobile_height < 0 {
            return Err(ConfigError::NegativeMobileHeight(self.mobile_height));
        }
        Ok(())
    }
}

/// Inconsistent validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_grid_size must be at least 1")]
    ZeroGridSize,
    #[error("house_clearance ({house}) exceeds neutral_house_clearance ({neutral})")]
    ClearanceOrder { house: u16, neutral: u16 },
    #[error("mobile_height must not be negative, got {0}")]
    NegativeMobileHeight(i32),
}
