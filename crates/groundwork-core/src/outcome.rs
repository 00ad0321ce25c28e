//! The closed set of placement outcomes and their player-facing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of validating one placement request.
///
/// Everything except [`ValidationResult::Valid`] denies the placement.
/// [`ValidationResult::Invalid`] is the fail-closed outcome for malformed
/// input or a fault while reading the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationResult {
    Invalid,
    Valid,
    OutsideTownship,
    HousingPercentage,
    InsideHouse,
    InsideNeutralHouse,
    PartInsideHouse,
    PartOutsideHouse,
    Blocked,
    NoSurface,
    BlockedByMobile,
    AgainstHouse,
    NearNeutralHouse,
    NoClearance,
    NearTeleporter,
    DuplicateFloor,
    NoGround,
}

const BLOCKED_MESSAGE: &str = "That location is blocked.";

impl ValidationResult {
    /// Every outcome, in declaration order.
    pub const ALL: [ValidationResult; 17] = [
        ValidationResult::Invalid,
        ValidationResult::Valid,
        ValidationResult::OutsideTownship,
        ValidationResult::HousingPercentage,
        ValidationResult::InsideHouse,
        ValidationResult::InsideNeutralHouse,
        ValidationResult::PartInsideHouse,
        ValidationResult::PartOutsideHouse,
        ValidationResult::Blocked,
        ValidationResult::NoSurface,
        ValidationResult::BlockedByMobile,
        ValidationResult::AgainstHouse,
        ValidationResult::NearNeutralHouse,
        ValidationResult::NoClearance,
        ValidationResult::NearTeleporter,
        ValidationResult::DuplicateFloor,
        ValidationResult::NoGround,
    ];

    pub fn is_valid(self) -> bool {
        self == ValidationResult::Valid
    }

    /// Player-facing explanation. `None` only for `Valid`.
    pub fn message(self) -> Option<&'static str> {
        let text = match self {
            ValidationResult::Valid => return None,
            ValidationResult::Invalid | ValidationResult::Blocked => BLOCKED_MESSAGE,
            ValidationResult::OutsideTownship => {
                "You may only build within the bounds of your own township."
            }
            ValidationResult::HousingPercentage => {
                "Your guild must own every house in this township before you can build here."
            }
            ValidationResult::InsideHouse => "You cannot build that inside a house.",
            ValidationResult::InsideNeutralHouse => {
                "You cannot build inside a house that does not belong to your township."
            }
            ValidationResult::PartInsideHouse => "Part of that structure would lie inside a house.",
            ValidationResult::PartOutsideHouse => {
                "The whole structure must fit inside the house."
            }
            ValidationResult::NoSurface => "There is no surface to build that on.",
            ValidationResult::BlockedByMobile => "Someone is standing in the way.",
            ValidationResult::AgainstHouse => "You cannot build right up against a house.",
            ValidationResult::NearNeutralHouse => {
                "You cannot build that close to a house that does not belong to your township."
            }
            ValidationResult::NoClearance => {
                "There is not enough open space around that location."
            }
            ValidationResult::NearTeleporter => "You cannot build that close to a teleporter.",
            ValidationResult::DuplicateFloor => "There is already a floor there.",
            ValidationResult::NoGround => "That must be built at ground level.",
        };
        Some(text)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("valid"))
    }
}
