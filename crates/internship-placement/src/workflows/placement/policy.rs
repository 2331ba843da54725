use serde::{Deserialize, Serialize};

use super::domain::{InternshipLevel, StudentProfile};

/// Hard ceiling on an opportunity's total slots, regardless of configuration.
pub const SLOT_CAP: u8 = 10;

const DEFAULT_MAX_ACTIVE_APPLICATIONS: usize = 3;
const DEFAULT_MAX_SLOTS: u8 = SLOT_CAP;
const DEFAULT_MAX_OPPORTUNITIES_PER_REPRESENTATIVE: usize = 5;
const DEFAULT_SENIOR_YEAR: u8 = 3;

/// Numeric limits enforced by the placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// Non-withdrawn applications a student may hold at once.
    pub max_active_applications: usize,
    /// Upper bound on an opportunity's total slots; larger requests are clamped.
    /// Never effective above [`SLOT_CAP`].
    pub max_slots: u8,
    pub max_opportunities_per_representative: usize,
    /// First year of study allowed to apply for intermediate and advanced listings.
    pub senior_year: u8,
}

impl PlacementPolicy {
    /// Slot count requests are clamped to.
    pub fn slot_ceiling(&self) -> u8 {
        self.max_slots.min(SLOT_CAP)
    }

    pub fn is_level_eligible(&self, student: &StudentProfile, level: InternshipLevel) -> bool {
        !level.requires_senior_standing() || student.year_of_study >= self.senior_year
    }
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            max_active_applications: DEFAULT_MAX_ACTIVE_APPLICATIONS,
            max_slots: DEFAULT_MAX_SLOTS,
            max_opportunities_per_representative: DEFAULT_MAX_OPPORTUNITIES_PER_REPRESENTATIVE,
            senior_year: DEFAULT_SENIOR_YEAR,
        }
    }
}
