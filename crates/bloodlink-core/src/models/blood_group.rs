//! ABO/Rh blood group.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BloodlinkError;

/// ABO antigen set carried by a blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abo {
    O,
    A,
    B,
    AB,
}

impl Abo {
    fn has_a(self) -> bool {
        matches!(self, Abo::A | Abo::AB)
    }

    fn has_b(self) -> bool {
        matches!(self, Abo::B | Abo::AB)
    }

    /// `true` when every antigen of `self` is also present in `other`.
    pub fn is_subset_of(self, other: Abo) -> bool {
        (!self.has_a() || other.has_a()) && (!self.has_b() || other.has_b())
    }
}

/// The eight ABO/Rh blood groups. Stored and serialized as `"O-"`,
/// `"AB+"`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONeg,
        BloodGroup::OPos,
        BloodGroup::ANeg,
        BloodGroup::APos,
        BloodGroup::BNeg,
        BloodGroup::BPos,
        BloodGroup::AbNeg,
        BloodGroup::AbPos,
    ];

    pub fn abo(self) -> Abo {
        match self {
            BloodGroup::ONeg | BloodGroup::OPos => Abo::O,
            BloodGroup::ANeg | BloodGroup::APos => Abo::A,
            BloodGroup::BNeg | BloodGroup::BPos => Abo::B,
            BloodGroup::AbNeg | BloodGroup::AbPos => Abo::AB,
        }
    }

    pub fn rh_positive(self) -> bool {
        matches!(
            self,
            BloodGroup::OPos | BloodGroup::APos | BloodGroup::BPos | BloodGroup::AbPos
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BloodGroup::ONeg => "O-",
            BloodGroup::OPos => "O+",
            BloodGroup::ANeg => "A-",
            BloodGroup::APos => "A+",
            BloodGroup::BNeg => "B-",
            BloodGroup::BPos => "B+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::AbPos => "AB+",
        }
    }

    /// Identifier-safe form used as a record key (`o_neg`, `ab_pos`, ...).
    pub fn slug(self) -> &'static str {
        match self {
            BloodGroup::ONeg => "o_neg",
            BloodGroup::OPos => "o_pos",
            BloodGroup::ANeg => "a_neg",
            BloodGroup::APos => "a_pos",
            BloodGroup::BNeg => "b_neg",
            BloodGroup::BPos => "b_pos",
            BloodGroup::AbNeg => "ab_neg",
            BloodGroup::AbPos => "ab_pos",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = BloodlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| BloodlinkError::validation(format!("unknown blood group: {s}")))
    }
}
