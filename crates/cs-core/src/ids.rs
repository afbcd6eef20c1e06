//! Institution identifiers.
//!
//! Clery files key institutions by an *extended* id (`base * 1000 + branch`)
//! while IPEDS enrollment files use the *base* id. Every join between the two
//! goes through [`base_id`]; nothing else in the workspace divides by 1000.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier separating the base id from the branch suffix.
pub const BRANCH_FACTOR: i32 = 1000;

/// Branch suffix carried by main campuses.
pub const MAIN_CAMPUS_SUFFIX: i32 = 1;

/// Recover the base institution id from an extended id (floor division).
pub fn base_id(extended: i32) -> i32 {
    extended.div_euclid(BRANCH_FACTOR)
}

/// Branch suffix of an extended id.
pub fn branch_suffix(extended: i32) -> i32 {
    extended.rem_euclid(BRANCH_FACTOR)
}

/// Extended institution id as reported in Clery disclosures (e.g. `166027001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(i32);

impl InstitutionId {
    pub fn new(extended: i32) -> Self {
        Self(extended)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Base id used to join against enrollment data.
    pub fn base(self) -> BaseInstitutionId {
        BaseInstitutionId(base_id(self.0))
    }

    pub fn branch_suffix(self) -> i32 {
        branch_suffix(self.0)
    }

    pub fn is_main_campus(self) -> bool {
        self.branch_suffix() == MAIN_CAMPUS_SUFFIX
    }
}

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for InstitutionId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Base institution id as used by IPEDS (e.g. `166027`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseInstitutionId(i32);

impl BaseInstitutionId {
    pub fn new(base: i32) -> Self {
        Self(base)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Extended id of this institution's main campus.
    pub fn main_campus(self) -> InstitutionId {
        InstitutionId(self.0 * BRANCH_FACTOR + MAIN_CAMPUS_SUFFIX)
    }
}

impl fmt::Display for BaseInstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_id_floors() {
        assert_eq!(base_id(166027001), 166027);
        assert_eq!(base_id(166027999), 166027);
        assert_eq!(base_id(999), 0);
    }

    #[test]
    fn test_main_campus_detection() {
        assert!(InstitutionId::new(166027001).is_main_campus());
        assert!(!InstitutionId::new(166027002).is_main_campus());
        assert!(!InstitutionId::new(166027000).is_main_campus());
    }

    #[test]
    fn test_main_campus_round_trip() {
        let base = InstitutionId::new(217156004).base();
        assert_eq!(base.get(), 217156);
        assert_eq!(base.main_campus().get(), 217156001);
    }
}
