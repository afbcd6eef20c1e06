//! Immutable reference data: the Ivy League enumeration, the state table and
//! offense lookups.
//!
//! Built once with [`ReferenceData::standard`] and passed by reference to
//! every stage that needs it.

use crate::domain::OffenseFamily;
use crate::ids::{BaseInstitutionId, InstitutionId};
use std::collections::BTreeMap;

/// Display order assigned to offenses missing from the order table.
pub const UNASSIGNED_ORDER: u16 = 999;

/// Definition set in force for every year the pipeline covers.
pub const DEFINITION_VERSION: &str = "post_2015";

/// First year whose counts are comparable under [`DEFINITION_VERSION`].
pub const COMPARABLE_FROM_YEAR: i16 = 2015;

/// One member of the Ivy League enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvyInstitution {
    /// Main-campus extended id.
    pub unitid: InstitutionId,
    pub name: &'static str,
    pub short_name: &'static str,
    pub city: &'static str,
    pub state: &'static str,
}

const IVY_LEAGUE: [(i32, &str, &str, &str, &str); 8] = [
    (217156001, "Brown University", "Brown", "Providence", "RI"),
    (166027001, "Harvard University", "Harvard", "Cambridge", "MA"),
    (
        190150001,
        "Columbia University in the City of New York",
        "Columbia",
        "New York",
        "NY",
    ),
    (190415001, "Cornell University", "Cornell", "Ithaca", "NY"),
    (182670001, "Dartmouth College", "Dartmouth", "Hanover", "NH"),
    (186131001, "Princeton University", "Princeton", "Princeton", "NJ"),
    (215062001, "University of Pennsylvania", "Penn", "Philadelphia", "PA"),
    (130794001, "Yale University", "Yale", "New Haven", "CT"),
];

const US_STATES: [(&str, &str); 53] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("VI", "Virgin Islands"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

const OFFENSES: [(&str, &str); 20] = [
    ("Murder", "The willful (non-negligent) killing of one human being by another"),
    ("Negligent Manslaughter", "The killing of another person through gross negligence"),
    (
        "Rape",
        "Penetration, no matter how slight, of the vagina or anus with any body part or object, or oral penetration by a sex organ of another person, without the consent of the victim",
    ),
    (
        "Fondling",
        "The touching of the private body parts of another person for the purpose of sexual gratification, without the consent of the victim",
    ),
    (
        "Incest",
        "Sexual intercourse between persons who are related to each other within the degrees wherein marriage is prohibited by law",
    ),
    ("Statutory Rape", "Sexual intercourse with a person who is under the statutory age of consent"),
    (
        "Robbery",
        "The taking or attempting to take anything of value from the care, custody, or control of a person or persons by force or threat of force",
    ),
    (
        "Aggravated Assault",
        "An unlawful attack by one person upon another for the purpose of inflicting severe or aggravated bodily injury",
    ),
    ("Burglary", "The unlawful entry of a structure to commit a felony or a theft"),
    ("Motor Vehicle Theft", "The theft or attempted theft of a motor vehicle"),
    (
        "Arson",
        "Any willful or malicious burning or attempt to burn a dwelling house, public building, motor vehicle, or personal property",
    ),
    (
        "Domestic Violence",
        "A felony or misdemeanor crime of violence committed by a current or former spouse or intimate partner",
    ),
    (
        "Dating Violence",
        "Violence committed by a person who is or has been in a social relationship of a romantic or intimate nature with the victim",
    ),
    (
        "Stalking",
        "Engaging in a course of conduct directed at a specific person that would cause a reasonable person to fear for their safety",
    ),
    (
        "Weapons Arrest",
        "Arrests for the violation of laws prohibiting the manufacture, sale, or possession of weapons",
    ),
    (
        "Drug Arrest",
        "Arrests for violations of laws prohibiting the production, distribution, and/or use of controlled substances",
    ),
    (
        "Liquor Arrest",
        "Arrests for the violation of state or local laws prohibiting the manufacture, sale, purchase, transportation, or possession of alcoholic beverages",
    ),
    ("Weapons Discipline", "Persons referred for disciplinary action for weapons law violations"),
    ("Drug Discipline", "Persons referred for disciplinary action for drug law violations"),
    ("Liquor Discipline", "Persons referred for disciplinary action for liquor law violations"),
];

/// Lookup tables shared by the dimension builder, engine and exporter.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    ivy: BTreeMap<InstitutionId, IvyInstitution>,
    states: BTreeMap<&'static str, &'static str>,
    offense_order: BTreeMap<&'static str, u16>,
    offense_descriptions: BTreeMap<&'static str, &'static str>,
}

impl ReferenceData {
    /// Reference tables for post-2015 Clery reporting.
    pub fn standard() -> Self {
        let ivy = IVY_LEAGUE
            .iter()
            .map(|&(id, name, short_name, city, state)| {
                let unitid = InstitutionId::new(id);
                (
                    unitid,
                    IvyInstitution {
                        unitid,
                        name,
                        short_name,
                        city,
                        state,
                    },
                )
            })
            .collect();

        let offense_order = OFFENSES
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (*name, i as u16))
            .collect();

        Self {
            ivy,
            states: US_STATES.iter().copied().collect(),
            offense_order,
            offense_descriptions: OFFENSES.iter().copied().collect(),
        }
    }

    /// Ivy institutions in main-campus id order.
    pub fn ivy_institutions(&self) -> impl Iterator<Item = &IvyInstitution> {
        self.ivy.values()
    }

    /// Exact match against the main-campus enumeration.
    pub fn ivy_by_unitid(&self, unitid: InstitutionId) -> Option<&IvyInstitution> {
        self.ivy.get(&unitid)
    }

    /// Ivy entry shared by every branch of the same base institution.
    pub fn ivy_by_base(&self, base: BaseInstitutionId) -> Option<&IvyInstitution> {
        self.ivy.get(&base.main_campus())
    }

    pub fn is_ivy_base(&self, base: BaseInstitutionId) -> bool {
        self.ivy_by_base(base).is_some()
    }

    /// Whether `code` names a state, DC or a territory the pipeline ranks.
    pub fn is_valid_state(&self, code: &str) -> bool {
        self.states.contains_key(code.to_ascii_uppercase().as_str())
    }

    /// Full state name, falling back to the code itself when unknown.
    pub fn state_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.states
            .get(code.to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(code)
    }

    /// Zero-based display position, or [`UNASSIGNED_ORDER`] for unknown offenses.
    pub fn offense_order(&self, offense: &str) -> u16 {
        self.offense_order
            .get(offense)
            .copied()
            .unwrap_or(UNASSIGNED_ORDER)
    }

    /// Description text, empty for unknown offenses.
    pub fn offense_description(&self, offense: &str) -> &'static str {
        self.offense_descriptions
            .get(offense)
            .copied()
            .unwrap_or("")
    }

    /// Heading used for an offense family in published documents.
    pub fn family_display(&self, family: OffenseFamily) -> &'static str {
        match family {
            OffenseFamily::Criminal => "Criminal Offenses",
            OffenseFamily::Vawa => "VAWA Offenses",
            OffenseFamily::Arrest => "Arrests",
            OffenseFamily::Disciplinary => "Disciplinary Actions",
        }
    }
}
