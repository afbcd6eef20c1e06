//! Shared test fixture: a small consistent pipeline run.

use crate::AuditInput;
use cs_core::config::AuditConfig;
use cs_core::{
    build_institution_dim, BaseInstitutionId, EnrollmentRecord, EnrollmentTable, Fact,
    Geography, InstitutionDim, InstitutionId, OffenseFamily, OffenseName, RawInstitution,
    RawInstitutionTable, ReferenceData, SchoolYearOffense, YearRange,
};
use cs_engine::{EngineInput, RankingOptions, RankingTables};

pub(crate) fn fact(unitid: i32, offense: &str, geo: Geography, count: i64) -> Fact {
    Fact {
        year: 2022,
        unitid: InstitutionId::new(unitid),
        offense: OffenseName::new(offense),
        offense_family: OffenseFamily::Criminal,
        geography: geo,
        count,
    }
}

fn enrollment(base: i32, fte: i32) -> EnrollmentRecord {
    EnrollmentRecord {
        unitid: BaseInstitutionId::new(base),
        year: 2022,
        fte,
        enrollment_total: fte,
        enrollment_ft: fte,
        enrollment_pt: 0,
    }
}

pub(crate) struct Fixture {
    pub facts: Vec<Fact>,
    pub enrollment: EnrollmentTable,
    pub institutions: Vec<InstitutionDim>,
    pub summary: Vec<SchoolYearOffense>,
    pub rankings: RankingTables,
    pub reference: ReferenceData,
    pub config: AuditConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let reference = ReferenceData::standard();
        let facts = vec![
            fact(166027001, "Burglary", Geography::OnCampus, 3),
            fact(166027001, "Burglary", Geography::NonCampus, 1),
            fact(166027001, "Burglary", Geography::ResidenceHalls, 2),
            fact(166027001, "Robbery", Geography::PublicProperty, 2),
            fact(130794001, "Burglary", Geography::OnCampus, 5),
            fact(100654001, "Burglary", Geography::OnCampus, 4),
        ];
        let enrollment =
            EnrollmentTable::from_records([enrollment(166027, 20000), enrollment(100654, 5000)])
                .unwrap();
        let mut raw = RawInstitutionTable::new();
        raw.insert(RawInstitution {
            unitid: InstitutionId::new(100654001),
            name: Some("Alabama A & M University".to_string()),
            city: Some("Normal".to_string()),
            state: Some("AL".to_string()),
            zip: None,
            sector: None,
        });
        let institutions = build_institution_dim(&facts, &raw, &reference);
        let output = cs_engine::run(EngineInput {
            facts: &facts,
            enrollment: &enrollment,
            institutions: &institutions,
            reference: &reference,
            options: RankingOptions::default(),
        })
        .unwrap();

        Self {
            facts,
            enrollment,
            institutions,
            summary: output.summary,
            rankings: output.rankings,
            reference,
            config: AuditConfig::default(),
        }
    }

    pub fn input(&self) -> AuditInput<'_> {
        AuditInput {
            facts: &self.facts,
            enrollment: &self.enrollment,
            institutions: &self.institutions,
            summary: &self.summary,
            rankings: &self.rankings,
            reference: &self.reference,
            options: RankingOptions::default(),
            config: &self.config,
            data_years: YearRange::new(2015, 2023),
            process_all_schools: true,
            json_dir: None,
        }
    }
}
