//! Typed access to every staged table.
//!
//! Each table is described by a [`TableSpec`]; writers flatten domain rows
//! into cells in column order and readers decode them back. Reading a table
//! that has not been produced yet yields [`DbError::MissingStage`] naming the
//! subcommand that writes it.

use crate::error::{DbError, DbResult};
use crate::traits::{Column, Database, TableSpec};
use cs_core::{
    BaseInstitutionId, Cell, EnrollmentRecord, EnrollmentTable, Fact, Geography, InstitutionDim,
    InstitutionId, OffenseDim, OffenseFamily, OffenseKey, OffenseName, RankingEntry,
    RawInstitution, RawInstitutionTable, SchoolYearOffense, ScopeKey, ScopeKind, StateCode,
    TabularRecord,
};

macro_rules! columns {
    ($($name:literal : $ty:literal),+ $(,)?) => {
        &[$(Column { name: $name, sql_type: $ty }),+]
    };
}

pub const FACTS: TableSpec = TableSpec {
    name: "facts",
    columns: columns!(
        "year": "SMALLINT",
        "unitid": "INTEGER",
        "offense": "VARCHAR",
        "offense_family": "VARCHAR",
        "geo": "VARCHAR",
        "count": "BIGINT",
    ),
    order_by: "year, unitid, offense, offense_family, geo",
    produced_by: "transform",
};

pub const RAW_INSTITUTIONS: TableSpec = TableSpec {
    name: "raw_institutions",
    columns: columns!(
        "unitid": "INTEGER",
        "name": "VARCHAR",
        "city": "VARCHAR",
        "state": "VARCHAR",
        "zip": "VARCHAR",
        "sector": "VARCHAR",
    ),
    order_by: "unitid",
    produced_by: "transform",
};

pub const DIM_ENROLLMENT: TableSpec = TableSpec {
    name: "dim_enrollment",
    columns: columns!(
        "unitid": "INTEGER",
        "year": "SMALLINT",
        "fte": "INTEGER",
        "enrollment_total": "INTEGER",
        "enrollment_ft": "INTEGER",
        "enrollment_pt": "INTEGER",
    ),
    order_by: "unitid, year",
    produced_by: "enrollment",
};

pub const DIM_INSTITUTION: TableSpec = TableSpec {
    name: "dim_institution",
    columns: columns!(
        "unitid": "INTEGER",
        "base_unitid": "INTEGER",
        "name": "VARCHAR",
        "short_name": "VARCHAR",
        "city": "VARCHAR",
        "state": "VARCHAR",
        "state_name": "VARCHAR",
        "sector": "VARCHAR",
        "is_ivy": "BOOLEAN",
        "is_main_campus": "BOOLEAN",
    ),
    order_by: "unitid",
    produced_by: "dimensions",
};

pub const DIM_OFFENSE: TableSpec = TableSpec {
    name: "dim_offense",
    columns: columns!(
        "offense": "VARCHAR",
        "offense_code": "VARCHAR",
        "offense_family": "VARCHAR",
        "family_display": "VARCHAR",
        "description": "VARCHAR",
        "display_order": "SMALLINT",
        "definition_version": "VARCHAR",
        "comparable_from_year": "SMALLINT",
    ),
    order_by: "display_order, offense",
    produced_by: "dimensions",
};

pub const AGG_SCHOOL_YEAR_OFFENSE: TableSpec = TableSpec {
    name: "agg_school_year_offense",
    columns: columns!(
        "year": "SMALLINT",
        "unitid": "INTEGER",
        "offense": "VARCHAR",
        "offense_family": "VARCHAR",
        "geo": "VARCHAR",
        "count": "BIGINT",
        "institution_name": "VARCHAR",
        "fte": "INTEGER",
        "rate_per_10k": "DOUBLE",
    ),
    order_by: "year, unitid, offense, geo",
    produced_by: "aggregate",
};

const RANKING_COLUMNS: &[Column] = columns!(
    "scope": "VARCHAR",
    "year": "SMALLINT",
    "offense": "VARCHAR",
    "geo": "VARCHAR",
    "unitid": "INTEGER",
    "institution_name": "VARCHAR",
    "count": "BIGINT",
    "fte": "INTEGER",
    "rate_per_10k": "DOUBLE",
    "rank": "INTEGER",
    "rank_by_rate": "INTEGER",
    "pct_of_total": "DOUBLE",
);

const RANKING_ORDER: &str = "scope, year, offense, geo, rank, unitid";

pub const AGG_IVY_RANKINGS: TableSpec = TableSpec {
    name: "agg_ivy_rankings",
    columns: RANKING_COLUMNS,
    order_by: RANKING_ORDER,
    produced_by: "aggregate",
};

pub const AGG_STATE_RANKINGS: TableSpec = TableSpec {
    name: "agg_state_rankings",
    columns: RANKING_COLUMNS,
    order_by: RANKING_ORDER,
    produced_by: "aggregate",
};

pub const AGG_NATIONAL_RANKINGS: TableSpec = TableSpec {
    name: "agg_national_rankings",
    columns: RANKING_COLUMNS,
    order_by: RANKING_ORDER,
    produced_by: "aggregate",
};

/// One row describing how the staged aggregates were produced.
pub const AGG_RUN_METADATA: TableSpec = TableSpec {
    name: "agg_run_metadata",
    columns: columns!(
        "process_all_schools": "BOOLEAN",
        "institution_count": "INTEGER",
        "fact_count": "BIGINT",
    ),
    order_by: "process_all_schools",
    produced_by: "aggregate",
};

/// Every staged table, in pipeline order.
pub const ALL_TABLES: [&TableSpec; 10] = [
    &FACTS,
    &RAW_INSTITUTIONS,
    &DIM_ENROLLMENT,
    &DIM_INSTITUTION,
    &DIM_OFFENSE,
    &AGG_SCHOOL_YEAR_OFFENSE,
    &AGG_IVY_RANKINGS,
    &AGG_STATE_RANKINGS,
    &AGG_NATIONAL_RANKINGS,
    &AGG_RUN_METADATA,
];

pub fn ranking_table(kind: ScopeKind) -> &'static TableSpec {
    match kind {
        ScopeKind::Ivy => &AGG_IVY_RANKINGS,
        ScopeKind::State => &AGG_STATE_RANKINGS,
        ScopeKind::National => &AGG_NATIONAL_RANKINGS,
    }
}

/// Read every row of `spec`, failing with `MissingStage` when the table is absent.
pub async fn read_table(db: &dyn Database, spec: &TableSpec) -> DbResult<Vec<TabularRecord>> {
    if !db.relation_exists(spec.name).await? {
        return Err(DbError::MissingStage {
            table: spec.name.to_string(),
            hint: spec.produced_by.to_string(),
        });
    }
    db.query_records(&format!(
        "SELECT * FROM {} ORDER BY {}",
        spec.name, spec.order_by
    ))
    .await
}

/// Typed column access for one stored row.
struct RowReader<'a> {
    table: &'static str,
    record: &'a TabularRecord,
}

impl<'a> RowReader<'a> {
    fn new(spec: &TableSpec, record: &'a TabularRecord) -> Self {
        Self {
            table: spec.name,
            record,
        }
    }

    fn invalid(&self, column: &str, what: &str) -> DbError {
        DbError::InvalidRow {
            table: self.table.to_string(),
            message: format!("column '{}' {}", column, what),
        }
    }

    fn cell(&self, column: &str) -> Option<&Cell> {
        self.record.get(column).filter(|c| !c.is_null())
    }

    fn opt_i64(&self, column: &str) -> DbResult<Option<i64>> {
        self.cell(column)
            .map(|c| c.as_i64().ok_or_else(|| self.invalid(column, "is not an integer")))
            .transpose()
    }

    fn i64(&self, column: &str) -> DbResult<i64> {
        self.opt_i64(column)?
            .ok_or_else(|| self.invalid(column, "is null"))
    }

    fn opt_i32(&self, column: &str) -> DbResult<Option<i32>> {
        self.opt_i64(column)?
            .map(|v| i32::try_from(v).map_err(|_| self.invalid(column, "overflows INTEGER")))
            .transpose()
    }

    fn i32(&self, column: &str) -> DbResult<i32> {
        self.opt_i32(column)?
            .ok_or_else(|| self.invalid(column, "is null"))
    }

    fn i16(&self, column: &str) -> DbResult<i16> {
        i16::try_from(self.i64(column)?).map_err(|_| self.invalid(column, "overflows SMALLINT"))
    }

    fn opt_u32(&self, column: &str) -> DbResult<Option<u32>> {
        self.opt_i64(column)?
            .map(|v| u32::try_from(v).map_err(|_| self.invalid(column, "is negative")))
            .transpose()
    }

    fn opt_f64(&self, column: &str) -> DbResult<Option<f64>> {
        self.cell(column)
            .map(|c| c.as_f64().ok_or_else(|| self.invalid(column, "is not a number")))
            .transpose()
    }

    fn f64(&self, column: &str) -> DbResult<f64> {
        self.opt_f64(column)?
            .ok_or_else(|| self.invalid(column, "is null"))
    }

    /// Stored text as written; values are already normalized before staging.
    fn opt_text(&self, column: &str) -> Option<String> {
        self.cell(column).and_then(Cell::as_stored_text)
    }

    fn text(&self, column: &str) -> DbResult<String> {
        self.opt_text(column)
            .ok_or_else(|| self.invalid(column, "is null"))
    }

    fn bool(&self, column: &str) -> DbResult<bool> {
        self.cell(column)
            .and_then(Cell::as_bool)
            .ok_or_else(|| self.invalid(column, "is not a boolean"))
    }

    fn offense(&self, column: &str) -> DbResult<OffenseName> {
        let text = self.text(column)?;
        OffenseName::try_new(&text).ok_or_else(|| self.invalid(column, "is empty"))
    }

    fn family(&self, column: &str) -> DbResult<OffenseFamily> {
        Ok(self.text(column)?.parse()?)
    }

    fn geography(&self, column: &str) -> DbResult<Geography> {
        Ok(self.text(column)?.parse()?)
    }

    fn unitid(&self, column: &str) -> DbResult<InstitutionId> {
        Ok(InstitutionId::new(self.i32(column)?))
    }
}

fn opt<T: Into<Cell>>(value: Option<T>) -> Cell {
    Cell::from(value)
}

// facts

pub async fn write_facts(db: &dyn Database, facts: &[Fact]) -> DbResult<usize> {
    let rows = facts
        .iter()
        .map(|f| {
            vec![
                Cell::from(f.year),
                Cell::from(f.unitid.get()),
                Cell::from(f.offense.as_str()),
                Cell::from(f.offense_family.as_str()),
                Cell::from(f.geography.as_str()),
                Cell::from(f.count),
            ]
        })
        .collect();
    db.replace_table(&FACTS, rows).await
}

pub async fn read_facts(db: &dyn Database) -> DbResult<Vec<Fact>> {
    read_table(db, &FACTS)
        .await?
        .iter()
        .map(|record| -> DbResult<Fact> {
            let r = RowReader::new(&FACTS, record);
            Ok(Fact {
                year: r.i16("year")?,
                unitid: r.unitid("unitid")?,
                offense: r.offense("offense")?,
                offense_family: r.family("offense_family")?,
                geography: r.geography("geo")?,
                count: r.i64("count")?,
            })
        })
        .collect()
}

// raw_institutions

pub async fn write_raw_institutions(
    db: &dyn Database,
    table: &RawInstitutionTable,
) -> DbResult<usize> {
    let rows = table
        .rows()
        .map(|r| {
            vec![
                Cell::from(r.unitid.get()),
                opt(r.name.clone()),
                opt(r.city.clone()),
                opt(r.state.clone()),
                opt(r.zip.clone()),
                opt(r.sector.clone()),
            ]
        })
        .collect();
    db.replace_table(&RAW_INSTITUTIONS, rows).await
}

pub async fn read_raw_institutions(db: &dyn Database) -> DbResult<RawInstitutionTable> {
    let mut table = RawInstitutionTable::new();
    for record in read_table(db, &RAW_INSTITUTIONS).await? {
        let r = RowReader::new(&RAW_INSTITUTIONS, &record);
        table.insert(RawInstitution {
            unitid: r.unitid("unitid")?,
            name: r.opt_text("name"),
            city: r.opt_text("city"),
            state: r.opt_text("state"),
            zip: r.opt_text("zip"),
            sector: r.opt_text("sector"),
        });
    }
    Ok(table)
}

// dim_enrollment

pub async fn write_enrollment(db: &dyn Database, table: &EnrollmentTable) -> DbResult<usize> {
    let rows = table
        .records()
        .map(|e| {
            vec![
                Cell::from(e.unitid.get()),
                Cell::from(e.year),
                Cell::from(e.fte),
                Cell::from(e.enrollment_total),
                Cell::from(e.enrollment_ft),
                Cell::from(e.enrollment_pt),
            ]
        })
        .collect();
    db.replace_table(&DIM_ENROLLMENT, rows).await
}

pub async fn read_enrollment(db: &dyn Database) -> DbResult<EnrollmentTable> {
    let records = read_table(db, &DIM_ENROLLMENT)
        .await?
        .iter()
        .map(|record| -> DbResult<EnrollmentRecord> {
            let r = RowReader::new(&DIM_ENROLLMENT, record);
            Ok(EnrollmentRecord {
                unitid: BaseInstitutionId::new(r.i32("unitid")?),
                year: r.i16("year")?,
                fte: r.i32("fte")?,
                enrollment_total: r.i32("enrollment_total")?,
                enrollment_ft: r.i32("enrollment_ft")?,
                enrollment_pt: r.i32("enrollment_pt")?,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;
    Ok(EnrollmentTable::from_records(records)?)
}

// dim_institution

pub async fn write_institution_dim(db: &dyn Database, dims: &[InstitutionDim]) -> DbResult<usize> {
    let rows = dims
        .iter()
        .map(|d| {
            vec![
                Cell::from(d.unitid.get()),
                Cell::from(d.base_unitid.get()),
                opt(d.name.clone()),
                opt(d.short_name.clone()),
                opt(d.city.clone()),
                opt(d.state.as_ref().map(|s| s.as_str().to_string())),
                opt(d.state_name.clone()),
                opt(d.sector.clone()),
                Cell::from(d.is_ivy),
                Cell::from(d.is_main_campus),
            ]
        })
        .collect();
    db.replace_table(&DIM_INSTITUTION, rows).await
}

pub async fn read_institution_dim(db: &dyn Database) -> DbResult<Vec<InstitutionDim>> {
    read_table(db, &DIM_INSTITUTION)
        .await?
        .iter()
        .map(|record| -> DbResult<InstitutionDim> {
            let r = RowReader::new(&DIM_INSTITUTION, record);
            Ok(InstitutionDim {
                unitid: r.unitid("unitid")?,
                base_unitid: BaseInstitutionId::new(r.i32("base_unitid")?),
                name: r.opt_text("name"),
                short_name: r.opt_text("short_name"),
                city: r.opt_text("city"),
                state: r.opt_text("state").and_then(StateCode::try_new),
                state_name: r.opt_text("state_name"),
                sector: r.opt_text("sector"),
                is_ivy: r.bool("is_ivy")?,
                is_main_campus: r.bool("is_main_campus")?,
            })
        })
        .collect()
}

// dim_offense

pub async fn write_offense_dim(db: &dyn Database, dims: &[OffenseDim]) -> DbResult<usize> {
    let rows = dims
        .iter()
        .map(|d| {
            vec![
                Cell::from(d.offense.as_str()),
                Cell::from(d.offense_code.as_str()),
                Cell::from(d.offense_family.as_str()),
                Cell::from(d.family_display.as_str()),
                Cell::from(d.description.as_str()),
                Cell::from(d.display_order),
                Cell::from(d.definition_version.as_str()),
                Cell::from(d.comparable_from_year),
            ]
        })
        .collect();
    db.replace_table(&DIM_OFFENSE, rows).await
}

pub async fn read_offense_dim(db: &dyn Database) -> DbResult<Vec<OffenseDim>> {
    read_table(db, &DIM_OFFENSE)
        .await?
        .iter()
        .map(|record| -> DbResult<OffenseDim> {
            let r = RowReader::new(&DIM_OFFENSE, record);
            let display_order = u16::try_from(r.i64("display_order")?)
                .map_err(|_| r.invalid("display_order", "is out of range"))?;
            Ok(OffenseDim {
                offense: r.offense("offense")?,
                offense_code: r.text("offense_code")?,
                offense_family: r.family("offense_family")?,
                family_display: r.text("family_display")?,
                description: r.opt_text("description").unwrap_or_default(),
                display_order,
                definition_version: r.text("definition_version")?,
                comparable_from_year: r.i16("comparable_from_year")?,
            })
        })
        .collect()
}

// agg_school_year_offense

pub async fn write_school_year_offense(
    db: &dyn Database,
    rows: &[SchoolYearOffense],
) -> DbResult<usize> {
    let cells = rows
        .iter()
        .map(|s| {
            vec![
                Cell::from(s.year),
                Cell::from(s.unitid.get()),
                Cell::from(s.offense.as_str()),
                Cell::from(s.offense_family.as_str()),
                Cell::from(s.geography.as_str()),
                Cell::from(s.count),
                opt(s.institution_name.clone()),
                opt(s.fte),
                opt(s.rate_per_10k),
            ]
        })
        .collect();
    db.replace_table(&AGG_SCHOOL_YEAR_OFFENSE, cells).await
}

pub async fn read_school_year_offense(db: &dyn Database) -> DbResult<Vec<SchoolYearOffense>> {
    read_table(db, &AGG_SCHOOL_YEAR_OFFENSE)
        .await?
        .iter()
        .map(|record| -> DbResult<SchoolYearOffense> {
            let r = RowReader::new(&AGG_SCHOOL_YEAR_OFFENSE, record);
            Ok(SchoolYearOffense {
                year: r.i16("year")?,
                unitid: r.unitid("unitid")?,
                offense: r.offense("offense")?,
                offense_family: r.family("offense_family")?,
                geography: r.geography("geo")?,
                count: r.i64("count")?,
                institution_name: r.opt_text("institution_name"),
                fte: r.opt_i32("fte")?,
                rate_per_10k: r.opt_f64("rate_per_10k")?,
            })
        })
        .collect()
}

// agg_*_rankings

pub async fn write_rankings(
    db: &dyn Database,
    kind: ScopeKind,
    entries: &[RankingEntry],
) -> DbResult<usize> {
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                Cell::from(e.scope.preset_id()),
                Cell::from(e.year),
                Cell::from(e.offense.as_stored()),
                Cell::from(e.geography.as_str()),
                Cell::from(e.unitid.get()),
                opt(e.institution_name.clone()),
                Cell::from(e.count),
                opt(e.fte),
                opt(e.rate_per_10k),
                Cell::from(e.rank),
                opt(e.rank_by_rate),
                Cell::from(e.pct_of_total),
            ]
        })
        .collect();
    db.replace_table(ranking_table(kind), rows).await
}

pub async fn read_rankings(db: &dyn Database, kind: ScopeKind) -> DbResult<Vec<RankingEntry>> {
    let spec = ranking_table(kind);
    read_table(db, spec)
        .await?
        .iter()
        .map(|record| -> DbResult<RankingEntry> {
            let r = RowReader::new(spec, record);
            let rank = r
                .opt_u32("rank")?
                .ok_or_else(|| r.invalid("rank", "is null"))?;
            Ok(RankingEntry {
                scope: ScopeKey::from_preset_id(&r.text("scope")?)?,
                year: r.i16("year")?,
                offense: OffenseKey::from_stored(&r.text("offense")?)?,
                geography: r.geography("geo")?,
                unitid: r.unitid("unitid")?,
                institution_name: r.opt_text("institution_name"),
                count: r.i64("count")?,
                fte: r.opt_i32("fte")?,
                rate_per_10k: r.opt_f64("rate_per_10k")?,
                rank,
                rank_by_rate: r.opt_u32("rank_by_rate")?,
                pct_of_total: r.f64("pct_of_total")?,
            })
        })
        .collect()
}

// agg_run_metadata

/// Settings the staged aggregates were built with. Downstream stages follow
/// these rather than the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMetadata {
    pub process_all_schools: bool,
    pub institution_count: usize,
    pub fact_count: usize,
}

pub async fn write_run_metadata(db: &dyn Database, metadata: &RunMetadata) -> DbResult<usize> {
    let row = vec![
        Cell::from(metadata.process_all_schools),
        Cell::from(metadata.institution_count as i64),
        Cell::from(metadata.fact_count as i64),
    ];
    db.replace_table(&AGG_RUN_METADATA, vec![row]).await
}

pub async fn read_run_metadata(db: &dyn Database) -> DbResult<RunMetadata> {
    let records = read_table(db, &AGG_RUN_METADATA).await?;
    let [record] = records.as_slice() else {
        return Err(DbError::InvalidRow {
            table: AGG_RUN_METADATA.name.to_string(),
            message: format!("expected exactly one row, found {}", records.len()),
        });
    };
    let r = RowReader::new(&AGG_RUN_METADATA, record);
    let count = |column: &str| -> DbResult<usize> {
        usize::try_from(r.i64(column)?).map_err(|_| r.invalid(column, "is negative"))
    };
    Ok(RunMetadata {
        process_all_schools: r.bool("process_all_schools")?,
        institution_count: count("institution_count")?,
        fact_count: count("fact_count")?,
    })
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
