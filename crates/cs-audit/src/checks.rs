//! The individual audit checks.
//!
//! Every check recomputes its expectation from the input tables alone and
//! never mutates them. Checks record problems on a [`CheckResult`]; the
//! runner settles the status.

use crate::result::CheckResult;
use crate::AuditInput;
use cs_core::{
    checksum_of, FactKey, Geography, InstitutionId, OffenseName, PartitionKey, RankingEntry,
    SchoolYearOffense,
};
use cs_engine::{EngineInput, EngineOutput};
use cs_export::ProfileDocument;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const FACT_INTEGRITY: &str = "Fact Integrity";
pub const NO_DOUBLE_COUNT: &str = "No Double Count";
pub const RATE_ACCURACY: &str = "Rate Calculation Accuracy";
pub const RANK_ORDER: &str = "Ranking Order Validation";
pub const RANK_BY_RATE_SCOPE: &str = "Rank By Rate Scope";
pub const PERCENT_SUMS: &str = "Percentage Sum Validation";
pub const SCHOOL_COMPLETENESS: &str = "School Completeness";
pub const INCIDENT_TOTALS: &str = "Incident Total Accuracy";
pub const SOURCE_TRACEABILITY: &str = "Source Traceability";
pub const FTE_COVERAGE: &str = "FTE Coverage";
pub const ENGINE_IDEMPOTENCE: &str = "Engine Idempotence";

/// FTE coverage below this percentage is reported.
pub const MIN_FTE_COVERAGE_PCT: f64 = 90.0;

fn all_entries<'a>(input: &AuditInput<'a>) -> impl Iterator<Item = &'a RankingEntry> {
    let tables = input.rankings;
    tables
        .ivy
        .iter()
        .chain(tables.state.iter())
        .chain(tables.national.iter())
}

fn partitions<'a>(input: &AuditInput<'a>) -> BTreeMap<PartitionKey, Vec<&'a RankingEntry>> {
    let mut grouped: BTreeMap<PartitionKey, Vec<&RankingEntry>> = BTreeMap::new();
    for entry in all_entries(input) {
        grouped.entry(entry.partition_key()).or_default().push(entry);
    }
    grouped
}

fn describe(key: &PartitionKey) -> String {
    format!(
        "{}/{}/{}/{}",
        key.scope,
        key.year,
        key.offense,
        key.geography.as_str()
    )
}

/// Fact keys are unique and every stored count is positive.
pub fn fact_integrity(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(FACT_INTEGRITY);
    let mut seen: BTreeSet<FactKey> = BTreeSet::new();
    let mut duplicates = 0usize;
    let mut non_positive = 0usize;

    for fact in input.facts {
        let key = fact.key();
        if !seen.insert(key) {
            duplicates += 1;
            result.sample(format!(
                "duplicate key {} {} {} {}",
                fact.year,
                fact.unitid,
                fact.offense,
                fact.geography.as_str()
            ));
        }
        if fact.count <= 0 {
            non_positive += 1;
            result.sample(format!("{} {} {}: count {}", fact.year, fact.unitid, fact.offense, fact.count));
        }
    }

    result.detail("rows", input.facts.len());
    result.detail("duplicate_keys", duplicates);
    result.detail("non_positive_counts", non_positive);
    if input.facts.is_empty() {
        result.fail("Fact table is empty");
    }
    if duplicates > 0 {
        result.fail(format!("Found {} duplicate fact keys", duplicates));
    }
    if non_positive > 0 {
        result.fail(format!("Found {} facts with a count of zero or less", non_positive));
    }
    result
}

#[derive(Default)]
struct RollupGroup {
    rollup_sum: i64,
    has_rollup: bool,
    all: Option<i64>,
}

/// Every "All" row equals On-campus + Non-campus + Public property exactly,
/// and exists exactly when one of those geographies reported.
pub fn no_double_count(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(NO_DOUBLE_COUNT);
    let mut groups: BTreeMap<(i16, InstitutionId, &OffenseName), RollupGroup> = BTreeMap::new();

    for row in input.summary {
        let group = groups.entry((row.year, row.unitid, &row.offense)).or_default();
        if row.geography == Geography::All {
            group.all = Some(group.all.unwrap_or(0) + row.count);
        } else if row.geography.rolls_up() {
            group.rollup_sum += row.count;
            group.has_rollup = true;
        }
    }

    let mut violations = 0usize;
    for ((year, unitid, offense), group) in &groups {
        let ok = match (group.has_rollup, group.all) {
            (true, Some(all)) => all == group.rollup_sum,
            (false, None) => true,
            _ => false,
        };
        if !ok {
            violations += 1;
            result.sample(format!(
                "{} {} {}: All={:?}, rollup={}",
                year, unitid, offense, group.all, group.rollup_sum
            ));
        }
    }

    result.detail("groups_checked", groups.len());
    result.detail("violations", violations);
    if violations > 0 {
        result.fail(format!(
            "Found {} institution-year-offense groups whose All row differs from its rollup",
            violations
        ));
    }
    result
}

/// `None` when the stored rate matches; otherwise a description.
fn rate_problem(count: i64, fte: Option<i32>, rate: Option<f64>, tolerance: f64) -> Option<String> {
    match (fte.filter(|f| *f > 0), rate) {
        (Some(fte), Some(rate)) => {
            let expected = count as f64 / fte as f64 * 10_000.0;
            ((rate - expected).abs() > tolerance)
                .then(|| format!("stored {} expected {:.4}", rate, expected))
        }
        (Some(_), None) => Some("rate missing despite positive FTE".to_string()),
        (None, Some(rate)) => Some(format!("rate {} without a positive FTE", rate)),
        (None, None) => None,
    }
}

/// Stored rates match `count / fte * 10000` within the configured tolerance.
pub fn rate_accuracy(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(RATE_ACCURACY);
    let tolerance = input.config.rate_tolerance;
    let mut checked = 0usize;
    let mut errors = 0usize;

    for row in input.summary {
        checked += 1;
        if let Some(problem) = rate_problem(row.count, row.fte, row.rate_per_10k, tolerance) {
            errors += 1;
            result.sample(format!("summary {} {} {}: {}", row.year, row.unitid, row.offense, problem));
        }
    }
    for entry in all_entries(input) {
        checked += 1;
        if let Some(problem) = rate_problem(entry.count, entry.fte, entry.rate_per_10k, tolerance) {
            errors += 1;
            result.sample(format!("{} {}: {}", describe(&entry.partition_key()), entry.unitid, problem));
        }
    }

    result.detail("rows_checked", checked);
    result.detail("rate_errors", errors);
    result.detail("tolerance", tolerance);
    if errors > 0 {
        result.fail(format!("Found {} rate calculation errors", errors));
    }
    result
}

/// Order two entries of one partition should appear in: count descending,
/// then name ascending by bytes with unnamed institutions last, then id.
fn expected_order(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| match (&a.institution_name, &b.institution_name) {
            (Some(x), Some(y)) => x.as_bytes().cmp(y.as_bytes()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.unitid.cmp(&b.unitid))
}

/// Ranks run 1..n and follow count, then name, then id.
pub fn rank_order(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(RANK_ORDER);
    let grouped = partitions(input);
    let checked = grouped.len();
    let mut violations = 0usize;

    for (key, mut entries) in grouped {
        entries.sort_by_key(|e| e.rank);
        let contiguous = entries
            .iter()
            .enumerate()
            .all(|(i, e)| e.rank as usize == i + 1);
        if !contiguous {
            violations += 1;
            result.sample(format!("{}: ranks are not 1..{}", describe(&key), entries.len()));
        }
        for pair in entries.windows(2) {
            if expected_order(pair[0], pair[1]) == Ordering::Greater {
                violations += 1;
                result.sample(format!(
                    "{}: rank {} ({} {}, {}) precedes rank {} ({} {}, {})",
                    describe(&key),
                    pair[0].rank,
                    pair[0].unitid,
                    pair[0].institution_name.as_deref().unwrap_or("unnamed"),
                    pair[0].count,
                    pair[1].rank,
                    pair[1].unitid,
                    pair[1].institution_name.as_deref().unwrap_or("unnamed"),
                    pair[1].count
                ));
            }
        }
    }

    result.detail("partitions_checked", checked);
    result.detail("order_violations", violations);
    if violations > 0 {
        result.fail(format!("Found {} rank order violations", violations));
    }
    result
}

/// Only entries with a rate carry `rank_by_rate`, which runs 1..k by
/// non-increasing rate.
pub fn rank_by_rate_scope(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(RANK_BY_RATE_SCOPE);
    let grouped = partitions(input);
    let mut violations = 0usize;

    for (key, entries) in &grouped {
        for entry in entries {
            if entry.rate_per_10k.is_some() != entry.rank_by_rate.is_some() {
                violations += 1;
                result.sample(format!(
                    "{} {}: rate {:?} with rank_by_rate {:?}",
                    describe(key),
                    entry.unitid,
                    entry.rate_per_10k,
                    entry.rank_by_rate
                ));
            }
        }

        let mut rated: Vec<(u32, f64)> = entries
            .iter()
            .filter_map(|e| Some((e.rank_by_rate?, e.rate_per_10k?)))
            .collect();
        rated.sort_by_key(|(rank, _)| *rank);
        let contiguous = rated
            .iter()
            .enumerate()
            .all(|(i, (rank, _))| *rank as usize == i + 1);
        let ordered = rated.windows(2).all(|pair| pair[0].1 >= pair[1].1);
        if !contiguous || !ordered {
            violations += 1;
            result.sample(format!("{}: rank_by_rate sequence out of order", describe(key)));
        }
    }

    result.detail("partitions_checked", grouped.len());
    result.detail("violations", violations);
    if violations > 0 {
        result.fail(format!("Found {} rank-by-rate violations", violations));
    }
    result
}

/// Percentages of each partition sum to 100 within the tiered tolerance,
/// or are all zero when the partition total is zero.
pub fn percent_sums(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(PERCENT_SUMS);
    let bands = input.config.percent_tolerance;
    let grouped = partitions(input);
    let mut severe = 0usize;
    let mut drift = 0usize;

    for (key, entries) in &grouped {
        let total: i64 = entries.iter().map(|e| e.count).sum();
        let pct_sum: f64 = entries.iter().map(|e| e.pct_of_total).sum();

        if total == 0 {
            if entries.iter().any(|e| e.pct_of_total != 0.0) {
                severe += 1;
                result.sample(format!("{}: zero total with non-zero percentages", describe(key)));
            }
            continue;
        }

        let variance = (pct_sum - 100.0).abs();
        if variance > bands.severe {
            severe += 1;
            result.sample(format!(
                "{}: sum {:.2}% over {} entries",
                describe(key),
                pct_sum,
                entries.len()
            ));
        } else if variance > bands.for_entries(entries.len()) {
            drift += 1;
        }
    }

    result.detail("partitions_checked", grouped.len());
    result.detail("severe_errors", severe);
    result.detail("rounding_warnings", drift);
    if severe > 0 {
        result.fail(format!("Found {} severe percentage sum errors", severe));
    }
    if drift > 0 {
        result.warn(format!(
            "Found {} partitions with rounding variance beyond their tolerance band",
            drift
        ));
    }
    result
}

/// Institutions the projection should have written a profile for.
fn expected_profiles(input: &AuditInput<'_>) -> BTreeSet<InstitutionId> {
    let with_rows: BTreeSet<InstitutionId> = input
        .summary
        .iter()
        .filter(|r| input.data_years.contains(r.year))
        .map(|r| r.unitid)
        .collect();
    input
        .institutions
        .iter()
        .filter(|d| with_rows.contains(&d.unitid))
        .filter(|d| input.process_all_schools || d.is_ivy)
        .map(|d| d.unitid)
        .collect()
}

fn schools_dir(json_dir: &Path) -> PathBuf {
    json_dir.join(cs_export::writer::SCHOOLS_DIR)
}

/// Profile files keyed by the unitid in their file name.
fn profile_files(dir: &Path) -> std::io::Result<BTreeMap<InstitutionId, PathBuf>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let unitid = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i32>().ok());
        if let Some(unitid) = unitid {
            files.insert(InstitutionId::new(unitid), path);
        }
    }
    Ok(files)
}

/// Every institution with data in the exported years has a profile.
pub fn school_completeness(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(SCHOOL_COMPLETENESS);
    let Some(json_dir) = input.json_dir else {
        result.warn("JSON output not audited");
        return result;
    };

    let expected = expected_profiles(input);
    let files = match profile_files(&schools_dir(json_dir)) {
        Ok(files) => files,
        Err(e) => {
            result.fail(format!(
                "Cannot read {}: {}; run `clery generate` first",
                schools_dir(json_dir).display(),
                e
            ));
            return result;
        }
    };

    let missing: Vec<&InstitutionId> = expected.iter().filter(|id| !files.contains_key(*id)).collect();
    let extra = files.keys().filter(|id| !expected.contains(*id)).count();
    for id in missing.iter().take(crate::result::MAX_SAMPLES) {
        result.sample(format!("no profile for {}", id));
    }

    result.detail("schools_expected", expected.len());
    result.detail("profiles_found", files.len());
    result.detail("missing_profiles", missing.len());
    result.detail("extra_profiles", extra);
    if !missing.is_empty() {
        result.fail(format!("Missing profiles for {} schools", missing.len()));
    }
    if extra > 0 {
        result.warn(format!("Found {} profiles without summary data", extra));
    }
    result
}

/// Profile yearly totals equal the summary's "All" totals per year.
pub fn incident_totals(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(INCIDENT_TOTALS);
    let Some(json_dir) = input.json_dir else {
        result.warn("JSON output not audited");
        return result;
    };
    let files = match profile_files(&schools_dir(json_dir)) {
        Ok(files) => files,
        Err(e) => {
            result.fail(format!("Cannot read profiles: {}", e));
            return result;
        }
    };

    let mut expected: BTreeMap<(InstitutionId, i16), i64> = BTreeMap::new();
    for row in input
        .summary
        .iter()
        .filter(|r| r.geography == Geography::All && input.data_years.contains(r.year))
    {
        *expected.entry((row.unitid, row.year)).or_insert(0) += row.count;
    }

    let mut variances = 0usize;
    let mut unreadable = 0usize;
    for (unitid, path) in &files {
        let profile: ProfileDocument = match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(profile) => profile,
            Err(e) => {
                unreadable += 1;
                result.sample(format!("{}: {}", path.display(), e));
                continue;
            }
        };
        let stored: BTreeMap<i16, i64> = profile
            .yearly_totals
            .iter()
            .map(|t| (t.year, t.total))
            .collect();
        for ((_, year), total) in expected.range((*unitid, i16::MIN)..=(*unitid, i16::MAX)) {
            let found = stored.get(year).copied().unwrap_or(0);
            if found != *total {
                variances += 1;
                result.sample(format!("{} ({}): JSON={}, summary={}", unitid, year, found, total));
            }
        }
    }

    result.detail("profiles_validated", files.len() - unreadable);
    result.detail("variances_found", variances);
    if unreadable > 0 {
        result.fail(format!("{} profiles could not be parsed", unreadable));
    }
    if variances > 0 {
        result.fail(format!("Found {} incident total variances", variances));
    }
    result
}

/// Per year, facts in the rollup geographies sum to the summary's "All" total.
pub fn source_traceability(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(SOURCE_TRACEABILITY);
    let mut fact_totals: BTreeMap<i16, i64> = BTreeMap::new();
    let mut residence_halls: i64 = 0;
    for fact in input.facts {
        if fact.geography.rolls_up() {
            *fact_totals.entry(fact.year).or_insert(0) += fact.count;
        } else if fact.geography == Geography::ResidenceHalls {
            residence_halls += fact.count;
        }
    }

    let mut summary_totals: BTreeMap<i16, i64> = BTreeMap::new();
    for row in input.summary.iter().filter(|r| r.geography == Geography::All) {
        *summary_totals.entry(row.year).or_insert(0) += row.count;
    }

    let years: BTreeSet<i16> = fact_totals.keys().chain(summary_totals.keys()).copied().collect();
    let mut by_year = Vec::new();
    let mut mismatched = 0usize;
    for year in years {
        let facts = fact_totals.get(&year).copied().unwrap_or(0);
        let summary = summary_totals.get(&year).copied().unwrap_or(0);
        if facts != summary {
            mismatched += 1;
            result.sample(format!("{}: facts={}, summary={}", year, facts, summary));
        }
        by_year.push(json!({ "year": year, "fact_total": facts, "summary_total": summary }));
    }

    result.detail("fact_total", fact_totals.values().sum::<i64>());
    result.detail("summary_total", summary_totals.values().sum::<i64>());
    result.detail("residence_hall_total", residence_halls);
    result.detail("by_year", by_year);
    if mismatched > 0 {
        result.fail(format!("Fact and summary totals differ in {} years", mismatched));
    }
    result
}

fn round1(value: f64) -> f64 {
    cs_core::round_to(value, 1)
}

/// Share of institution-years with an FTE; low coverage is reported.
pub fn fte_coverage(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(FTE_COVERAGE);
    // year -> (institutions, with fte)
    let mut years: BTreeMap<i16, (BTreeSet<InstitutionId>, BTreeSet<InstitutionId>)> =
        BTreeMap::new();
    for row in input.summary {
        let (all, with_fte) = years.entry(row.year).or_default();
        all.insert(row.unitid);
        if row.fte.is_some() {
            with_fte.insert(row.unitid);
        }
    }

    let mut total = 0usize;
    let mut covered = 0usize;
    let mut by_year = Vec::new();
    for (year, (all, with_fte)) in &years {
        total += all.len();
        covered += with_fte.len();
        by_year.push(json!({
            "year": year,
            "schools_with_data": all.len(),
            "schools_with_fte": with_fte.len(),
            "coverage_pct": round1(with_fte.len() as f64 / all.len() as f64 * 100.0),
        }));
    }
    let overall = if total > 0 {
        covered as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    result.detail("by_year", by_year);
    result.detail("overall_coverage_pct", round1(overall));
    result.detail("enrollment_rows", input.enrollment.len());
    if overall < MIN_FTE_COVERAGE_PCT {
        result.warn(format!(
            "Overall FTE coverage is {:.1}% (some schools lack enrollment data)",
            overall
        ));
    }
    result
}

fn canonical_summary(rows: &[SchoolYearOffense]) -> Vec<&SchoolYearOffense> {
    let mut rows: Vec<&SchoolYearOffense> = rows.iter().collect();
    rows.sort_by(|a, b| {
        (a.year, a.unitid, a.offense.as_str(), a.geography.as_str()).cmp(&(
            b.year,
            b.unitid,
            b.offense.as_str(),
            b.geography.as_str(),
        ))
    });
    rows
}

fn canonical_rankings(entries: &[RankingEntry]) -> Vec<&RankingEntry> {
    let mut entries: Vec<&RankingEntry> = entries.iter().collect();
    entries.sort_by(|a, b| {
        (
            a.scope.preset_id(),
            a.year,
            a.offense.as_stored(),
            a.geography.as_str(),
            a.rank,
            a.unitid,
        )
            .cmp(&(
                b.scope.preset_id(),
                b.year,
                b.offense.as_stored(),
                b.geography.as_str(),
                b.rank,
                b.unitid,
            ))
    });
    entries
}

/// Checksums of the summary and the three ranking tables, order-independent.
pub fn output_checksums(
    summary: &[SchoolYearOffense],
    rankings: &cs_engine::RankingTables,
) -> serde_json::Result<[String; 4]> {
    Ok([
        checksum_of(&canonical_summary(summary))?,
        checksum_of(&canonical_rankings(&rankings.ivy))?,
        checksum_of(&canonical_rankings(&rankings.state))?,
        checksum_of(&canonical_rankings(&rankings.national))?,
    ])
}

const TABLE_NAMES: [&str; 4] = [
    "agg_school_year_offense",
    "agg_ivy_rankings",
    "agg_state_rankings",
    "agg_national_rankings",
];

/// Two fresh engine runs produce identical tables, and the staged tables
/// match them.
pub fn engine_idempotence(input: &AuditInput<'_>) -> CheckResult {
    let mut result = CheckResult::new(ENGINE_IDEMPOTENCE);
    let engine_input = EngineInput {
        facts: input.facts,
        enrollment: input.enrollment,
        institutions: input.institutions,
        reference: input.reference,
        options: input.options,
    };

    let run = || -> Result<[String; 4], String> {
        let EngineOutput { summary, rankings } =
            cs_engine::run(engine_input).map_err(|e| e.to_string())?;
        output_checksums(&summary, &rankings).map_err(|e| e.to_string())
    };

    let (first, second) = match (run(), run()) {
        (Ok(first), Ok(second)) => (first, second),
        (Err(e), _) | (_, Err(e)) => {
            result.fail(format!("Engine run failed: {}", e));
            return result;
        }
    };
    let staged = match output_checksums(input.summary, input.rankings) {
        Ok(staged) => staged,
        Err(e) => {
            result.fail(format!("Cannot checksum staged tables: {}", e));
            return result;
        }
    };

    let mut checksums = serde_json::Map::new();
    for (i, name) in TABLE_NAMES.iter().enumerate() {
        checksums.insert(name.to_string(), json!(first[i]));
        if first[i] != second[i] {
            result.fail(format!("{} differs between two runs on the same input", name));
        } else if staged[i] != first[i] {
            result.warn(format!(
                "Staged {} differs from a fresh run; rerun `clery aggregate`",
                name
            ));
        }
    }
    result.detail("checksums", serde_json::Value::Object(checksums));
    result
}

#[cfg(test)]
#[path = "checks_test.rs"]
mod tests;
