use super::*;
use crate::cli::ScopeArgs;
use crate::commands::common::{ExitCode, EXIT_MISSING_STAGE};
use crate::commands::{aggregate, dimensions, enrollment, transform};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const AMHERST: i32 = 164465001;
const EXAMPLE: i32 = 999999001;

/// Two non-Ivy schools and no state column anywhere.
fn stateless_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("clery.yml"),
        "name: stateless\nstaging_path: \":memory:\"\ndata_years:\n  start: 2021\n  end: 2023\n",
    )
    .unwrap();
    let raw = dir.path().join("data/raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(
        raw.join("oncampuscrime212223.csv"),
        format!(
            "UNITID_P,INSTNM,CITY,BURGLA21,BURGLA22,BURGLA23\n\
             {},Amherst College,Amherst,3,4,5\n\
             {},Example College,Springfield,1,0,2\n",
            AMHERST, EXAMPLE
        ),
    )
    .unwrap();
    dir
}

fn global_args(root: PathBuf) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: root,
        config: None,
    }
}

#[tokio::test]
async fn test_all_schools_run_without_states_writes_profiles() {
    let dir = stateless_project();
    let session = Session::open(&global_args(dir.path().to_path_buf())).unwrap();
    let scope = ScopeArgs::default();

    transform::run(&session, &scope).await.unwrap();
    enrollment::run(&session).await.unwrap();
    dimensions::run(&session).await.unwrap();
    aggregate::run(&session, &scope).await.unwrap();

    // No state code means no state or national entries at all.
    let rankings = read_ranking_tables(session.db()).await.unwrap();
    assert!(rankings.national.is_empty());
    assert!(rankings.state.is_empty());
    let metadata = tables::read_run_metadata(session.db()).await.unwrap();
    assert!(metadata.process_all_schools);
    assert_eq!(metadata.institution_count, 2);

    run(&session).await.unwrap();

    let json_dir = session.config.json_dir_absolute(&session.root);
    assert!(json_dir.join("school-index.json").exists());
    for unitid in [AMHERST, EXAMPLE] {
        let profile = json_dir.join(format!("schools/{}.json", unitid));
        assert!(profile.exists(), "{} missing", profile.display());
    }
}

#[tokio::test]
async fn test_ivy_only_aggregate_is_followed_by_generate() {
    let dir = stateless_project();
    let session = Session::open(&global_args(dir.path().to_path_buf())).unwrap();
    let all = ScopeArgs::default();
    let ivy_only = ScopeArgs {
        ivy_only: true,
        all_schools: false,
    };

    transform::run(&session, &all).await.unwrap();
    enrollment::run(&session).await.unwrap();
    dimensions::run(&session).await.unwrap();
    aggregate::run(&session, &ivy_only).await.unwrap();
    assert!(!tables::read_run_metadata(session.db()).await.unwrap().process_all_schools);

    run(&session).await.unwrap();

    let json_dir = session.config.json_dir_absolute(&session.root);
    assert!(!json_dir.join("school-index.json").exists());
    assert!(!json_dir.join(format!("schools/{}.json", AMHERST)).exists());
}

#[tokio::test]
async fn test_generate_before_aggregate_is_missing_stage() {
    let dir = stateless_project();
    let session = Session::open(&global_args(dir.path().to_path_buf())).unwrap();
    let err = run(&session).await.unwrap_err();
    let code = err.downcast_ref::<ExitCode>().unwrap();
    assert_eq!(code.0, EXIT_MISSING_STAGE);
}
