//! Clean command implementation

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::cli::{CleanArgs, GlobalArgs};
use crate::commands::common::load_config;

/// Execute the clean command
pub async fn execute(args: &CleanArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let root = &global.project_dir;

    let mut files: Vec<PathBuf> = Vec::new();
    if config.staging_path != ":memory:" {
        let staging = PathBuf::from(config.staging_path_resolved(root));
        let wal = PathBuf::from(format!("{}.wal", staging.display()));
        files.push(staging);
        files.push(wal);
    }
    let dirs = [config.json_dir_absolute(root), config.qa_dir_absolute(root)];

    if args.dry_run {
        println!("Dry run - would clean the following:");
    } else {
        println!("Cleaning project: {}", config.name);
    }

    let mut cleaned_count = 0;
    let mut skipped_count = 0;

    let targets = files
        .iter()
        .map(|p| (p, false))
        .chain(dirs.iter().map(|p| (p, true)));
    for (path, is_dir) in targets {
        if !path.exists() {
            if global.verbose {
                println!("  Skipping (not found): {}", path.display());
            }
            skipped_count += 1;
            continue;
        }

        if args.dry_run {
            println!("  Would remove: {}", path.display());
            cleaned_count += 1;
            continue;
        }

        let removed = if is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match removed {
            Ok(_) => {
                println!("  Removed: {}", path.display());
                cleaned_count += 1;
            }
            Err(e) => {
                eprintln!("  Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    println!();
    if args.dry_run {
        println!(
            "Would clean {} target{}, {} not found",
            cleaned_count,
            if cleaned_count == 1 { "" } else { "s" },
            skipped_count
        );
    } else {
        println!(
            "Cleaned {} target{}, {} skipped",
            cleaned_count,
            if cleaned_count == 1 { "" } else { "s" },
            skipped_count
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "clean_test.rs"]
mod tests;
