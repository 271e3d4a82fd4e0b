use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use geoseed::model::{DatasetInventoryManifest, GenerateRunManifest};

use crate::cli::StatusArgs;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.output_root.join("manifests");
    let inventory_path = manifest_dir.join("dataset_inventory.json");
    let output_path = args.output_root.join("locations_seeder.sql");

    info!(output_root = %args.output_root.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: DatasetInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            dataset_count = inventory.dataset_count,
            "loaded dataset inventory manifest"
        );
        for entry in &inventory.datasets {
            info!(
                kind = %entry.kind,
                records = entry.record_count,
                sha256 = %entry.sha256,
                "dataset"
            );
        }
    } else {
        warn!(path = %inventory_path.display(), "dataset inventory manifest missing");
    }

    match find_latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let run: GenerateRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                run_id = %run.run_id,
                status = %run.status,
                statements = run.counts.statements_total,
                bytes = run.counts.bytes_written,
                warnings = run.warnings.len(),
                updated_at = %run.updated_at,
                "latest generate run"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no generate run manifests found"),
    }

    match fs::metadata(&output_path) {
        Ok(metadata) => info!(
            path = %output_path.display(),
            bytes = metadata.len(),
            "seed script present"
        ),
        Err(_) => warn!(path = %output_path.display(), "seed script missing"),
    }

    Ok(())
}

/// Run manifests are stamped `generate_run_<compact-utc>.json`; the compact
/// stamps sort lexicographically, so the latest run wins a plain comparison.
fn find_latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    let pattern = Regex::new(r"^generate_run_(\d{8}T\d{6}Z)\.json$")
        .context("failed to compile run manifest filename regex")?;

    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<(String, PathBuf)> = None;

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        let Some(stamp) = pattern
            .captures(name)
            .and_then(|captures| captures.get(1))
            .map(|stamp| stamp.as_str().to_string())
        else {
            continue;
        };

        if latest.as_ref().is_none_or(|(best, _)| stamp > *best) {
            latest = Some((stamp, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::find_latest_run_manifest;

    #[test]
    fn latest_run_manifest_wins_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("generate_run_20260101T000000Z.json"), "{}").unwrap();
        fs::write(dir.path().join("generate_run_20260807T101500Z.json"), "{}").unwrap();
        fs::write(dir.path().join("dataset_inventory.json"), "{}").unwrap();
        fs::write(dir.path().join("generate_run_notastamp.json"), "{}").unwrap();

        let latest = find_latest_run_manifest(dir.path()).unwrap().unwrap();
        assert!(
            latest
                .file_name()
                .unwrap()
                .to_string_lossy()
                .contains("20260807T101500Z")
        );
    }

    #[test]
    fn missing_manifest_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("manifests");

        assert!(find_latest_run_manifest(&missing).unwrap().is_none());
    }
}
