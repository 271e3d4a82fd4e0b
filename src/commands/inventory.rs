use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use geoseed::loader::load_dataset;
use geoseed::model::{DatasetEntry, DatasetInventoryManifest};
use geoseed::schema::EntityKind;
use geoseed::util::{now_utc_string, sha256_file, write_json_pretty};

use crate::cli::InventoryArgs;

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.input_root)?;

    if args.dry_run {
        info!(
            dataset_count = manifest.dataset_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.output_root
            .join("manifests")
            .join("dataset_inventory.json")
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote dataset inventory manifest");
    info!(dataset_count = manifest.dataset_count, "inventory completed");

    Ok(())
}

/// Verifies all five dataset files exist under the input root and records
/// their hash and record count. A missing or unparseable file fails the
/// whole inventory; generation depends on every kind being present.
pub fn build_manifest(input_root: &Path) -> Result<DatasetInventoryManifest> {
    let mut datasets = Vec::with_capacity(EntityKind::ALL.len());

    for kind in EntityKind::ALL {
        let path = input_root.join(kind.dataset_filename());
        if !path.exists() {
            bail!("missing dataset file: {}", path.display());
        }

        let records = load_dataset(&path)?;
        let sha256 = sha256_file(&path)?;

        datasets.push(DatasetEntry {
            filename: kind.dataset_filename().to_string(),
            kind: kind.as_str().to_string(),
            sha256,
            record_count: records.len(),
        });
    }

    Ok(DatasetInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: input_root.display().to_string(),
        dataset_count: datasets.len(),
        datasets,
    })
}
