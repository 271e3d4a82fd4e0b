use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use geoseed::compile::{assemble_script, compile_dataset, preamble};
use geoseed::loader::load_dataset;
use geoseed::model::{
    DatasetInventoryManifest, GenerateCounts, GeneratePaths, GenerateRunManifest,
};
use geoseed::schema::EntityKind;
use geoseed::util::{
    ensure_directory, now_utc_string, utc_compact_string, write_json_pretty, write_text,
};

use crate::cli::GenerateArgs;
use crate::commands::inventory;

pub fn run(args: GenerateArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let manifest_dir = args.output_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let inventory_manifest_path = args
        .inventory_manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join("dataset_inventory.json"));
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "generate_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| args.output_root.join("locations_seeder.sql"));

    info!(
        input_root = %args.input_root.display(),
        run_id = %run_id,
        "starting generation"
    );

    let inventory = load_or_refresh_inventory(
        &args.input_root,
        &inventory_manifest_path,
        args.refresh_inventory,
    )?;

    let mut counts = GenerateCounts::default();
    let mut warnings = Vec::new();
    let mut statements = Vec::new();

    for kind in EntityKind::ALL {
        let path = args.input_root.join(kind.dataset_filename());
        let records = load_dataset(&path)?;

        if let Some(entry) = inventory
            .datasets
            .iter()
            .find(|entry| entry.kind == kind.as_str())
        {
            if entry.record_count != records.len() {
                let message = format!(
                    "inventory lists {} {} records but {} were loaded; rerun inventory",
                    entry.record_count,
                    kind.as_str(),
                    records.len()
                );
                warn!(kind = kind.as_str(), "stale dataset inventory");
                warnings.push(message);
            }
        }

        let compiled = compile_dataset(kind, &records, &args.schema)
            .with_context(|| format!("failed to compile {}", path.display()))?;

        info!(
            kind = kind.as_str(),
            statements = compiled.len(),
            "compiled dataset"
        );
        record_count(&mut counts, kind, compiled.len());
        statements.extend(compiled);
    }

    let database = (!args.skip_connect).then_some(args.database.as_str());
    let script = assemble_script(&preamble(database, &args.schema), &statements);

    counts.statements_total = statements.len();
    counts.bytes_written = script.len();

    // Every record has compiled by this point; only now does anything land
    // on disk, so a failed run leaves no partial script behind.
    write_text(&output_path, &script)?;

    let manifest = GenerateRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_generate_command(&args),
        database: args.database.clone(),
        schema: args.schema.clone(),
        paths: GeneratePaths {
            input_root: args.input_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            inventory_manifest_path: inventory_manifest_path.display().to_string(),
            output_path: output_path.display().to_string(),
        },
        counts,
        source_hashes: inventory.datasets,
        warnings,
        notes: vec![
            "Seed script compiled from local JSON datasets in referential order.".to_string(),
            "Parent rows are resolved at execution time via id_internal subqueries.".to_string(),
        ],
    };

    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(
        path = %output_path.display(),
        statements = manifest.counts.statements_total,
        bytes = manifest.counts.bytes_written,
        "wrote seed script"
    );
    info!(path = %run_manifest_path.display(), "wrote generate run manifest");

    Ok(())
}

fn load_or_refresh_inventory(
    input_root: &Path,
    inventory_manifest_path: &Path,
    refresh_inventory: bool,
) -> Result<DatasetInventoryManifest> {
    if refresh_inventory || !inventory_manifest_path.exists() {
        let manifest = inventory::build_manifest(input_root)?;
        write_json_pretty(inventory_manifest_path, &manifest)?;
        info!(
            path = %inventory_manifest_path.display(),
            dataset_count = manifest.dataset_count,
            "refreshed dataset inventory manifest"
        );
        return Ok(manifest);
    }

    let raw = fs::read(inventory_manifest_path)
        .with_context(|| format!("failed to read {}", inventory_manifest_path.display()))?;
    let manifest: DatasetInventoryManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", inventory_manifest_path.display()))?;

    info!(
        path = %inventory_manifest_path.display(),
        dataset_count = manifest.dataset_count,
        "loaded existing dataset inventory manifest"
    );

    Ok(manifest)
}

fn record_count(counts: &mut GenerateCounts, kind: EntityKind, compiled: usize) {
    match kind {
        EntityKind::Region => counts.region_statements = compiled,
        EntityKind::Subregion => counts.subregion_statements = compiled,
        EntityKind::Country => counts.country_statements = compiled,
        EntityKind::State => counts.state_statements = compiled,
        EntityKind::City => counts.city_statements = compiled,
    }
}

fn render_generate_command(args: &GenerateArgs) -> String {
    let mut command = vec![
        "geoseed".to_string(),
        "generate".to_string(),
        "--input-root".to_string(),
        args.input_root.display().to_string(),
        "--output-root".to_string(),
        args.output_root.display().to_string(),
    ];

    if let Some(path) = &args.output_path {
        command.push("--output-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.inventory_manifest_path {
        command.push("--inventory-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.run_manifest_path {
        command.push("--run-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.refresh_inventory {
        command.push("--refresh-inventory".to_string());
    }
    command.push("--database".to_string());
    command.push(args.database.clone());
    command.push("--schema".to_string());
    command.push(args.schema.clone());
    if args.skip_connect {
        command.push("--skip-connect".to_string());
    }

    command.join(" ")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crate::cli::GenerateArgs;

    use super::run;

    fn write_datasets(root: &Path) {
        fs::write(
            root.join("regions.json"),
            r#"[{"id": 1, "name": "Africa", "translations": {"fr": "Afrique"}}]"#,
        )
        .unwrap();
        fs::write(
            root.join("subregions.json"),
            r#"[{"id": 3, "region_id": 1, "name": "Western Africa", "translations": {}}]"#,
        )
        .unwrap();
        fs::write(
            root.join("countries.json"),
            r#"[{
                "id": 120, "name": "Côte d'Ivoire", "iso2": "CI", "iso3": "CIV",
                "numeric_code": "384", "phonecode": "225", "capital": "Yamoussoukro",
                "currency": "XOF", "currency_name": "West African CFA franc",
                "currency_symbol": "CFA", "tld": ".ci", "native": "Côte d'Ivoire",
                "population": 26378274, "gdp": null, "region": "Africa",
                "subregion": "Western Africa", "subregion_id": 3, "nationality": "Ivorian",
                "timezones": [{"zoneName": "Africa/Abidjan", "gmtOffset": 0}],
                "translations": {"fr": "Côte d'Ivoire"}, "latitude": "8.00000000",
                "longitude": "-5.00000000", "emoji": "🇨🇮", "emojiU": "U+1F1E8 U+1F1EE"
            }]"#,
        )
        .unwrap();
        fs::write(
            root.join("states.json"),
            r#"[{
                "id": 15, "country_id": 120, "name": "Lagunes", "country_code": "CI",
                "fips_code": "82", "iso2": "LG", "iso3166_2": "CI-LG", "type": "district",
                "level": null, "native": null, "latitude": "5.88273930",
                "longitude": "-4.23333240", "timezone": {"zoneName": "Africa/Abidjan"},
                "translations": {}
            }]"#,
        )
        .unwrap();
        fs::write(
            root.join("cities.json"),
            r#"[{
                "id": 9000, "state_id": 15, "country_id": 120, "name": "Abidjan",
                "latitude": "5.30965200", "longitude": "-4.01266000",
                "timezone": {"zoneName": "Africa/Abidjan"}, "translations": {"fr": "Abidjan"}
            }]"#,
        )
        .unwrap();
    }

    fn args_for(root: &Path) -> GenerateArgs {
        GenerateArgs {
            input_root: root.join("input"),
            output_root: root.join("output"),
            output_path: None,
            inventory_manifest_path: None,
            run_manifest_path: None,
            refresh_inventory: false,
            database: "sbl_database".to_string(),
            schema: "sbl_schema".to_string(),
            skip_connect: false,
        }
    }

    #[test]
    fn generates_script_manifest_and_kind_ordering() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        write_datasets(&dir.path().join("input"));

        run(args_for(dir.path())).unwrap();

        let script = fs::read_to_string(dir.path().join("output/locations_seeder.sql")).unwrap();
        assert!(script.starts_with("\\connect sbl_database\n"));
        assert!(script.contains("SET search_path TO sbl_schema, public;"));

        let region = script.find("INSERT INTO \"Region\"").unwrap();
        let subregion = script.find("INSERT INTO \"SubRegion\"").unwrap();
        let country = script.find("INSERT INTO \"Country\" (").unwrap();
        let state = script.find("INSERT INTO \"State\"").unwrap();
        let city = script.find("INSERT INTO \"City\"").unwrap();
        assert!(region < subregion && subregion < country && country < state && state < city);

        assert!(script.contains("'Côte d''Ivoire'"));
        assert!(script.contains("(SELECT id FROM \"SubRegion\" WHERE id_internal = 3)"));
        assert!(script.contains("(SELECT id FROM \"State\" WHERE id_internal = 15)"));

        let manifest_dir = dir.path().join("output/manifests");
        assert!(manifest_dir.join("dataset_inventory.json").exists());
        let run_manifests: Vec<_> = fs::read_dir(&manifest_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("generate_run_")
            })
            .collect();
        assert_eq!(run_manifests.len(), 1);
    }

    #[test]
    fn failed_compilation_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        write_datasets(&dir.path().join("input"));
        fs::write(
            dir.path().join("input/cities.json"),
            r#"[{"id": 9000, "state_id": 15, "country_id": 120, "name": "Abidjan"}]"#,
        )
        .unwrap();

        let error = run(args_for(dir.path())).unwrap_err();
        assert!(format!("{error:#}").contains("missing required field"));
        assert!(!dir.path().join("output/locations_seeder.sql").exists());
    }

    #[test]
    fn skip_connect_omits_the_connect_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        write_datasets(&dir.path().join("input"));

        let mut args = args_for(dir.path());
        args.skip_connect = true;
        run(args).unwrap();

        let script = fs::read_to_string(dir.path().join("output/locations_seeder.sql")).unwrap();
        assert!(!script.contains("\\connect"));
        assert!(script.starts_with("SET search_path TO sbl_schema, public;"));
    }
}
