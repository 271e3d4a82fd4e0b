use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub filename: String,
    pub kind: String,
    pub sha256: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub dataset_count: usize,
    pub datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePaths {
    pub input_root: String,
    pub manifest_dir: String,
    pub inventory_manifest_path: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateCounts {
    pub region_statements: usize,
    pub subregion_statements: usize,
    pub country_statements: usize,
    pub state_statements: usize,
    pub city_statements: usize,
    pub statements_total: usize,
    pub bytes_written: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub database: String,
    pub schema: String,
    pub paths: GeneratePaths,
    pub counts: GenerateCounts,
    pub source_hashes: Vec<DatasetEntry>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
