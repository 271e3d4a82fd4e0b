use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "geoseed",
    version,
    about = "Generate SQL seed scripts from hierarchical geo JSON datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Generate(GenerateArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "input_jsons")]
    pub input_root: PathBuf,

    #[arg(long, default_value = "output_sql")]
    pub output_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, default_value = "input_jsons")]
    pub input_root: PathBuf,

    #[arg(long, default_value = "output_sql")]
    pub output_root: PathBuf,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub inventory_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub refresh_inventory: bool,

    #[arg(long, default_value = "sbl_database")]
    pub database: String,

    #[arg(long, default_value = "sbl_schema")]
    pub schema: String,

    /// Omit the psql \connect line from the preamble.
    #[arg(long, default_value_t = false)]
    pub skip_connect: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "output_sql")]
    pub output_root: PathBuf,
}
