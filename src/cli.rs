//! Defines command-line interface options using `clap` for the cube_frame demo.

use clap::Parser;
use cube_frame::ExistingLatLon;
use std::path::PathBuf;

/// Climate projection file the tool reads when no `--file` is given
pub const DEFAULT_FILE: &str = "pr_rcp85_land-rcm_eur_12km_01_day_20201201-20301130.nc";

/// Derive latitude/longitude for a NetCDF cube and flatten it into a table
#[derive(Parser, Debug)]
#[command(
    version,
    name = "cube_frame",
    about = "Derive latitude/longitude for a NetCDF cube and flatten it into a table"
)]
pub struct Args {
    /// Path to the NetCDF file
    #[arg(short, long, default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Data variable to load. Required when the file holds several.
    #[arg(long)]
    pub var: Option<String>,

    /// Number of table rows to print
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// What to do if the cube already has latitude/longitude: reject, replace or duplicate
    #[arg(long, default_value = "reject", value_parser = parse_policy)]
    pub on_existing: ExistingLatLon,

    /// Radius in metres of the spherical earth used for latitude/longitude.
    /// Defaults to the PP earth radius.
    #[arg(long)]
    pub earth_radius: Option<f64>,

    /// Path to save the full table as CSV
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Path to save the augmented cube as NetCDF
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Print a summary of the loaded cube
    #[arg(long)]
    pub summary: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_policy(s: &str) -> Result<ExistingLatLon, String> {
    s.parse::<ExistingLatLon>().map_err(|e| e.to_string())
}
