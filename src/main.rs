//! Entry point for the cube_frame demo.
//! Loads a cube, derives latitude/longitude, flattens it and prints the head of the table.

use clap::Parser;
use cube_frame::metadata::print_cube_summary;
use cube_frame::prelude::*;
use polars::prelude::{CsvWriter, SerWriter};
use std::fs;

mod cli;

use cli::Args;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!(
        r#"
------------------------------------------------------------------
       cube_frame: cube -> latitude/longitude -> dataframe
------------------------------------------------------------------
"#
    );

    let mut cube = load_cube(&args.file, args.var.as_deref())?;

    if args.summary {
        print_cube_summary(&cube);
    }

    let mut options = LatLonOptions::new().with_policy(args.on_existing);
    if let Some(radius) = args.earth_radius {
        options = options.with_geodetic(CoordSystem::geog_sphere(radius));
    }

    if args.verbose {
        println!(
            "⚡ Deriving latitude/longitude onto {} (policy: {})",
            options.geodetic(),
            args.on_existing.as_str()
        );
    }
    add_lat_lon_inplace(&mut cube, &options)?;

    if let Some(output_path) = &args.output_netcdf {
        save_cube(&cube, output_path)?;
        println!("✅ Saved cube to {}", output_path.display());
    }

    if args.verbose {
        println!("⚡ Flattening {} values into a table", cube.data().len());
    }
    let mut df = cube_to_dataframe(&cube)?;
    if args.verbose {
        println!("✅ Table has {} unique rows", df.height());
    }

    println!("{}", df.head(Some(args.head)));

    if let Some(output_path) = &args.output_csv {
        let mut out = fs::File::create(output_path)?;
        CsvWriter::new(&mut out).finish(&mut df)?;
        println!("✅ Saved table to {}", output_path.display());
    }

    Ok(())
}
