//! Creates a small rotated-pole NetCDF file for trying out cube_frame.
//!
//! The layout mirrors regional climate projection output: a daily
//! precipitation field on a rotated latitude/longitude grid with a CF grid
//! mapping variable.

use netcdf::create;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_rotated_pole.nc");

    println!("🔨 Creating test NetCDF file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Test Regional Climate Data")?;
    file.add_attribute("Conventions", "CF-1.7")?;

    let n_time = 4;
    let n_lat = 5;
    let n_lon = 6;

    file.add_dimension("time", n_time)?;
    file.add_dimension("grid_latitude", n_lat)?;
    file.add_dimension("grid_longitude", n_lon)?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2020-12-01 00:00:00")?;
        time_var.put_attribute("standard_name", "time")?;
        time_var.put_attribute("calendar", "standard")?;
        time_var.put_attribute("axis", "T")?;

        let time_data: Vec<f64> = (0..n_time).map(|i| i as f64 + 0.5).collect();
        time_var.put_values(&time_data, ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f64>("grid_latitude", &["grid_latitude"])?;
        lat_var.put_attribute("units", "degrees")?;
        lat_var.put_attribute("standard_name", "grid_latitude")?;
        lat_var.put_attribute("axis", "Y")?;

        let lat_data: Vec<f64> = (0..n_lat).map(|i| -2.0 + i as f64).collect();
        lat_var.put_values(&lat_data, ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f64>("grid_longitude", &["grid_longitude"])?;
        lon_var.put_attribute("units", "degrees")?;
        lon_var.put_attribute("standard_name", "grid_longitude")?;
        lon_var.put_attribute("axis", "X")?;

        let lon_data: Vec<f64> = (0..n_lon).map(|i| -2.5 + i as f64).collect();
        lon_var.put_values(&lon_data, ..)?;
    }

    {
        let mut crs_var = file.add_variable::<i32>("rotated_latitude_longitude", &[])?;
        crs_var.put_attribute("grid_mapping_name", "rotated_latitude_longitude")?;
        crs_var.put_attribute("grid_north_pole_latitude", 39.25f64)?;
        crs_var.put_attribute("grid_north_pole_longitude", 198.0f64)?;
        crs_var.put_attribute("north_pole_grid_longitude", 0.0f64)?;
        crs_var.put_attribute("earth_radius", 6_371_229.0f64)?;
    }

    {
        let mut pr_var =
            file.add_variable::<f32>("pr", &["time", "grid_latitude", "grid_longitude"])?;
        pr_var.put_attribute("units", "mm/day")?;
        pr_var.put_attribute("standard_name", "lwe_precipitation_rate")?;
        pr_var.put_attribute("long_name", "Precipitation rate")?;
        pr_var.put_attribute("grid_mapping", "rotated_latitude_longitude")?;
        pr_var.put_attribute("_FillValue", -999.0f32)?;

        let mut pr_data = Vec::with_capacity(n_time * n_lat * n_lon);
        for t in 0..n_time {
            for y in 0..n_lat {
                for x in 0..n_lon {
                    let wave = ((x as f32 + t as f32) * std::f32::consts::PI / 3.0).sin();
                    pr_data.push((2.0 + 1.5 * wave + 0.1 * y as f32).max(0.0));
                }
            }
        }
        // One missing cell to show fill handling.
        pr_data[0] = -999.0;

        pr_var.put_values(&pr_data, ..)?;
    }

    println!("✅ Successfully created test NetCDF file with:");
    println!("   📏 Dimensions: time({n_time}), grid_latitude({n_lat}), grid_longitude({n_lon})");
    println!("   📈 Variables: time, grid_latitude, grid_longitude, rotated_latitude_longitude, pr");
    println!("\n🧪 Try it with:");
    println!("   cargo run -- -f test_rotated_pole.nc --summary");

    Ok(())
}
