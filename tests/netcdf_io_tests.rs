use cube_frame::coord_system::PP_EARTH_RADIUS;
use cube_frame::netcdf_io::cube_names;
use cube_frame::prelude::*;
use netcdf::create;
use std::path::Path;
use tempfile::tempdir;

/// Writes a small rotated-pole precipitation file with one fill value.
fn write_rotated_pole_file(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("time", 2)?;
    file.add_dimension("grid_latitude", 3)?;
    file.add_dimension("grid_longitude", 4)?;
    file.add_attribute("title", "Test Regional Climate Data")?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("standard_name", "time")?;
        var.put_attribute("units", "days since 2020-12-01 00:00:00")?;
        var.put_attribute("calendar", "360_day")?;
        var.put_attribute("axis", "T")?;
        var.put_values(&[0.5, 1.5], ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("grid_latitude", &["grid_latitude"])?;
        var.put_attribute("standard_name", "grid_latitude")?;
        var.put_attribute("units", "degrees")?;
        var.put_attribute("axis", "Y")?;
        var.put_values(&[-1.0, 0.0, 1.0], ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("grid_longitude", &["grid_longitude"])?;
        var.put_attribute("standard_name", "grid_longitude")?;
        var.put_attribute("units", "degrees")?;
        var.put_attribute("axis", "X")?;
        var.put_values(&[-1.5, -0.5, 0.5, 1.5], ..)?;
    }
    {
        let mut var = file.add_variable::<i32>("rotated_latitude_longitude", &[])?;
        var.put_attribute("grid_mapping_name", "rotated_latitude_longitude")?;
        var.put_attribute("grid_north_pole_latitude", 39.25f64)?;
        var.put_attribute("grid_north_pole_longitude", 198.0f64)?;
        var.put_attribute("earth_radius", PP_EARTH_RADIUS)?;
    }
    {
        let mut var =
            file.add_variable::<f32>("pr", &["time", "grid_latitude", "grid_longitude"])?;
        var.put_attribute("standard_name", "lwe_precipitation_rate")?;
        var.put_attribute("units", "mm/day")?;
        var.put_attribute("grid_mapping", "rotated_latitude_longitude")?;
        var.put_attribute("_FillValue", -999.0f32)?;
        var.put_attribute("cell_methods", "time: mean")?;

        let mut values: Vec<f32> = (0..24).map(|i| i as f32 * 0.25).collect();
        values[5] = -999.0;
        var.put_values(&values, ..)?;
    }

    Ok(())
}

#[test]
fn test_load_rotated_pole_cube() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("pr_rotated.nc");
    write_rotated_pole_file(&file_path)?;

    assert_eq!(cube_names(&file_path)?, vec!["pr"]);

    let cube = load_cube(&file_path, None)?;
    assert_eq!(cube.name(), "lwe_precipitation_rate");
    assert_eq!(cube.meta().column_name(), "pr");
    assert_eq!(cube.meta().units.as_deref(), Some("mm/day"));
    assert_eq!(cube.shape(), &[2, 3, 4]);

    let (t, t_dim) = cube.dim_coord_for_axis(AxisRole::T)?;
    assert_eq!((t.name(), t_dim), ("time", 0));
    assert_eq!(t.meta().calendar.as_deref(), Some("360_day"));
    let (y, y_dim) = cube.dim_coord_for_axis(AxisRole::Y)?;
    assert_eq!((y.name(), y_dim), ("grid_latitude", 1));
    let (x, x_dim) = cube.dim_coord_for_axis(AxisRole::X)?;
    assert_eq!((x.name(), x_dim), ("grid_longitude", 2));

    assert_eq!(
        cube.coord_system(),
        Some(&CoordSystem::rotated_pole(39.25, 198.0, PP_EARTH_RADIUS))
    );

    let flat: Vec<f64> = cube.data().iter().copied().collect();
    assert!(flat[5].is_nan());
    assert_eq!(flat[4], 1.0);
    assert_eq!(flat[23], 5.75);

    assert_eq!(
        cube.attributes().get("cell_methods"),
        Some(&serde_json::json!("time: mean"))
    );
    assert!(!cube.attributes().contains_key("_FillValue"));

    Ok(())
}

#[test]
fn test_load_requires_unique_cube() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("two_vars.nc");

    {
        let mut file = create(&file_path)?;
        file.add_dimension("x", 2)?;
        file.add_variable::<f64>("tas", &["x"])?
            .put_values(&[280.0, 281.0], ..)?;
        file.add_variable::<f64>("pr", &["x"])?
            .put_values(&[0.0, 1.0], ..)?;
    }

    match load_cube(&file_path, None) {
        Err(CubeFrameError::NoUniqueCube { candidates }) => {
            assert_eq!(candidates, vec!["tas", "pr"]);
        }
        other => panic!("Expected NoUniqueCube error, got {:?}", other),
    }

    let tas = load_cube(&file_path, Some("tas"))?;
    assert_eq!(tas.name(), "tas");
    assert_eq!(tas.dim_coords().count(), 0);

    match load_cube(&file_path, Some("non_existent")) {
        Err(CubeFrameError::VariableNotFound { var }) => assert_eq!(var, "non_existent"),
        other => panic!("Expected VariableNotFound error, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_save_and_reload_augmented_cube() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("pr_rotated.nc");
    let output_path = temp_dir.path().join("pr_latlon.nc");
    write_rotated_pole_file(&input_path)?;

    let cube = load_cube(&input_path, None)?;
    let augmented = add_lat_lon(&cube, &LatLonOptions::new())?;
    save_cube(&augmented, &output_path)?;

    let reloaded = load_cube(&output_path, None)?;
    assert_eq!(reloaded.meta().column_name(), "pr");
    assert_eq!(reloaded.shape(), augmented.shape());
    assert_eq!(reloaded.coord_system(), augmented.coord_system());

    for name in ["latitude", "longitude"] {
        let (saved, saved_dims) = augmented.aux_coord(name).expect("saved coordinate");
        let (loaded, loaded_dims) = reloaded.aux_coord(name).expect("reloaded coordinate");
        assert_eq!(saved_dims, loaded_dims);
        assert_eq!(loaded.meta().units.as_deref(), Some("degrees"));
        assert_eq!(saved.points(), loaded.points());
    }

    let (t, _) = reloaded.dim_coord_for_axis(AxisRole::T)?;
    assert_eq!(t.meta().calendar.as_deref(), Some("360_day"));

    let flat: Vec<f64> = reloaded.data().iter().copied().collect();
    assert!(flat[5].is_nan());
    assert_eq!(flat[23], 5.75);

    Ok(())
}

#[test]
fn test_writer_output_layout() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("pr_rotated.nc");
    let output_path = temp_dir.path().join("pr_copy.nc");
    write_rotated_pole_file(&input_path)?;

    let cube = add_lat_lon(&load_cube(&input_path, None)?, &LatLonOptions::new())?;
    NetCDFWriter::new(&output_path).write_cube(&cube)?;

    let file = netcdf::open(&output_path)?;
    let var = file.variable("pr").expect("Variable should exist");
    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(dims, vec!["time", "grid_latitude", "grid_longitude"]);

    match var.attribute("coordinates").map(|a| a.value()) {
        Some(Ok(netcdf::AttributeValue::Str(value))) => assert_eq!(value, "latitude longitude"),
        other => panic!("Expected a coordinates attribute, got {:?}", other),
    }

    let lat = file.variable("latitude").expect("latitude variable");
    let lat_dims: Vec<String> = lat.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(lat_dims, vec!["grid_latitude", "grid_longitude"]);

    assert!(file.variable("rotated_latitude_longitude").is_some());
    assert!(file.attribute("history").is_some());

    Ok(())
}
