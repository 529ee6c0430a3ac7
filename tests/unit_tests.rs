//! Unit tests for the cube model, coordinate systems and helpers
//!
//! These cover the building blocks that the latitude/longitude derivation and
//! the dataframe conversion rely on.

use cube_frame::{
    coord_system::{CoordSystem, Ellipsoid, PP_EARTH_RADIUS},
    coords::{guess_axis, AuxCoord, AxisRole, CoordMeta, DimCoord},
    cube::Cube,
    errors::{CubeFrameError, Result},
    latlon::ExistingLatLon,
    metadata::summarize_cube,
    time_units::{is_gregorian, TimeUnits},
};
use ndarray::{Array2, ArrayD, IxDyn};
use std::collections::HashMap;

fn grid_cube() -> Result<Cube> {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    let mut cube = Cube::new(CoordMeta::long("data").with_units("K"), data)
        .with_coord_system(CoordSystem::default_geodetic());
    cube.add_dim_coord(
        DimCoord::from_vec(CoordMeta::standard("grid_latitude"), vec![10.0, 20.0])?,
        0,
    )?;
    cube.add_dim_coord(
        DimCoord::from_vec(CoordMeta::standard("grid_longitude"), vec![0.0, 1.0, 2.0])?,
        1,
    )?;
    Ok(cube)
}

#[test]
fn test_error_types() {
    let var_err = CubeFrameError::VariableNotFound {
        var: "tas".to_string(),
    };
    assert!(format!("{}", var_err).contains("Variable 'tas' not found"));

    let axis_err = CubeFrameError::CoordinateNotFound { axis: AxisRole::X };
    assert_eq!(
        format!("{}", axis_err),
        "No dimension coordinate found for axis X"
    );

    let ambiguous = CubeFrameError::AmbiguousCoordinate {
        axis: AxisRole::Y,
        names: vec!["a".to_string(), "b".to_string()],
    };
    assert!(format!("{}", ambiguous).contains("[a, b]"));

    let dup = CubeFrameError::DuplicateCoordinate {
        name: "latitude".to_string(),
    };
    assert!(format!("{}", dup).contains("'latitude' already exists"));

    let generic: CubeFrameError = String::from("Test error").into();
    assert_eq!(format!("{}", generic), "Test error");

    let io: CubeFrameError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(std::error::Error::source(&io).is_some());
    assert!(std::error::Error::source(&dup).is_none());
}

#[test]
fn test_time_units_parsing() -> Result<()> {
    let units = TimeUnits::parse("days since 2000-01-01")?;
    assert_eq!(units.step_ns, 86_400_000_000_000);
    assert_eq!(units.reference.to_string(), "2000-01-01 00:00:00");

    let decoded = units.decode(1.5).expect("in range");
    assert_eq!(decoded.to_string(), "2000-01-02 12:00:00");

    let hours = TimeUnits::parse("hours since 1970-01-01T06:00:00Z")?;
    assert_eq!(hours.step_ns, 3_600_000_000_000);
    assert_eq!(hours.decode(-6.0).expect("in range").to_string(), "1970-01-01 00:00:00");

    assert!(units.decode(f64::NAN).is_none());

    let seconds = TimeUnits::parse("seconds since 2000-01-01")?;
    let early = seconds.decode(0.0).expect("in range");
    let late = seconds.decode(0.0001).expect("in range");
    assert_ne!(early, late);
    assert_eq!((late - early).num_microseconds(), Some(100));

    for bad in ["days", "fortnights since 2000-01-01", "days since yesterday"] {
        match TimeUnits::parse(bad) {
            Err(CubeFrameError::InvalidTimeUnits { units }) => assert_eq!(units, bad),
            other => panic!("Expected InvalidTimeUnits for '{}', got {:?}", bad, other),
        }
    }

    Ok(())
}

#[test]
fn test_calendars() {
    assert!(is_gregorian(None));
    assert!(is_gregorian(Some("standard")));
    assert!(is_gregorian(Some("Proleptic_Gregorian")));
    assert!(!is_gregorian(Some("360_day")));
    assert!(!is_gregorian(Some("noleap")));
}

#[test]
fn test_ellipsoid() {
    let sphere = Ellipsoid::sphere(PP_EARTH_RADIUS);
    assert!(sphere.is_sphere());
    assert_eq!(sphere.inverse_flattening(), 0.0);

    let wgs84 = Ellipsoid::wgs84();
    assert!(!wgs84.is_sphere());
    assert!((wgs84.inverse_flattening() - 298.257_223_563).abs() < 1e-6);
    assert!((wgs84.semi_minor_axis - 6_356_752.314_245).abs() < 1e-3);

    assert_eq!(
        Ellipsoid::from_inverse_flattening(6_371_000.0, 0.0),
        Ellipsoid::sphere(6_371_000.0)
    );
}

#[test]
fn test_proj_strings() {
    let geog = CoordSystem::default_geodetic();
    assert_eq!(
        geog.to_proj_string(),
        "+proj=longlat +R=6371229 +no_defs +type=crs"
    );

    let rotated = CoordSystem::rotated_pole(39.25, 198.0, PP_EARTH_RADIUS);
    let def = rotated.to_proj_string();
    assert!(def.starts_with("+proj=ob_tran +o_proj=longlat"));
    assert!(def.contains("+o_lat_p=39.25"));
    assert!(def.contains("+o_lon_p=0"));
    assert!(def.contains("+lon_0=18 "));
    assert!(def.contains("+R=6371229"));

    let tm = CoordSystem::TransverseMercator {
        latitude_of_projection_origin: 49.0,
        longitude_of_central_meridian: -2.0,
        false_easting: 400_000.0,
        false_northing: -100_000.0,
        scale_factor_at_central_meridian: 0.999_601_271_7,
        ellipsoid: None,
    };
    let def = tm.to_proj_string();
    assert!(def.starts_with("+proj=tmerc +lat_0=49 +lon_0=-2"));
    assert!(def.contains("+ellps=WGS84"));
    assert!(!tm.is_angular());
    assert!(rotated.is_angular());
}

#[test]
fn test_coord_system_display() {
    assert_eq!(CoordSystem::default_geodetic().to_string(), "GeogCS(6371229)");
    assert_eq!(
        CoordSystem::rotated_pole(39.25, 198.0, PP_EARTH_RADIUS).to_string(),
        "RotatedGeogCS(39.25, 198)"
    );
}

#[test]
fn test_grid_mapping_parsing() -> Result<()> {
    let params: HashMap<String, Vec<f64>> = [
        ("grid_north_pole_latitude", vec![39.25]),
        ("grid_north_pole_longitude", vec![198.0]),
        ("earth_radius", vec![PP_EARTH_RADIUS]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let cs = CoordSystem::from_cf_grid_mapping("rotated_latitude_longitude", &params)?;
    assert_eq!(cs, CoordSystem::rotated_pole(39.25, 198.0, PP_EARTH_RADIUS));

    let geog = CoordSystem::from_cf_grid_mapping("latitude_longitude", &HashMap::new())?;
    assert_eq!(geog, CoordSystem::geog_sphere(6_367_470.0));

    match CoordSystem::from_cf_grid_mapping("sinusoidal", &HashMap::new()) {
        Err(CubeFrameError::UnsupportedGridMapping { name }) => assert_eq!(name, "sinusoidal"),
        other => panic!("Expected UnsupportedGridMapping, got {:?}", other),
    }

    let missing = CoordSystem::from_cf_grid_mapping("rotated_latitude_longitude", &HashMap::new());
    match missing {
        Err(CubeFrameError::Generic(msg)) => assert!(msg.contains("grid_north_pole_latitude")),
        other => panic!("Expected Generic error, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_grid_mapping_round_trip() -> Result<()> {
    let systems = vec![
        CoordSystem::rotated_pole(37.5, 177.5, PP_EARTH_RADIUS),
        CoordSystem::LambertConformal {
            central_lat: 50.0,
            central_lon: 10.0,
            false_easting: 0.0,
            false_northing: 0.0,
            secant_latitudes: vec![35.0, 65.0],
            ellipsoid: Some(Ellipsoid::wgs84()),
        },
        CoordSystem::Stereographic {
            central_lat: 90.0,
            central_lon: -45.0,
            false_easting: 0.0,
            false_northing: 0.0,
            true_scale_lat: Some(70.0),
            scale_factor_at_projection_origin: None,
            ellipsoid: Some(Ellipsoid::sphere(6_371_000.0)),
        },
    ];

    for cs in systems {
        let params: HashMap<String, Vec<f64>> = cs.to_cf_params().into_iter().collect();
        let parsed = CoordSystem::from_cf_grid_mapping(cs.grid_mapping_name(), &params)?;
        assert_eq!(parsed, cs);
    }

    Ok(())
}

#[test]
fn test_dim_coord_validation() -> Result<()> {
    let increasing =
        DimCoord::from_vec(CoordMeta::standard("grid_longitude"), vec![0.0, 1.0, 2.0])?;
    assert_eq!(increasing.axis(), Some(AxisRole::X));
    assert_eq!(increasing.len(), 3);

    let decreasing = DimCoord::from_vec(CoordMeta::standard("latitude"), vec![60.0, 50.0, 40.0])?;
    assert_eq!(decreasing.axis(), Some(AxisRole::Y));

    let single = DimCoord::from_vec(CoordMeta::long("level"), vec![850.0])?;
    assert_eq!(single.axis(), None);
    assert_eq!(single.with_axis(AxisRole::Z).axis(), Some(AxisRole::Z));

    match DimCoord::from_vec(CoordMeta::standard("time"), vec![0.0, 2.0, 1.0]) {
        Err(CubeFrameError::InvalidCoordinate { name, message }) => {
            assert_eq!(name, "time");
            assert!(message.contains("monotonic"));
        }
        other => panic!("Expected InvalidCoordinate, got {:?}", other),
    }

    assert!(DimCoord::from_vec(CoordMeta::standard("time"), vec![]).is_err());
    assert!(DimCoord::from_vec(CoordMeta::standard("time"), vec![0.0, f64::NAN]).is_err());

    Ok(())
}

#[test]
fn test_axis_guessing() {
    let time = CoordMeta::long("forecast_period").with_units("hours since 2020-01-01");
    assert_eq!(guess_axis(&time), Some(AxisRole::T));

    let pressure = CoordMeta::long("level").with_units("hPa");
    assert_eq!(guess_axis(&pressure), Some(AxisRole::Z));

    assert_eq!(guess_axis(&CoordMeta::standard("projection_x_coordinate")), Some(AxisRole::X));
    assert_eq!(guess_axis(&CoordMeta::long("ensemble_member")), None);
}

#[test]
fn test_coord_meta_names() {
    let meta = CoordMeta::standard("air_temperature")
        .with_long_name("Air temperature")
        .with_var_name("tas");
    assert_eq!(meta.name(), "air_temperature");
    assert_eq!(meta.column_name(), "tas");
    assert!(meta.is_named("tas"));
    assert!(meta.is_named("Air temperature"));
    assert!(!meta.is_named("pr"));

    assert_eq!(CoordMeta::default().name(), "unknown");
}

#[test]
fn test_cube_coord_binding() -> Result<()> {
    let mut cube = grid_cube()?;
    assert_eq!(cube.shape(), &[2, 3]);
    assert_eq!(cube.coord_names(), vec!["grid_latitude", "grid_longitude"]);

    let (x, x_dim) = cube.dim_coord_for_axis(AxisRole::X)?;
    assert_eq!(x.name(), "grid_longitude");
    assert_eq!(x_dim, 1);

    let occupied = DimCoord::from_vec(CoordMeta::long("other"), vec![0.0, 1.0])?;
    assert!(matches!(
        cube.add_dim_coord(occupied, 0),
        Err(CubeFrameError::InvalidCoordinate { .. })
    ));

    let out_of_range = DimCoord::from_vec(CoordMeta::long("other"), vec![0.0])?;
    assert!(matches!(
        cube.add_dim_coord(out_of_range, 2),
        Err(CubeFrameError::InvalidCoordinate { .. })
    ));

    let wrong_shape = AuxCoord::new(
        CoordMeta::long("surface_altitude"),
        Array2::<f64>::zeros((3, 2)).into_dyn(),
    );
    match cube.add_aux_coord(wrong_shape, &[0, 1]) {
        Err(CubeFrameError::ShapeMismatch {
            name,
            expected,
            found,
        }) => {
            assert_eq!(name, "surface_altitude");
            assert_eq!(expected, vec![2, 3]);
            assert_eq!(found, vec![3, 2]);
        }
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }

    let repeated = AuxCoord::new(
        CoordMeta::long("surface_altitude"),
        Array2::<f64>::zeros((2, 2)).into_dyn(),
    );
    assert!(matches!(
        cube.add_aux_coord(repeated, &[0, 0]),
        Err(CubeFrameError::InvalidCoordinate { .. })
    ));

    let transposed = AuxCoord::new(
        CoordMeta::long("surface_altitude"),
        Array2::<f64>::zeros((3, 2)).into_dyn(),
    );
    cube.add_aux_coord(transposed, &[1, 0])?;
    assert!(cube.has_aux_coord_named("surface_altitude"));
    assert_eq!(cube.remove_aux_coords_named("surface_altitude"), 1);
    assert!(cube.aux_coord("surface_altitude").is_none());

    Ok(())
}

#[test]
fn test_clone_is_independent() -> Result<()> {
    let original = grid_cube()?;
    let mut copy = original.clone();
    copy.add_aux_coord(
        AuxCoord::new(CoordMeta::long("mask"), Array2::<f64>::zeros((2, 3)).into_dyn()),
        &[0, 1],
    )?;
    copy.attributes_mut()
        .insert("source".to_string(), serde_json::json!("copy"));

    assert_ne!(original, copy);
    assert_eq!(original.aux_coords().count(), 0);
    assert!(original.attributes().is_empty());

    Ok(())
}

#[test]
fn test_cube_summary() -> Result<()> {
    let mut cube = grid_cube()?;
    cube.add_aux_coord(
        AuxCoord::new(CoordMeta::long("mask"), Array2::<f64>::zeros((2, 3)).into_dyn()),
        &[0, 1],
    )?;

    let summary = summarize_cube(&cube);
    assert_eq!(summary.name, "data");
    assert_eq!(summary.units.as_deref(), Some("K"));
    assert_eq!(summary.shape, vec![2, 3]);
    assert_eq!(summary.dimension_names, vec!["grid_latitude", "grid_longitude"]);
    assert_eq!(summary.dim_coords.len(), 2);
    assert_eq!(summary.dim_coords[1].axis, Some(AxisRole::X));
    assert_eq!(summary.aux_coords[0].dims, vec![0, 1]);
    assert_eq!(summary.coord_system.as_deref(), Some("GeogCS(6371229)"));

    cube_frame::metadata::print_cube_summary(&cube);

    Ok(())
}

#[test]
fn test_existing_policy_parsing() {
    assert_eq!("reject".parse::<ExistingLatLon>().ok(), Some(ExistingLatLon::Reject));
    assert_eq!(" Replace ".parse::<ExistingLatLon>().ok(), Some(ExistingLatLon::Replace));
    assert_eq!("duplicate".parse::<ExistingLatLon>().ok(), Some(ExistingLatLon::Duplicate));
    assert_eq!(ExistingLatLon::default(), ExistingLatLon::Reject);

    match "overwrite".parse::<ExistingLatLon>() {
        Err(CubeFrameError::Generic(msg)) => assert!(msg.contains("overwrite")),
        other => panic!("Expected Generic error, got {:?}", other),
    }
}
