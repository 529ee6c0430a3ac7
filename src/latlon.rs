//! Derived latitude/longitude coordinates
//!
//! [`add_lat_lon`] transforms every (x, y) point of a cube's horizontal grid
//! from the cube's own coordinate system into a geodetic one and attaches the
//! results as 2-D `latitude` and `longitude` auxiliary coordinates over the
//! (Y, X) dimensions.

use crate::coord_system::CoordSystem;
use crate::coords::{AuxCoord, AxisRole, CoordMeta};
use crate::cube::Cube;
use crate::errors::{CubeFrameError, Result};
use ndarray::Array2;
use proj::Proj;
use std::str::FromStr;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// What to do when the cube already carries latitude/longitude coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingLatLon {
    /// Fail with [`CubeFrameError::DuplicateCoordinate`]
    #[default]
    Reject,
    /// Drop existing auxiliary latitude/longitude and attach fresh ones
    Replace,
    /// Attach new coordinates next to the existing ones
    Duplicate,
}

impl ExistingLatLon {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Replace => "replace",
            Self::Duplicate => "duplicate",
        }
    }
}

impl FromStr for ExistingLatLon {
    type Err = CubeFrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "replace" => Ok(Self::Replace),
            "duplicate" => Ok(Self::Duplicate),
            other => Err(format!(
                "Unknown policy '{}': expected reject, replace or duplicate",
                other
            )
            .into()),
        }
    }
}

/// Configuration for [`add_lat_lon`] and [`add_lat_lon_inplace`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatLonOptions {
    /// Target system; `None` means [`CoordSystem::default_geodetic`]
    pub geodetic: Option<CoordSystem>,
    pub on_existing: ExistingLatLon,
}

impl LatLonOptions {
    /// Default geodetic system, rejecting existing coordinates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_geodetic(mut self, geodetic: CoordSystem) -> Self {
        self.geodetic = Some(geodetic);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, on_existing: ExistingLatLon) -> Self {
        self.on_existing = on_existing;
        self
    }

    /// The geodetic system that will be used.
    #[must_use]
    pub fn geodetic(&self) -> CoordSystem {
        self.geodetic
            .clone()
            .unwrap_or_else(CoordSystem::default_geodetic)
    }
}

/// Returns a copy of `cube` with 2-D `latitude` and `longitude` auxiliary
/// coordinates added. The input is left untouched.
///
/// Grid points PROJ cannot transform (outside the projection domain) get
/// NaN latitude and longitude.
///
/// # Errors
///
/// - [`CubeFrameError::DuplicateCoordinate`] when the existing-coordinate
///   policy forbids the addition
/// - [`CubeFrameError::MissingCoordSystem`] when the cube has no CRS
/// - [`CubeFrameError::CoordinateNotFound`] / [`CubeFrameError::AmbiguousCoordinate`]
///   when there is not exactly one X and one Y dimension coordinate
/// - [`CubeFrameError::InvalidCoordinate`] when a projected axis is not in a
///   length unit
/// - PROJ errors when the transform cannot be built or no point transforms
pub fn add_lat_lon(cube: &Cube, options: &LatLonOptions) -> Result<Cube> {
    let mut copy = cube.clone();
    attach_lat_lon(&mut copy, &options.geodetic(), options.on_existing)?;
    Ok(copy)
}

/// Adds 2-D `latitude` and `longitude` auxiliary coordinates to `cube`
/// itself. On error the cube is unchanged.
///
/// # Errors
///
/// Same as [`add_lat_lon`].
pub fn add_lat_lon_inplace(cube: &mut Cube, options: &LatLonOptions) -> Result<()> {
    attach_lat_lon(cube, &options.geodetic(), options.on_existing)
}

/// Transforms `(x, y)` points from `src` into `dst` in place.
///
/// Geographic systems take and give `(longitude, latitude)` in degrees;
/// projected systems use metres. Points that fail to transform become
/// `(NaN, NaN)`.
///
/// # Errors
///
/// Returns PROJ errors if either definition is rejected, or the last point
/// error when no point could be transformed at all.
pub fn transform_points(
    src: &CoordSystem,
    dst: &CoordSystem,
    points: &mut [(f64, f64)],
) -> Result<()> {
    let transform = Proj::new_known_crs(&src.to_proj_string(), &dst.to_proj_string(), None)?;

    let mut transformed = 0usize;
    let mut last_error = None;
    for point in points.iter_mut() {
        *point = match transform.convert(*point) {
            Ok((x, y)) if x.is_finite() && y.is_finite() => {
                transformed += 1;
                (x, y)
            }
            Ok(_) => (f64::NAN, f64::NAN),
            Err(e) => {
                last_error = Some(e);
                (f64::NAN, f64::NAN)
            }
        };
    }

    match last_error {
        Some(e) if transformed == 0 => Err(e.into()),
        _ => Ok(()),
    }
}

fn attach_lat_lon(cube: &mut Cube, geodetic: &CoordSystem, policy: ExistingLatLon) -> Result<()> {
    check_existing(cube, policy)?;

    let native = cube
        .coord_system()
        .cloned()
        .ok_or(CubeFrameError::MissingCoordSystem)?;

    let (x, x_dim) = cube.dim_coord_for_axis(AxisRole::X)?;
    let (y, y_dim) = cube.dim_coord_for_axis(AxisRole::Y)?;
    let (nx, ny) = (x.len(), y.len());

    let (x_scale, y_scale) = if native.is_angular() {
        (1.0, 1.0)
    } else {
        (metres_per_unit(x.meta())?, metres_per_unit(y.meta())?)
    };

    // Row-major meshgrid: rows follow Y, columns follow X.
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(nx * ny);
    for &yv in y.points() {
        for &xv in x.points() {
            points.push((xv * x_scale, yv * y_scale));
        }
    }

    transform_points(&native, geodetic, &mut points)?;

    let lons = Array2::from_shape_vec((ny, nx), points.iter().map(|p| p.0).collect())?;
    let lats = Array2::from_shape_vec((ny, nx), points.iter().map(|p| p.1).collect())?;

    let lat_coord = AuxCoord::new(derived_meta(LATITUDE), lats.into_dyn())
        .with_coord_system(geodetic.clone());
    let lon_coord = AuxCoord::new(derived_meta(LONGITUDE), lons.into_dyn())
        .with_coord_system(geodetic.clone());

    if policy == ExistingLatLon::Replace {
        cube.remove_aux_coords_named(LATITUDE);
        cube.remove_aux_coords_named(LONGITUDE);
    }

    cube.add_aux_coord(lat_coord, &[y_dim, x_dim])?;
    cube.add_aux_coord(lon_coord, &[y_dim, x_dim])?;

    Ok(())
}

/// Scale from a projected axis unit to metres. Unitless axes are metres.
fn metres_per_unit(meta: &CoordMeta) -> Result<f64> {
    let units = meta.units.as_deref().unwrap_or("m").trim().to_lowercase();
    match units.as_str() {
        "m" | "metre" | "metres" | "meter" | "meters" | "1" => Ok(1.0),
        "km" | "kilometre" | "kilometres" | "kilometer" | "kilometers" => Ok(1_000.0),
        other => Err(CubeFrameError::InvalidCoordinate {
            name: meta.name().to_string(),
            message: format!("projected axis units '{}' are not a length", other),
        }),
    }
}

fn check_existing(cube: &Cube, policy: ExistingLatLon) -> Result<()> {
    for name in [LATITUDE, LONGITUDE] {
        let clash = match policy {
            ExistingLatLon::Reject => {
                cube.has_dim_coord_named(name) || cube.has_aux_coord_named(name)
            }
            ExistingLatLon::Replace => cube.has_dim_coord_named(name),
            ExistingLatLon::Duplicate => false,
        };
        if clash {
            return Err(CubeFrameError::DuplicateCoordinate {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn derived_meta(name: &str) -> CoordMeta {
    CoordMeta::standard(name)
        .with_long_name(name)
        .with_units("degrees")
}
