//! Coordinate reference systems attached to cubes and coordinates
//!
//! A [`CoordSystem`] mirrors the CF-convention grid mappings found in climate
//! NetCDF files. Each variant renders to a PROJ definition string, which is the
//! form handed to `proj` when points have to be transformed.

use crate::errors::{CubeFrameError, Result};
use std::collections::HashMap;
use std::fmt;

/// Earth radius used by Met Office PP files, in metres.
pub const PP_EARTH_RADIUS: f64 = 6_371_229.0;

/// Spherical earth radius assumed for `latitude_longitude` grid mappings that
/// carry no ellipsoid parameters, in metres.
pub const DEFAULT_SPHERICAL_EARTH_RADIUS: f64 = 6_367_470.0;

/// Reference ellipsoid (or sphere when both axes are equal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
}

impl Ellipsoid {
    /// A sphere of the given radius in metres.
    #[must_use]
    pub const fn sphere(radius: f64) -> Self {
        Self {
            semi_major_axis: radius,
            semi_minor_axis: radius,
        }
    }

    /// An ellipsoid defined by its semi-major axis and inverse flattening.
    /// An inverse flattening of zero describes a sphere.
    #[must_use]
    pub fn from_inverse_flattening(semi_major_axis: f64, inverse_flattening: f64) -> Self {
        if inverse_flattening == 0.0 {
            return Self::sphere(semi_major_axis);
        }
        Self {
            semi_major_axis,
            semi_minor_axis: semi_major_axis * (1.0 - 1.0 / inverse_flattening),
        }
    }

    /// The WGS84 ellipsoid.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::from_inverse_flattening(6_378_137.0, 298.257_223_563)
    }

    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.semi_major_axis == self.semi_minor_axis
    }

    #[must_use]
    pub fn inverse_flattening(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            self.semi_major_axis / (self.semi_major_axis - self.semi_minor_axis)
        }
    }

    fn proj_params(&self) -> String {
        if self.is_sphere() {
            format!("+R={}", self.semi_major_axis)
        } else {
            format!("+a={} +b={}", self.semi_major_axis, self.semi_minor_axis)
        }
    }

    /// Reads the CF ellipsoid attributes of a grid mapping, if any are present.
    fn from_cf(params: &HashMap<String, Vec<f64>>) -> Option<Self> {
        if let Some(radius) = first(params, "earth_radius") {
            return Some(Self::sphere(radius));
        }
        let semi_major = first(params, "semi_major_axis")?;
        if let Some(semi_minor) = first(params, "semi_minor_axis") {
            Some(Self {
                semi_major_axis: semi_major,
                semi_minor_axis: semi_minor,
            })
        } else if let Some(inv_f) = first(params, "inverse_flattening") {
            Some(Self::from_inverse_flattening(semi_major, inv_f))
        } else {
            Some(Self::sphere(semi_major))
        }
    }

    fn to_cf(self, out: &mut Vec<(String, Vec<f64>)>) {
        if self.is_sphere() {
            out.push(("earth_radius".to_string(), vec![self.semi_major_axis]));
        } else {
            out.push(("semi_major_axis".to_string(), vec![self.semi_major_axis]));
            out.push(("semi_minor_axis".to_string(), vec![self.semi_minor_axis]));
        }
    }
}

fn ellipsoid_params(ellipsoid: Option<&Ellipsoid>) -> String {
    match ellipsoid {
        Some(e) => e.proj_params(),
        None => "+ellps=WGS84".to_string(),
    }
}

/// Coordinate reference system of a cube's horizontal grid.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordSystem {
    /// Geodetic latitude/longitude in degrees
    Geog { ellipsoid: Ellipsoid },

    /// Latitude/longitude on a grid whose north pole has been moved
    RotatedGeog {
        grid_north_pole_latitude: f64,
        grid_north_pole_longitude: f64,
        north_pole_grid_longitude: f64,
        ellipsoid: Option<Ellipsoid>,
    },

    TransverseMercator {
        latitude_of_projection_origin: f64,
        longitude_of_central_meridian: f64,
        false_easting: f64,
        false_northing: f64,
        scale_factor_at_central_meridian: f64,
        ellipsoid: Option<Ellipsoid>,
    },

    /// Lambert conformal conic with one or two standard parallels
    LambertConformal {
        central_lat: f64,
        central_lon: f64,
        false_easting: f64,
        false_northing: f64,
        secant_latitudes: Vec<f64>,
        ellipsoid: Option<Ellipsoid>,
    },

    Mercator {
        longitude_of_projection_origin: f64,
        standard_parallel: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Option<Ellipsoid>,
    },

    /// Stereographic, including the polar case
    Stereographic {
        central_lat: f64,
        central_lon: f64,
        false_easting: f64,
        false_northing: f64,
        true_scale_lat: Option<f64>,
        scale_factor_at_projection_origin: Option<f64>,
        ellipsoid: Option<Ellipsoid>,
    },

    LambertAzimuthalEqualArea {
        latitude_of_projection_origin: f64,
        longitude_of_projection_origin: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Option<Ellipsoid>,
    },
}

impl CoordSystem {
    /// Geodetic system on a sphere with the PP earth radius. This is the
    /// target used when deriving latitude/longitude without an explicit one.
    #[must_use]
    pub fn default_geodetic() -> Self {
        Self::Geog {
            ellipsoid: Ellipsoid::sphere(PP_EARTH_RADIUS),
        }
    }

    /// Geodetic system on a sphere of the given radius.
    #[must_use]
    pub fn geog_sphere(radius: f64) -> Self {
        Self::Geog {
            ellipsoid: Ellipsoid::sphere(radius),
        }
    }

    /// Rotated-pole system on a sphere of the given radius.
    #[must_use]
    pub fn rotated_pole(pole_lat: f64, pole_lon: f64, radius: f64) -> Self {
        Self::RotatedGeog {
            grid_north_pole_latitude: pole_lat,
            grid_north_pole_longitude: pole_lon,
            north_pole_grid_longitude: 0.0,
            ellipsoid: Some(Ellipsoid::sphere(radius)),
        }
    }

    /// CF `grid_mapping_name` of this system.
    #[must_use]
    pub const fn grid_mapping_name(&self) -> &'static str {
        match self {
            Self::Geog { .. } => "latitude_longitude",
            Self::RotatedGeog { .. } => "rotated_latitude_longitude",
            Self::TransverseMercator { .. } => "transverse_mercator",
            Self::LambertConformal { .. } => "lambert_conformal_conic",
            Self::Mercator { .. } => "mercator",
            Self::Stereographic {
                true_scale_lat: Some(_),
                ..
            } => "polar_stereographic",
            Self::Stereographic { .. } => "stereographic",
            Self::LambertAzimuthalEqualArea { .. } => "lambert_azimuthal_equal_area",
        }
    }

    /// Whether grid coordinates in this system are angles rather than metres.
    #[must_use]
    pub const fn is_angular(&self) -> bool {
        matches!(self, Self::Geog { .. } | Self::RotatedGeog { .. })
    }

    /// Renders the system as a PROJ CRS definition.
    #[must_use]
    pub fn to_proj_string(&self) -> String {
        match self {
            Self::Geog { ellipsoid } => {
                format!("+proj=longlat {} +no_defs +type=crs", ellipsoid.proj_params())
            }
            Self::RotatedGeog {
                grid_north_pole_latitude,
                grid_north_pole_longitude,
                north_pole_grid_longitude,
                ellipsoid,
            } => format!(
                "+proj=ob_tran +o_proj=longlat +o_lon_p={} +o_lat_p={} +lon_0={} {} +no_defs +type=crs",
                north_pole_grid_longitude,
                grid_north_pole_latitude,
                wrap_longitude(180.0 + grid_north_pole_longitude),
                ellipsoid_params(ellipsoid.as_ref())
            ),
            Self::TransverseMercator {
                latitude_of_projection_origin,
                longitude_of_central_meridian,
                false_easting,
                false_northing,
                scale_factor_at_central_meridian,
                ellipsoid,
            } => format!(
                "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} {} +units=m +no_defs +type=crs",
                latitude_of_projection_origin,
                longitude_of_central_meridian,
                scale_factor_at_central_meridian,
                false_easting,
                false_northing,
                ellipsoid_params(ellipsoid.as_ref())
            ),
            Self::LambertConformal {
                central_lat,
                central_lon,
                false_easting,
                false_northing,
                secant_latitudes,
                ellipsoid,
            } => {
                let lat_1 = secant_latitudes.first().copied().unwrap_or(*central_lat);
                let lat_2 = secant_latitudes.get(1).copied().unwrap_or(lat_1);
                format!(
                    "+proj=lcc +lat_0={} +lon_0={} +lat_1={} +lat_2={} +x_0={} +y_0={} {} +units=m +no_defs +type=crs",
                    central_lat,
                    central_lon,
                    lat_1,
                    lat_2,
                    false_easting,
                    false_northing,
                    ellipsoid_params(ellipsoid.as_ref())
                )
            }
            Self::Mercator {
                longitude_of_projection_origin,
                standard_parallel,
                false_easting,
                false_northing,
                ellipsoid,
            } => format!(
                "+proj=merc +lon_0={} +lat_ts={} +x_0={} +y_0={} {} +units=m +no_defs +type=crs",
                longitude_of_projection_origin,
                standard_parallel,
                false_easting,
                false_northing,
                ellipsoid_params(ellipsoid.as_ref())
            ),
            Self::Stereographic {
                central_lat,
                central_lon,
                false_easting,
                false_northing,
                true_scale_lat,
                scale_factor_at_projection_origin,
                ellipsoid,
            } => {
                let mut def = format!(
                    "+proj=stere +lat_0={} +lon_0={} +x_0={} +y_0={}",
                    central_lat, central_lon, false_easting, false_northing
                );
                if let Some(lat_ts) = true_scale_lat {
                    def.push_str(&format!(" +lat_ts={}", lat_ts));
                } else if let Some(k) = scale_factor_at_projection_origin {
                    def.push_str(&format!(" +k_0={}", k));
                }
                format!(
                    "{} {} +units=m +no_defs +type=crs",
                    def,
                    ellipsoid_params(ellipsoid.as_ref())
                )
            }
            Self::LambertAzimuthalEqualArea {
                latitude_of_projection_origin,
                longitude_of_projection_origin,
                false_easting,
                false_northing,
                ellipsoid,
            } => format!(
                "+proj=laea +lat_0={} +lon_0={} +x_0={} +y_0={} {} +units=m +no_defs +type=crs",
                latitude_of_projection_origin,
                longitude_of_projection_origin,
                false_easting,
                false_northing,
                ellipsoid_params(ellipsoid.as_ref())
            ),
        }
    }

    /// Builds a coordinate system from a CF grid mapping.
    ///
    /// `params` holds the numeric attributes of the grid mapping variable.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown grid mapping names or when a required
    /// attribute is missing.
    pub fn from_cf_grid_mapping(
        grid_mapping_name: &str,
        params: &HashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let ellipsoid = Ellipsoid::from_cf(params);
        let false_easting = first(params, "false_easting").unwrap_or(0.0);
        let false_northing = first(params, "false_northing").unwrap_or(0.0);

        let cs = match grid_mapping_name {
            "latitude_longitude" => Self::Geog {
                ellipsoid: ellipsoid
                    .unwrap_or_else(|| Ellipsoid::sphere(DEFAULT_SPHERICAL_EARTH_RADIUS)),
            },
            "rotated_latitude_longitude" => Self::RotatedGeog {
                grid_north_pole_latitude: required(
                    params,
                    grid_mapping_name,
                    "grid_north_pole_latitude",
                )?,
                grid_north_pole_longitude: required(
                    params,
                    grid_mapping_name,
                    "grid_north_pole_longitude",
                )?,
                north_pole_grid_longitude: first(params, "north_pole_grid_longitude")
                    .unwrap_or(0.0),
                ellipsoid,
            },
            "transverse_mercator" => Self::TransverseMercator {
                latitude_of_projection_origin: required(
                    params,
                    grid_mapping_name,
                    "latitude_of_projection_origin",
                )?,
                longitude_of_central_meridian: required(
                    params,
                    grid_mapping_name,
                    "longitude_of_central_meridian",
                )?,
                false_easting,
                false_northing,
                scale_factor_at_central_meridian: first(
                    params,
                    "scale_factor_at_central_meridian",
                )
                .unwrap_or(1.0),
                ellipsoid,
            },
            "lambert_conformal_conic" => Self::LambertConformal {
                central_lat: required(params, grid_mapping_name, "latitude_of_projection_origin")?,
                central_lon: required(params, grid_mapping_name, "longitude_of_central_meridian")?,
                false_easting,
                false_northing,
                secant_latitudes: params
                    .get("standard_parallel")
                    .cloned()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| missing(grid_mapping_name, "standard_parallel"))?,
                ellipsoid,
            },
            "mercator" => Self::Mercator {
                longitude_of_projection_origin: first(params, "longitude_of_projection_origin")
                    .unwrap_or(0.0),
                standard_parallel: first(params, "standard_parallel").unwrap_or(0.0),
                false_easting,
                false_northing,
                ellipsoid,
            },
            "stereographic" => Self::Stereographic {
                central_lat: required(params, grid_mapping_name, "latitude_of_projection_origin")?,
                central_lon: required(params, grid_mapping_name, "longitude_of_projection_origin")?,
                false_easting,
                false_northing,
                true_scale_lat: None,
                scale_factor_at_projection_origin: first(
                    params,
                    "scale_factor_at_projection_origin",
                ),
                ellipsoid,
            },
            "polar_stereographic" => Self::Stereographic {
                central_lat: required(params, grid_mapping_name, "latitude_of_projection_origin")?,
                central_lon: required(
                    params,
                    grid_mapping_name,
                    "straight_vertical_longitude_from_pole",
                )?,
                false_easting,
                false_northing,
                true_scale_lat: first(params, "standard_parallel"),
                scale_factor_at_projection_origin: first(
                    params,
                    "scale_factor_at_projection_origin",
                ),
                ellipsoid,
            },
            "lambert_azimuthal_equal_area" => Self::LambertAzimuthalEqualArea {
                latitude_of_projection_origin: required(
                    params,
                    grid_mapping_name,
                    "latitude_of_projection_origin",
                )?,
                longitude_of_projection_origin: required(
                    params,
                    grid_mapping_name,
                    "longitude_of_projection_origin",
                )?,
                false_easting,
                false_northing,
                ellipsoid,
            },
            other => {
                return Err(CubeFrameError::UnsupportedGridMapping {
                    name: other.to_string(),
                })
            }
        };

        Ok(cs)
    }

    /// Numeric CF grid mapping attributes describing this system, used when
    /// writing a grid mapping variable.
    #[must_use]
    pub fn to_cf_params(&self) -> Vec<(String, Vec<f64>)> {
        let mut out = Vec::new();
        let ellipsoid = match self {
            Self::Geog { ellipsoid } => Some(*ellipsoid),
            Self::RotatedGeog {
                grid_north_pole_latitude,
                grid_north_pole_longitude,
                north_pole_grid_longitude,
                ellipsoid,
            } => {
                out.push(param("grid_north_pole_latitude", *grid_north_pole_latitude));
                out.push(param("grid_north_pole_longitude", *grid_north_pole_longitude));
                out.push(param("north_pole_grid_longitude", *north_pole_grid_longitude));
                *ellipsoid
            }
            Self::TransverseMercator {
                latitude_of_projection_origin,
                longitude_of_central_meridian,
                false_easting,
                false_northing,
                scale_factor_at_central_meridian,
                ellipsoid,
            } => {
                out.push(param("latitude_of_projection_origin", *latitude_of_projection_origin));
                out.push(param("longitude_of_central_meridian", *longitude_of_central_meridian));
                out.push(param("false_easting", *false_easting));
                out.push(param("false_northing", *false_northing));
                out.push(param(
                    "scale_factor_at_central_meridian",
                    *scale_factor_at_central_meridian,
                ));
                *ellipsoid
            }
            Self::LambertConformal {
                central_lat,
                central_lon,
                false_easting,
                false_northing,
                secant_latitudes,
                ellipsoid,
            } => {
                out.push(param("latitude_of_projection_origin", *central_lat));
                out.push(param("longitude_of_central_meridian", *central_lon));
                out.push(param("false_easting", *false_easting));
                out.push(param("false_northing", *false_northing));
                out.push(("standard_parallel".to_string(), secant_latitudes.clone()));
                *ellipsoid
            }
            Self::Mercator {
                longitude_of_projection_origin,
                standard_parallel,
                false_easting,
                false_northing,
                ellipsoid,
            } => {
                out.push(param("longitude_of_projection_origin", *longitude_of_projection_origin));
                out.push(param("standard_parallel", *standard_parallel));
                out.push(param("false_easting", *false_easting));
                out.push(param("false_northing", *false_northing));
                *ellipsoid
            }
            Self::Stereographic {
                central_lat,
                central_lon,
                false_easting,
                false_northing,
                true_scale_lat,
                scale_factor_at_projection_origin,
                ellipsoid,
            } => {
                out.push(param("latitude_of_projection_origin", *central_lat));
                if let Some(lat_ts) = true_scale_lat {
                    out.push(param("straight_vertical_longitude_from_pole", *central_lon));
                    out.push(param("standard_parallel", *lat_ts));
                } else {
                    out.push(param("longitude_of_projection_origin", *central_lon));
                }
                out.push(param("false_easting", *false_easting));
                out.push(param("false_northing", *false_northing));
                if let Some(k) = scale_factor_at_projection_origin {
                    out.push(param("scale_factor_at_projection_origin", *k));
                }
                *ellipsoid
            }
            Self::LambertAzimuthalEqualArea {
                latitude_of_projection_origin,
                longitude_of_projection_origin,
                false_easting,
                false_northing,
                ellipsoid,
            } => {
                out.push(param("latitude_of_projection_origin", *latitude_of_projection_origin));
                out.push(param("longitude_of_projection_origin", *longitude_of_projection_origin));
                out.push(param("false_easting", *false_easting));
                out.push(param("false_northing", *false_northing));
                *ellipsoid
            }
        };
        if let Some(e) = ellipsoid {
            e.to_cf(&mut out);
        }
        out
    }
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geog { ellipsoid } if ellipsoid.is_sphere() => {
                write!(f, "GeogCS({})", ellipsoid.semi_major_axis)
            }
            Self::Geog { ellipsoid } => write!(
                f,
                "GeogCS(semi_major_axis={}, semi_minor_axis={})",
                ellipsoid.semi_major_axis, ellipsoid.semi_minor_axis
            ),
            Self::RotatedGeog {
                grid_north_pole_latitude,
                grid_north_pole_longitude,
                ..
            } => write!(
                f,
                "RotatedGeogCS({}, {})",
                grid_north_pole_latitude, grid_north_pole_longitude
            ),
            other => write!(f, "{}({})", other.grid_mapping_name(), other.to_proj_string()),
        }
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

fn first(params: &HashMap<String, Vec<f64>>, name: &str) -> Option<f64> {
    params.get(name).and_then(|v| v.first().copied())
}

fn missing(grid_mapping_name: &str, attribute: &str) -> CubeFrameError {
    format!(
        "Grid mapping '{}' is missing required attribute '{}'",
        grid_mapping_name, attribute
    )
    .into()
}

fn required(
    params: &HashMap<String, Vec<f64>>,
    grid_mapping_name: &str,
    attribute: &str,
) -> Result<f64> {
    first(params, attribute).ok_or_else(|| missing(grid_mapping_name, attribute))
}

fn param(name: &str, value: f64) -> (String, Vec<f64>) {
    (name.to_string(), vec![value])
}
