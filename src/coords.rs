//! Dimension and auxiliary coordinates
//!
//! A [`DimCoord`] labels one data dimension with strictly monotonic points and
//! an optional axis role. An [`AuxCoord`] is an arbitrary-rank field bound to
//! any subset of the cube dimensions (for example a 2-D latitude field over a
//! projected grid).

use crate::coord_system::CoordSystem;
use crate::errors::{CubeFrameError, Result};
use crate::time_units::is_time_reference;
use ndarray::{Array1, ArrayD};
use std::fmt;

/// Axis role a coordinate plays in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    X,
    Y,
    Z,
    T,
}

impl AxisRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::T => "T",
        }
    }

    /// Parses a CF `axis` attribute value.
    #[must_use]
    pub fn from_cf(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            "Z" => Some(Self::Z),
            "T" => Some(Self::T),
            _ => None,
        }
    }
}

impl fmt::Display for AxisRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming and unit metadata shared by all coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordMeta {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: Option<String>,
    pub calendar: Option<String>,
}

impl CoordMeta {
    /// Metadata with only a standard name set.
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            standard_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Metadata with only a long name set.
    pub fn long(name: impl Into<String>) -> Self {
        Self {
            long_name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    #[must_use]
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = Some(var_name.into());
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: impl Into<String>) -> Self {
        self.calendar = Some(calendar.into());
        self
    }

    /// Standard name, else long name, else var name, else `"unknown"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }

    /// Name used for table columns and NetCDF variables: the var name if set,
    /// otherwise [`CoordMeta::name`].
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.var_name.as_deref().unwrap_or_else(|| self.name())
    }

    /// Whether any of the three names equals `name`.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        [&self.standard_name, &self.long_name, &self.var_name]
            .iter()
            .any(|n| n.as_deref() == Some(name))
    }
}

/// Guesses the axis role of a coordinate from its name and units.
#[must_use]
pub fn guess_axis(meta: &CoordMeta) -> Option<AxisRole> {
    let name = meta.name().to_lowercase();
    let units = meta.units.as_deref().unwrap_or("").trim().to_lowercase();

    match name.as_str() {
        "longitude" | "grid_longitude" | "projection_x_coordinate" => return Some(AxisRole::X),
        "latitude" | "grid_latitude" | "projection_y_coordinate" => return Some(AxisRole::Y),
        "altitude" | "height" | "depth" | "air_pressure" | "model_level_number"
        | "atmosphere_hybrid_height_coordinate" => return Some(AxisRole::Z),
        "time" | "forecast_reference_time" => return Some(AxisRole::T),
        _ => {}
    }

    if matches!(
        units.as_str(),
        "pa" | "hpa" | "kpa" | "mbar" | "millibar" | "bar"
    ) {
        Some(AxisRole::Z)
    } else if is_time_reference(&units) {
        Some(AxisRole::T)
    } else {
        None
    }
}

/// Coordinate that labels a single data dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimCoord {
    meta: CoordMeta,
    points: Array1<f64>,
    axis: Option<AxisRole>,
}

impl DimCoord {
    /// Creates a dimension coordinate, guessing its axis from the metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CubeFrameError::InvalidCoordinate`] if `points` is empty or
    /// not strictly monotonic.
    pub fn new(meta: CoordMeta, points: Array1<f64>) -> Result<Self> {
        let invalid = |message: &str| CubeFrameError::InvalidCoordinate {
            name: meta.name().to_string(),
            message: message.to_string(),
        };

        if points.is_empty() {
            return Err(invalid("dimension coordinates need at least one point"));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(invalid("points must be finite"));
        }

        let diffs: Vec<f64> = points.windows(2).into_iter().map(|w| w[1] - w[0]).collect();
        let increasing = diffs.iter().all(|&d| d > 0.0);
        let decreasing = diffs.iter().all(|&d| d < 0.0);
        if !(increasing || decreasing) {
            return Err(invalid("points must be strictly monotonic"));
        }

        let axis = guess_axis(&meta);
        Ok(Self { meta, points, axis })
    }

    /// Convenience constructor from a plain vector of points.
    ///
    /// # Errors
    ///
    /// Same as [`DimCoord::new`].
    pub fn from_vec(meta: CoordMeta, points: Vec<f64>) -> Result<Self> {
        Self::new(meta, Array1::from(points))
    }

    /// Overrides the guessed axis role.
    #[must_use]
    pub fn with_axis(mut self, axis: AxisRole) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub fn meta(&self) -> &CoordMeta {
        &self.meta
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    #[must_use]
    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    #[must_use]
    pub fn axis(&self) -> Option<AxisRole> {
        self.axis
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Coordinate field bound to any subset of the cube dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoord {
    meta: CoordMeta,
    points: ArrayD<f64>,
    coord_system: Option<CoordSystem>,
}

impl AuxCoord {
    #[must_use]
    pub fn new(meta: CoordMeta, points: ArrayD<f64>) -> Self {
        Self {
            meta,
            points,
            coord_system: None,
        }
    }

    #[must_use]
    pub fn with_coord_system(mut self, coord_system: CoordSystem) -> Self {
        self.coord_system = Some(coord_system);
        self
    }

    #[must_use]
    pub fn meta(&self) -> &CoordMeta {
        &self.meta
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    #[must_use]
    pub fn points(&self) -> &ArrayD<f64> {
        &self.points
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.points.shape()
    }

    #[must_use]
    pub fn coord_system(&self) -> Option<&CoordSystem> {
        self.coord_system.as_ref()
    }
}
