//! Centralized error handling for cube_frame
//!
//! Failures from the underlying NetCDF, PROJ, polars and ndarray libraries are
//! wrapped unchanged; the remaining variants describe problems with the cube
//! model itself.

use crate::coords::AxisRole;
use std::fmt;

/// Main error type for cube_frame operations
#[derive(Debug)]
pub enum CubeFrameError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// PROJ could not build a transform between two coordinate systems
    ProjCreateError(proj::ProjCreateError),

    /// PROJ failed while transforming points
    ProjError(proj::ProjError),

    /// Dataframe construction or manipulation errors
    PolarsError(polars::prelude::PolarsError),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// A file holds zero or several data variables when exactly one was expected
    NoUniqueCube { candidates: Vec<String> },

    /// No dimension coordinate carries the requested axis
    CoordinateNotFound { axis: AxisRole },

    /// More than one dimension coordinate carries the requested axis
    AmbiguousCoordinate { axis: AxisRole, names: Vec<String> },

    /// The cube has no coordinate reference system attached
    MissingCoordSystem,

    /// A coordinate with this name is already present on the cube
    DuplicateCoordinate { name: String },

    /// A coordinate's points are unusable (empty, non-monotonic, wrong rank)
    InvalidCoordinate { name: String, message: String },

    /// A coordinate does not fit the cube dimensions it is bound to
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// CF grid mapping that has no coordinate system counterpart
    UnsupportedGridMapping { name: String },

    /// Unparseable CF time units string
    InvalidTimeUnits { units: String },

    /// Generic error for anything else
    Generic(String),
}

impl fmt::Display for CubeFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeFrameError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            CubeFrameError::ProjCreateError(e) => write!(f, "Projection setup error: {}", e),
            CubeFrameError::ProjError(e) => write!(f, "Projection error: {}", e),
            CubeFrameError::PolarsError(e) => write!(f, "Dataframe error: {}", e),
            CubeFrameError::IoError(e) => write!(f, "I/O error: {}", e),
            CubeFrameError::ArrayError(e) => write!(f, "Array error: {}", e),
            CubeFrameError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            CubeFrameError::NoUniqueCube { candidates } => write!(
                f,
                "Expected exactly one data variable, found {}: [{}]",
                candidates.len(),
                candidates.join(", ")
            ),
            CubeFrameError::CoordinateNotFound { axis } => {
                write!(f, "No dimension coordinate found for axis {}", axis)
            }
            CubeFrameError::AmbiguousCoordinate { axis, names } => write!(
                f,
                "Several dimension coordinates claim axis {}: [{}]",
                axis,
                names.join(", ")
            ),
            CubeFrameError::MissingCoordSystem => {
                write!(f, "Cube has no coordinate system attached")
            }
            CubeFrameError::DuplicateCoordinate { name } => {
                write!(f, "Coordinate '{}' already exists on the cube", name)
            }
            CubeFrameError::InvalidCoordinate { name, message } => {
                write!(f, "Invalid coordinate '{}': {}", name, message)
            }
            CubeFrameError::ShapeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Coordinate '{}' has shape {:?}, cube dimensions require {:?}",
                name, found, expected
            ),
            CubeFrameError::UnsupportedGridMapping { name } => {
                write!(f, "Unsupported grid mapping '{}'", name)
            }
            CubeFrameError::InvalidTimeUnits { units } => {
                write!(f, "Cannot interpret time units '{}'", units)
            }
            CubeFrameError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CubeFrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CubeFrameError::NetCDFError(e) => Some(e),
            CubeFrameError::ProjCreateError(e) => Some(e),
            CubeFrameError::ProjError(e) => Some(e),
            CubeFrameError::PolarsError(e) => Some(e),
            CubeFrameError::IoError(e) => Some(e),
            CubeFrameError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for CubeFrameError {
    fn from(error: netcdf::Error) -> Self {
        CubeFrameError::NetCDFError(error)
    }
}

impl From<proj::ProjCreateError> for CubeFrameError {
    fn from(error: proj::ProjCreateError) -> Self {
        CubeFrameError::ProjCreateError(error)
    }
}

impl From<proj::ProjError> for CubeFrameError {
    fn from(error: proj::ProjError) -> Self {
        CubeFrameError::ProjError(error)
    }
}

impl From<polars::prelude::PolarsError> for CubeFrameError {
    fn from(error: polars::prelude::PolarsError) -> Self {
        CubeFrameError::PolarsError(error)
    }
}

impl From<std::io::Error> for CubeFrameError {
    fn from(error: std::io::Error) -> Self {
        CubeFrameError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for CubeFrameError {
    fn from(error: ndarray::ShapeError) -> Self {
        CubeFrameError::ArrayError(error)
    }
}

impl From<String> for CubeFrameError {
    fn from(error: String) -> Self {
        CubeFrameError::Generic(error)
    }
}

/// Result type alias for cube_frame operations
pub type Result<T> = std::result::Result<T, CubeFrameError>;
