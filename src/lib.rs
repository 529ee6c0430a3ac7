//! cube_frame: latitude/longitude derivation and tabular flattening for climate cubes
//!
//! A small Rust library for working with gridded climate data loaded from
//! NetCDF files. It provides two operations on top of a labelled-array cube
//! model:
//!
//! - **Coordinate augmentation**: [`latlon::add_lat_lon`] transforms every grid
//!   point from the cube's own coordinate system (rotated pole, transverse
//!   Mercator, Lambert conformal, ...) into geodetic latitude/longitude with
//!   PROJ and attaches the results as 2-D auxiliary coordinates.
//! - **Tabular flattening**: [`dataframe::cube_to_dataframe`] turns a cube into
//!   a polars `DataFrame` with one row per distinct coordinate combination.
//!
//! ## Module Organization
//!
//! - [`cube`]: the cube model
//! - [`coords`]: dimension and auxiliary coordinates
//! - [`coord_system`]: coordinate reference systems and their PROJ form
//! - [`latlon`]: latitude/longitude derivation
//! - [`dataframe`]: cube to dataframe conversion
//! - [`netcdf_io`]: loading cubes from and saving cubes to NetCDF
//! - [`metadata`]: cube summaries
//! - [`time_units`]: CF time coordinate decoding
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cube_frame::prelude::*;
//!
//! let cube = load_cube("pr_rcp85_land-rcm_eur_12km_01_day_20201201-20301130.nc", None).unwrap();
//! let augmented = add_lat_lon(&cube, &LatLonOptions::new()).unwrap();
//! let df = cube_to_dataframe(&augmented).unwrap();
//! println!("{}", df.head(Some(5)));
//! ```

// Core modules
pub mod coord_system;
pub mod coords;
pub mod cube;
pub mod dataframe;
pub mod errors;
pub mod latlon;
pub mod metadata;
pub mod netcdf_io;
pub mod time_units;

// Direct re-exports for the public API
pub use coord_system::*;
pub use coords::*;
pub use cube::*;
pub use dataframe::*;
pub use errors::*;
pub use latlon::*;
pub use metadata::*;
pub use netcdf_io::*;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::coord_system::{CoordSystem, Ellipsoid};
    pub use crate::coords::{AuxCoord, AxisRole, CoordMeta, DimCoord};
    pub use crate::cube::Cube;
    pub use crate::dataframe::{cube_to_dataframe, drop_duplicate_rows};
    pub use crate::errors::{CubeFrameError, Result};
    pub use crate::latlon::{add_lat_lon, add_lat_lon_inplace, ExistingLatLon, LatLonOptions};
    pub use crate::netcdf_io::{load_cube, save_cube, NetCDFWriter};
}
