//! The cube: a labelled multi-dimensional array with coordinate metadata
//!
//! Data is held as `ArrayD<f64>` with missing values as NaN. Coordinates are
//! bound to data dimensions by index; the binding rules are enforced when a
//! coordinate is added, so every cube that exists is internally consistent.

use crate::coord_system::CoordSystem;
use crate::coords::{AuxCoord, AxisRole, CoordMeta, DimCoord};
use crate::errors::{CubeFrameError, Result};
use ndarray::ArrayD;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Labelled multi-dimensional array.
///
/// `Clone` produces an independent deep copy, which is how callers get a
/// cube they can modify without touching the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    meta: CoordMeta,
    data: ArrayD<f64>,
    dim_coords: Vec<(DimCoord, usize)>,
    aux_coords: Vec<(AuxCoord, Vec<usize>)>,
    coord_system: Option<CoordSystem>,
    attributes: HashMap<String, JsonValue>,
}

impl Cube {
    /// Creates a cube without coordinates.
    #[must_use]
    pub fn new(meta: CoordMeta, data: ArrayD<f64>) -> Self {
        Self {
            meta,
            data,
            dim_coords: Vec::new(),
            aux_coords: Vec::new(),
            coord_system: None,
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_coord_system(mut self, coord_system: CoordSystem) -> Self {
        self.coord_system = Some(coord_system);
        self
    }

    pub fn set_coord_system(&mut self, coord_system: Option<CoordSystem>) {
        self.coord_system = coord_system;
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
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, JsonValue> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut HashMap<String, JsonValue> {
        &mut self.attributes
    }

    /// Coordinate reference system of the horizontal grid, if one is attached.
    #[must_use]
    pub fn coord_system(&self) -> Option<&CoordSystem> {
        self.coord_system.as_ref()
    }

    /// Binds a dimension coordinate to data dimension `dim`.
    ///
    /// # Errors
    ///
    /// Fails if `dim` is out of range, already has a dimension coordinate, or
    /// the coordinate length differs from the data length along `dim`.
    pub fn add_dim_coord(&mut self, coord: DimCoord, dim: usize) -> Result<()> {
        if dim >= self.ndim() {
            return Err(CubeFrameError::InvalidCoordinate {
                name: coord.name().to_string(),
                message: format!("dimension {} out of range for a {}-d cube", dim, self.ndim()),
            });
        }
        if let Some(existing) = self.dim_coord_for_dim(dim) {
            return Err(CubeFrameError::InvalidCoordinate {
                name: coord.name().to_string(),
                message: format!(
                    "dimension {} is already described by '{}'",
                    dim,
                    existing.name()
                ),
            });
        }
        if coord.len() != self.shape()[dim] {
            return Err(CubeFrameError::ShapeMismatch {
                name: coord.name().to_string(),
                expected: vec![self.shape()[dim]],
                found: vec![coord.len()],
            });
        }

        self.dim_coords.push((coord, dim));
        self.dim_coords.sort_by_key(|(_, d)| *d);
        Ok(())
    }

    /// Binds an auxiliary coordinate to the data dimensions `dims`, in order.
    ///
    /// # Errors
    ///
    /// Fails if `dims` has the wrong length, repeats or overruns a dimension,
    /// or the coordinate shape differs from the data shape along `dims`.
    pub fn add_aux_coord(&mut self, coord: AuxCoord, dims: &[usize]) -> Result<()> {
        let invalid = |message: String| CubeFrameError::InvalidCoordinate {
            name: coord.name().to_string(),
            message,
        };

        if dims.len() != coord.points().ndim() {
            return Err(invalid(format!(
                "{}-d points cannot be bound to {} dimensions",
                coord.points().ndim(),
                dims.len()
            )));
        }
        for (i, &dim) in dims.iter().enumerate() {
            if dim >= self.ndim() {
                return Err(invalid(format!(
                    "dimension {} out of range for a {}-d cube",
                    dim,
                    self.ndim()
                )));
            }
            if dims[..i].contains(&dim) {
                return Err(invalid(format!("dimension {} listed twice", dim)));
            }
        }

        let expected: Vec<usize> = dims.iter().map(|&d| self.shape()[d]).collect();
        if coord.shape() != expected.as_slice() {
            return Err(CubeFrameError::ShapeMismatch {
                name: coord.name().to_string(),
                expected,
                found: coord.shape().to_vec(),
            });
        }

        self.aux_coords.push((coord, dims.to_vec()));
        Ok(())
    }

    /// Dimension coordinates with their data dimension, in dimension order.
    pub fn dim_coords(&self) -> impl Iterator<Item = (&DimCoord, usize)> {
        self.dim_coords.iter().map(|(c, d)| (c, *d))
    }

    /// Auxiliary coordinates with their data dimensions, in insertion order.
    pub fn aux_coords(&self) -> impl Iterator<Item = (&AuxCoord, &[usize])> {
        self.aux_coords.iter().map(|(c, d)| (c, d.as_slice()))
    }

    #[must_use]
    pub fn dim_coord_for_dim(&self, dim: usize) -> Option<&DimCoord> {
        self.dim_coords
            .iter()
            .find(|(_, d)| *d == dim)
            .map(|(c, _)| c)
    }

    /// The unique dimension coordinate carrying `axis`, with its dimension.
    ///
    /// # Errors
    ///
    /// [`CubeFrameError::CoordinateNotFound`] if none carries the axis,
    /// [`CubeFrameError::AmbiguousCoordinate`] if several do.
    pub fn dim_coord_for_axis(&self, axis: AxisRole) -> Result<(&DimCoord, usize)> {
        let matches: Vec<(&DimCoord, usize)> = self
            .dim_coords()
            .filter(|(c, _)| c.axis() == Some(axis))
            .collect();

        match matches.as_slice() {
            [] => Err(CubeFrameError::CoordinateNotFound { axis }),
            [single] => Ok(*single),
            many => Err(CubeFrameError::AmbiguousCoordinate {
                axis,
                names: many.iter().map(|(c, _)| c.name().to_string()).collect(),
            }),
        }
    }

    /// Whether any dimension coordinate has `name` as one of its names.
    #[must_use]
    pub fn has_dim_coord_named(&self, name: &str) -> bool {
        self.dim_coords.iter().any(|(c, _)| c.meta().is_named(name))
    }

    /// Whether any auxiliary coordinate has `name` as one of its names.
    #[must_use]
    pub fn has_aux_coord_named(&self, name: &str) -> bool {
        self.aux_coords.iter().any(|(c, _)| c.meta().is_named(name))
    }

    /// Number of auxiliary coordinates named `name`.
    #[must_use]
    pub fn count_aux_coords_named(&self, name: &str) -> usize {
        self.aux_coords
            .iter()
            .filter(|(c, _)| c.meta().is_named(name))
            .count()
    }

    /// Removes every auxiliary coordinate named `name`, returning how many
    /// were removed.
    pub fn remove_aux_coords_named(&mut self, name: &str) -> usize {
        let before = self.aux_coords.len();
        self.aux_coords.retain(|(c, _)| !c.meta().is_named(name));
        before - self.aux_coords.len()
    }

    /// Auxiliary coordinate named `name`, first match.
    #[must_use]
    pub fn aux_coord(&self, name: &str) -> Option<(&AuxCoord, &[usize])> {
        self.aux_coords()
            .find(|(c, _)| c.meta().is_named(name))
    }

    /// Names of all coordinates, dimension coordinates first.
    #[must_use]
    pub fn coord_names(&self) -> Vec<String> {
        self.dim_coords
            .iter()
            .map(|(c, _)| c.name().to_string())
            .chain(self.aux_coords.iter().map(|(c, _)| c.name().to_string()))
            .collect()
    }
}
