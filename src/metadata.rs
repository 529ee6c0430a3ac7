//! Cube inspection and description
//!
//! [`summarize_cube`] collects the structure of a cube into plain data;
//! [`print_cube_summary`] renders it as a dimension/coordinate table.

use crate::coords::AxisRole;
use crate::cube::Cube;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Structural summary of a cube
#[derive(Debug, Clone)]
pub struct CubeSummary {
    pub name: String,
    pub units: Option<String>,
    pub shape: Vec<usize>,
    pub dimension_names: Vec<String>,
    pub dim_coords: Vec<CoordInfo>,
    pub aux_coords: Vec<CoordInfo>,
    pub coord_system: Option<String>,
    pub attributes: HashMap<String, JsonValue>,
}

/// Information about one coordinate
#[derive(Debug, Clone)]
pub struct CoordInfo {
    pub name: String,
    pub dims: Vec<usize>,
    pub shape: Vec<usize>,
    pub units: Option<String>,
    pub axis: Option<AxisRole>,
}

/// Collects the structure of a cube.
#[must_use]
pub fn summarize_cube(cube: &Cube) -> CubeSummary {
    let dimension_names = (0..cube.ndim())
        .map(|dim| match cube.dim_coord_for_dim(dim) {
            Some(coord) => coord.name().to_string(),
            None => format!("-- dim_{dim}"),
        })
        .collect();

    let dim_coords = cube
        .dim_coords()
        .map(|(coord, dim)| CoordInfo {
            name: coord.name().to_string(),
            dims: vec![dim],
            shape: vec![coord.len()],
            units: coord.meta().units.clone(),
            axis: coord.axis(),
        })
        .collect();

    let aux_coords = cube
        .aux_coords()
        .map(|(coord, dims)| CoordInfo {
            name: coord.name().to_string(),
            dims: dims.to_vec(),
            shape: coord.shape().to_vec(),
            units: coord.meta().units.clone(),
            axis: None,
        })
        .collect();

    CubeSummary {
        name: cube.name().to_string(),
        units: cube.meta().units.clone(),
        shape: cube.shape().to_vec(),
        dimension_names,
        dim_coords,
        aux_coords,
        coord_system: cube.coord_system().map(ToString::to_string),
        attributes: cube.attributes().clone(),
    }
}

/// Prints a dimension/coordinate table for a cube.
pub fn print_cube_summary(cube: &Cube) {
    let summary = summarize_cube(cube);

    let dims: Vec<String> = summary
        .dimension_names
        .iter()
        .zip(&summary.shape)
        .map(|(name, len)| format!("{}: {}", name, len))
        .collect();

    println!(
        "\n{} / ({})    ({})",
        summary.name,
        summary.units.as_deref().unwrap_or("unknown"),
        dims.join("; ")
    );

    let width = summary
        .dim_coords
        .iter()
        .chain(&summary.aux_coords)
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    let row = |info: &CoordInfo| {
        let marks: Vec<&str> = (0..summary.shape.len())
            .map(|d| if info.dims.contains(&d) { "x" } else { "-" })
            .collect();
        let scalar = info.dims.is_empty();
        if scalar {
            println!("        {:<width$}  (scalar)", info.name, width = width);
        } else {
            println!("        {:<width$}  {}", info.name, marks.join(" "), width = width);
        }
    };

    if !summary.dim_coords.is_empty() {
        println!("    Dimension coordinates:");
        summary.dim_coords.iter().for_each(&row);
    }
    if !summary.aux_coords.is_empty() {
        println!("    Auxiliary coordinates:");
        summary.aux_coords.iter().for_each(&row);
    }

    match &summary.coord_system {
        Some(cs) => println!("    Coordinate system: {}", cs),
        None => println!("    Coordinate system: (none)"),
    }

    if !summary.attributes.is_empty() {
        let mut keys: Vec<&String> = summary.attributes.keys().collect();
        keys.sort();
        println!("    Attributes:");
        for key in keys {
            println!("        {}: {}", key, summary.attributes[key]);
        }
    }
}
