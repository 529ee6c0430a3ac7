//! NetCDF I/O: loading cubes from CF-convention files and writing them back
//!
//! Loading follows the CF conventions the way climate tooling interprets them:
//! coordinate variables become dimension coordinates, names listed in a
//! variable's `coordinates` attribute become auxiliary coordinates, and the
//! `grid_mapping` variable becomes the cube's coordinate system.

use crate::coord_system::CoordSystem;
use crate::coords::{AuxCoord, AxisRole, CoordMeta, DimCoord};
use crate::cube::Cube;
use crate::errors::{CubeFrameError, Result};
use chrono::Utc;
use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{create, AttributeValue, File, Variable};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::{fs, path::Path};

/// Attributes consumed while building the cube and not copied into
/// [`Cube::attributes`].
const INTERPRETED_ATTRIBUTES: [&str; 10] = [
    "_FillValue",
    "missing_value",
    "scale_factor",
    "add_offset",
    "standard_name",
    "long_name",
    "units",
    "calendar",
    "coordinates",
    "grid_mapping",
];

/// Attributes that point at other variables of the file.
const REFERENCE_ATTRIBUTES: [&str; 4] =
    ["coordinates", "grid_mapping", "bounds", "ancillary_variables"];

/// Loads a single cube from a NetCDF file.
///
/// With `var_name` unset the file must hold exactly one data variable.
///
/// # Errors
///
/// - [`CubeFrameError::VariableNotFound`] if `var_name` (or a referenced grid
///   mapping) does not exist
/// - [`CubeFrameError::NoUniqueCube`] if no name was given and the file does
///   not hold exactly one data variable
/// - NetCDF, shape and grid mapping errors encountered while reading
pub fn load_cube<P: AsRef<Path>>(path: P, var_name: Option<&str>) -> Result<Cube> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;

    let name = match var_name {
        Some(name) => name.to_string(),
        None => {
            let mut candidates = data_variable_names(&file);
            if candidates.len() != 1 {
                return Err(CubeFrameError::NoUniqueCube { candidates });
            }
            candidates.remove(0)
        }
    };

    let var = file
        .variable(&name)
        .ok_or_else(|| CubeFrameError::VariableNotFound { var: name.clone() })?;

    println!("🚀 Loading cube '{}' from {}", name, path.display());
    let cube = build_cube(&file, &var)?;
    println!(
        "✅ Loaded '{}' with shape {:?} and coordinates [{}]",
        cube.name(),
        cube.shape(),
        cube.coord_names().join(", ")
    );

    Ok(cube)
}

/// Names of the data variables in a NetCDF file, in file order.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn cube_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = netcdf::open(path.as_ref())?;
    Ok(data_variable_names(&file))
}

fn data_variable_names(file: &File) -> Vec<String> {
    let mut referenced: HashSet<String> = HashSet::new();
    for var in file.variables() {
        for key in REFERENCE_ATTRIBUTES {
            if let Some(value) = string_attribute(&var, key) {
                referenced.extend(
                    value
                        .split_whitespace()
                        .map(|token| token.trim_end_matches(':').to_string()),
                );
            }
        }
    }

    file.variables()
        .filter(|var| !var.dimensions().is_empty())
        .filter(|var| !is_coordinate_variable(var))
        .map(|var| var.name())
        .filter(|name| !referenced.contains(name))
        .collect()
}

fn is_coordinate_variable(var: &Variable) -> bool {
    let dims = var.dimensions();
    dims.len() == 1 && dims[0].name() == var.name()
}

fn build_cube(file: &File, var: &Variable) -> Result<Cube> {
    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let data = read_array(var)?;

    let mut cube = Cube::new(read_meta(var), data);

    for attr in var.attributes() {
        if INTERPRETED_ATTRIBUTES.contains(&attr.name()) {
            continue;
        }
        match attr.value() {
            Ok(value) => {
                cube.attributes_mut()
                    .insert(attr.name().to_string(), attribute_to_json(&value));
            }
            Err(e) => println!("⚠ Skipped unreadable attribute '{}': {}", attr.name(), e),
        }
    }

    for (dim, dim_name) in dim_names.iter().enumerate() {
        let Some(coord_var) = file.variable(dim_name) else {
            continue;
        };
        if !is_coordinate_variable(&coord_var) {
            continue;
        }
        let points = read_array(&coord_var)?;
        let points = points.into_dimensionality::<ndarray::Ix1>()?;
        let mut coord = DimCoord::new(read_meta(&coord_var), points)?;
        if let Some(axis) =
            string_attribute(&coord_var, "axis").and_then(|a| AxisRole::from_cf(&a))
        {
            coord = coord.with_axis(axis);
        }
        cube.add_dim_coord(coord, dim)?;
    }

    if let Some(coordinates) = string_attribute(var, "coordinates") {
        for name in coordinates.split_whitespace() {
            if dim_names.iter().any(|d| d == name) {
                continue;
            }
            let Some(coord_var) = file.variable(name) else {
                println!("⚠ Coordinate '{}' is listed but missing from the file", name);
                continue;
            };
            let dims: Option<Vec<usize>> = coord_var
                .dimensions()
                .iter()
                .map(|d| dim_names.iter().position(|n| *n == d.name()))
                .collect();
            let Some(dims) = dims else {
                println!("⚠ Coordinate '{}' spans dimensions outside the cube", name);
                continue;
            };
            let points = read_array(&coord_var)?;
            cube.add_aux_coord(AuxCoord::new(read_meta(&coord_var), points), &dims)?;
        }
    }

    if let Some(grid_mapping) = string_attribute(var, "grid_mapping") {
        let gm_name = grid_mapping
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(':')
            .to_string();
        let gm_var = file
            .variable(&gm_name)
            .ok_or(CubeFrameError::VariableNotFound { var: gm_name })?;
        cube.set_coord_system(Some(read_grid_mapping(&gm_var)?));
    }

    Ok(cube)
}

/// Reads a variable as f64, applying fill values and packing attributes.
fn read_array(var: &Variable) -> Result<ArrayD<f64>> {
    let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();
    let raw = read_raw(var)?;

    let fill = numeric_attribute(var, "_FillValue").and_then(|v| v.first().copied());
    let missing = numeric_attribute(var, "missing_value").unwrap_or_default();
    let scale = numeric_attribute(var, "scale_factor")
        .and_then(|v| v.first().copied())
        .unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset")
        .and_then(|v| v.first().copied())
        .unwrap_or(0.0);

    let values: Vec<f64> = raw
        .into_iter()
        .map(|v| {
            if Some(v) == fill || missing.contains(&v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
}

/// Reads all values in the variable's stored type and widens them to f64.
fn read_raw(var: &Variable) -> Result<Vec<f64>> {
    fn widen<T: Copy + Into<f64>>(values: Vec<T>) -> Vec<f64> {
        values.into_iter().map(Into::into).collect()
    }

    let values = match var.vartype() {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => widen(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U16) => widen(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U32) => widen(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I64) => var
            .get_values::<i64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        NcVariableType::Int(IntType::U64) => var
            .get_values::<u64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        other => {
            return Err(CubeFrameError::Generic(format!(
                "Variable '{}' has non-numeric type {:?}",
                var.name(),
                other
            )))
        }
    };
    Ok(values)
}

fn read_meta(var: &Variable) -> CoordMeta {
    CoordMeta {
        standard_name: string_attribute(var, "standard_name"),
        long_name: string_attribute(var, "long_name"),
        var_name: Some(var.name()),
        units: string_attribute(var, "units"),
        calendar: string_attribute(var, "calendar"),
    }
}

fn read_grid_mapping(var: &Variable) -> Result<CoordSystem> {
    let name = string_attribute(var, "grid_mapping_name").ok_or_else(|| {
        CubeFrameError::UnsupportedGridMapping {
            name: format!("{} (no grid_mapping_name)", var.name()),
        }
    })?;

    let mut params: HashMap<String, Vec<f64>> = HashMap::new();
    for attr in var.attributes() {
        if let Some(values) = attr.value().ok().as_ref().and_then(attribute_numbers) {
            params.insert(attr.name().to_string(), values);
        }
    }

    CoordSystem::from_cf_grid_mapping(&name, &params)
}

fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(ss) => Some(ss.join(" ")),
        _ => None,
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Option<Vec<f64>> {
    let value = var.attribute(name)?.value().ok()?;
    attribute_numbers(&value)
}

fn attribute_numbers(value: &AttributeValue) -> Option<Vec<f64>> {
    let numbers = match value {
        AttributeValue::Uchar(v) => vec![f64::from(*v)],
        AttributeValue::Uchars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Schar(v) => vec![f64::from(*v)],
        AttributeValue::Schars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ushort(v) => vec![f64::from(*v)],
        AttributeValue::Ushorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Short(v) => vec![f64::from(*v)],
        AttributeValue::Shorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Uint(v) => vec![f64::from(*v)],
        AttributeValue::Uints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Int(v) => vec![f64::from(*v)],
        AttributeValue::Ints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ulonglong(v) => vec![*v as f64],
        AttributeValue::Ulonglongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Longlong(v) => vec![*v as f64],
        AttributeValue::Longlongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Float(v) => vec![f64::from(*v)],
        AttributeValue::Floats(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Double(v) => vec![*v],
        AttributeValue::Doubles(v) => v.clone(),
        _ => return None,
    };
    Some(numbers)
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Str(s) => JsonValue::from(s.as_str()),
        AttributeValue::Strs(ss) => JsonValue::from(ss.clone()),
        other => match attribute_numbers(other) {
            Some(numbers) if numbers.len() == 1 => JsonValue::from(numbers[0]),
            Some(numbers) => JsonValue::from(numbers),
            None => JsonValue::Null,
        },
    }
}

/// Writer that stores a cube, its coordinates and coordinate system in a
/// CF-convention NetCDF file.
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write a cube, replacing any existing file at the output path.
    ///
    /// # Errors
    ///
    /// Returns NetCDF errors, for example when two coordinates share a
    /// variable name.
    pub fn write_cube(&self, cube: &Cube) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;
        file.add_attribute(
            "history",
            format!("Created by cube_frame on {}", Utc::now().to_rfc3339()),
        )?;

        let dim_names: Vec<String> = (0..cube.ndim())
            .map(|dim| match cube.dim_coord_for_dim(dim) {
                Some(coord) => coord.meta().column_name().to_string(),
                None => format!("dim_{dim}"),
            })
            .collect();

        for (dim_name, &len) in dim_names.iter().zip(cube.shape()) {
            file.add_dimension(dim_name, len)?;
        }

        for (coord, dim) in cube.dim_coords() {
            let mut var = file.add_variable::<f64>(&dim_names[dim], &[dim_names[dim].as_str()])?;
            put_meta(&mut var, coord.meta())?;
            if let Some(axis) = coord.axis() {
                var.put_attribute("axis", axis.as_str())?;
            }
            let points: Vec<f64> = coord.points().iter().copied().collect();
            var.put_values(&points, ..)?;
        }

        let mut aux_names = Vec::new();
        for (coord, dims) in cube.aux_coords() {
            let name = coord.meta().column_name().to_string();
            let dim_refs: Vec<&str> = dims.iter().map(|&d| dim_names[d].as_str()).collect();
            let mut var = file.add_variable::<f64>(&name, &dim_refs)?;
            put_meta(&mut var, coord.meta())?;
            let points: Vec<f64> = coord.points().iter().copied().collect();
            var.put_values(&points, ..)?;
            aux_names.push(name);
        }

        let grid_mapping_name = match cube.coord_system() {
            Some(cs) => {
                let name = cs.grid_mapping_name();
                let mut var = file.add_variable::<i32>(name, &[])?;
                var.put_attribute("grid_mapping_name", name)?;
                for (param, values) in cs.to_cf_params() {
                    if values.len() == 1 {
                        var.put_attribute(&param, values[0])?;
                    } else {
                        var.put_attribute(&param, values)?;
                    }
                }
                Some(name)
            }
            None => None,
        };

        let dim_refs: Vec<&str> = dim_names.iter().map(String::as_str).collect();
        let mut data_var = file.add_variable::<f64>(cube.meta().column_name(), &dim_refs)?;
        put_meta(&mut data_var, cube.meta())?;
        if !aux_names.is_empty() {
            data_var.put_attribute("coordinates", aux_names.join(" "))?;
        }
        if let Some(name) = grid_mapping_name {
            data_var.put_attribute("grid_mapping", name)?;
        }

        for (key, value) in cube.attributes() {
            match value {
                JsonValue::String(s) => {
                    data_var.put_attribute(key, s.as_str())?;
                }
                JsonValue::Number(n) => match n.as_f64() {
                    Some(v) => {
                        data_var.put_attribute(key, v)?;
                    }
                    None => println!("⚠ Skipped unsupported attribute type for '{}'", key),
                },
                JsonValue::Array(items) => {
                    let numbers: Option<Vec<f64>> = items.iter().map(JsonValue::as_f64).collect();
                    let strings: Option<Vec<String>> = items
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect();
                    if let Some(numbers) = numbers {
                        data_var.put_attribute(key, numbers)?;
                    } else if let Some(strings) = strings {
                        data_var.put_attribute(key, strings)?;
                    } else {
                        println!("⚠ Skipped unsupported attribute type for '{}'", key);
                    }
                }
                _ => println!("⚠ Skipped unsupported attribute type for '{}'", key),
            }
        }

        let data: Vec<f64> = cube.data().iter().copied().collect();
        data_var.put_values(&data, ..)?;

        Ok(())
    }
}

fn put_meta(var: &mut netcdf::VariableMut<'_>, meta: &CoordMeta) -> Result<()> {
    if let Some(standard_name) = &meta.standard_name {
        var.put_attribute("standard_name", standard_name.as_str())?;
    }
    if let Some(long_name) = &meta.long_name {
        var.put_attribute("long_name", long_name.as_str())?;
    }
    if let Some(units) = &meta.units {
        var.put_attribute("units", units.as_str())?;
    }
    if let Some(calendar) = &meta.calendar {
        var.put_attribute("calendar", calendar.as_str())?;
    }
    Ok(())
}

/// Writes a cube to `output_path` with [`NetCDFWriter`].
///
/// # Errors
///
/// Same as [`NetCDFWriter::write_cube`].
pub fn save_cube(cube: &Cube, output_path: &Path) -> Result<()> {
    NetCDFWriter::new(output_path).write_cube(cube)
}
