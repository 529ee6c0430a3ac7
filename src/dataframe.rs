//! Flattening cubes into dataframes
//!
//! Every data element becomes one row carrying the values of all coordinates
//! at that position. Column order: one column per data dimension, then the
//! auxiliary coordinates, then the data itself.

use crate::coords::CoordMeta;
use crate::cube::Cube;
use crate::errors::Result;
use crate::time_units::{is_gregorian, is_time_reference, TimeUnits};
use chrono::NaiveDateTime;
use ndarray::{Dimension, IxDyn};
use polars::prelude::*;
use std::collections::HashMap;

/// Converts a cube into a wide dataframe with exact duplicate rows removed.
///
/// Rows follow the row-major order of the cube data; when rows repeat, the
/// first occurrence is kept in place. Dimensions without a dimension
/// coordinate contribute their integer position in a `dim_<n>` column.
///
/// # Errors
///
/// Propagates polars errors, for example when two coordinates map to the same
/// column name.
pub fn cube_to_dataframe(cube: &Cube) -> Result<DataFrame> {
    let n = cube.data().len();
    let ndim = cube.ndim();

    let mut dim_index: Vec<Vec<usize>> = vec![Vec::with_capacity(n); ndim];
    let mut values: Vec<f64> = Vec::with_capacity(n);
    for (idx, &value) in cube.data().indexed_iter() {
        for (dim, &i) in idx.slice().iter().enumerate() {
            dim_index[dim].push(i);
        }
        values.push(value);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(ndim + 1);

    for (dim, positions) in dim_index.iter().enumerate() {
        match cube.dim_coord_for_dim(dim) {
            Some(coord) => {
                let points = coord.points();
                let vals: Vec<f64> = positions.iter().map(|&i| points[i]).collect();
                columns.push(coord_column(coord.meta(), vals));
            }
            None => {
                let vals: Vec<i64> = positions.iter().map(|&i| i as i64).collect();
                columns.push(Column::new(format!("dim_{dim}").into(), vals));
            }
        }
    }

    for (aux, dims) in cube.aux_coords() {
        let points = aux.points();
        let mut sub = vec![0usize; dims.len()];
        let vals: Vec<f64> = (0..n)
            .map(|row| {
                for (k, &dim) in dims.iter().enumerate() {
                    sub[k] = dim_index[dim][row];
                }
                points[IxDyn(&sub)]
            })
            .collect();
        columns.push(coord_column(aux.meta(), vals));
    }

    columns.push(Column::new(cube.meta().column_name().into(), values));

    drop_duplicate_rows(DataFrame::new(columns)?)
}

/// Removes rows that repeat an earlier row in every column, keeping the
/// first occurrence of each in its original position.
///
/// # Errors
///
/// Propagates polars errors.
pub fn drop_duplicate_rows(df: DataFrame) -> Result<DataFrame> {
    let df = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(df)
}

/// Numeric column, or a nanosecond datetime column for decodable CF time
/// coordinates.
fn coord_column(meta: &CoordMeta, vals: Vec<f64>) -> Column {
    let name = meta.column_name();

    if let Some(time_units) = decodable_time_units(meta) {
        let instants: Vec<Option<NaiveDateTime>> =
            vals.iter().map(|&v| time_units.decode(v)).collect();
        if keeps_distinct(&vals, &instants) {
            return DatetimeChunked::from_naive_datetime_options(
                name.into(),
                instants,
                TimeUnit::Nanoseconds,
            )
            .into_series()
            .into_column();
        }
    }

    Column::new(name.into(), vals)
}

/// Whether decoding maps distinct offsets to distinct instants.
fn keeps_distinct(vals: &[f64], instants: &[Option<NaiveDateTime>]) -> bool {
    let mut seen: HashMap<NaiveDateTime, u64> = HashMap::new();
    vals.iter().zip(instants).all(|(v, instant)| match instant {
        Some(t) => {
            // -0.0 and 0.0 are the same offset.
            let bits = (v + 0.0).to_bits();
            *seen.entry(*t).or_insert(bits) == bits
        }
        None => true,
    })
}

fn decodable_time_units(meta: &CoordMeta) -> Option<TimeUnits> {
    let units = meta.units.as_deref()?;
    if !is_time_reference(units) || !is_gregorian(meta.calendar.as_deref()) {
        return None;
    }
    TimeUnits::parse(units).ok()
}
