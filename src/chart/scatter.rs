use serde::Serialize;

use super::{ChartError, ChartResult};
use crate::data::model::{CellValue, Dataset, STREAMS_COLUMN};

// ---------------------------------------------------------------------------
// Axis bindings
// ---------------------------------------------------------------------------

/// Which column drives each visual channel of the scatter plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisBindings {
    pub x: String,
    pub y: String,
    pub color: String,
    pub size: String,
}

impl AxisBindings {
    /// Every channel bound to one column.
    pub fn uniform(column: &str) -> Self {
        Self {
            x: column.to_string(),
            y: column.to_string(),
            color: column.to_string(),
            size: column.to_string(),
        }
    }

    /// `streams` on every channel.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        match dataset.column_index(STREAMS_COLUMN) {
            Some(_) => Self::uniform(STREAMS_COLUMN),
            None => {
                let first = dataset
                    .numeric_columns
                    .first()
                    .map(|&c| dataset.column_names[c].as_str())
                    .unwrap_or_default();
                Self::uniform(first)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scatter spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: CellValue,
    /// Raw value of the size column; `None` when null.
    pub size: Option<f64>,
    pub track: String,
    pub artists: String,
}

/// How `ScatterPoint::color` maps to a colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColorEncoding {
    /// Numeric column: linear scale over `min..=max`.
    Continuous { min: f64, max: f64 },
    /// Text column: one colour per distinct value, in first-appearance order.
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub bindings: AxisBindings,
    pub color: ColorEncoding,
    /// Largest size value in the subset, used to normalise marker sizes.
    pub size_max: f64,
    pub points: Vec<ScatterPoint>,
}

/// Project a row set produced by [`ScatterFilter::apply`](crate::data::filter::ScatterFilter::apply) onto `bindings`.
/// Rebinding an axis only needs this, not a new filter pass.
pub fn project_scatter(dataset: &Dataset, rows: &[usize], bindings: &AxisBindings) -> ChartResult<ScatterSpec> {
    let x_col = numeric_column(dataset, &bindings.x)?;
    let y_col = numeric_column(dataset, &bindings.y)?;
    let size_col = numeric_column(dataset, &bindings.size)?;
    let color_col = dataset
        .column_index(&bindings.color)
        .ok_or_else(|| ChartError::UnknownColumn(bindings.color.clone()))?;

    let points: Vec<ScatterPoint> = rows
        .iter()
        .filter_map(|&row| {
            let track = &dataset.tracks[row];
            Some(ScatterPoint {
                x: track.cells[x_col].as_f64()?,
                y: track.cells[y_col].as_f64()?,
                color: track.cells[color_col].clone(),
                size: track.cells[size_col].as_f64(),
                track: track.name.clone(),
                artists: track.artists_raw.clone(),
            })
        })
        .collect();

    let color = if dataset.is_numeric_column(color_col) {
        let (min, max) = points
            .iter()
            .filter_map(|p| p.color.as_f64())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        ColorEncoding::Continuous { min, max }
    } else {
        let mut categories: Vec<String> = Vec::new();
        for p in &points {
            let label = p.color.to_string();
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
        ColorEncoding::Categorical(categories)
    };

    let size_max = points
        .iter()
        .filter_map(|p| p.size)
        .fold(0.0, f64::max);

    log::debug!(
        "Scatter {} x {} over {} rows",
        bindings.x,
        bindings.y,
        points.len()
    );

    Ok(ScatterSpec {
        bindings: bindings.clone(),
        color,
        size_max,
        points,
    })
}

fn numeric_column(dataset: &Dataset, name: &str) -> ChartResult<usize> {
    let col = dataset
        .column_index(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))?;
    if dataset.is_numeric_column(col) {
        Ok(col)
    } else {
        Err(ChartError::NonNumericColumn(name.to_string()))
    }
}
