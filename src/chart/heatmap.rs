use serde::Serialize;

use super::{ChartError, ChartResult};
use crate::data::aggregate::correlation_matrix;
use crate::data::filter::top_by_percent;
use crate::data::model::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSpec {
    pub title: String,
    pub axis_title: String,
    /// Numeric column names, used for both rows and columns.
    pub labels: Vec<String>,
    /// `matrix[i][j]` is the correlation of `labels[i]` with `labels[j]`;
    /// NaN where undefined.
    pub matrix: Vec<Vec<f64>>,
}

/// Pearson correlations between every numeric column over the
/// (optionally top-percent) dataset.
pub fn build_heatmap(dataset: &Dataset, top_percent: Option<f64>) -> ChartResult<HeatmapSpec> {
    let rows = top_by_percent(dataset, &dataset.all_rows(), top_percent);
    if rows.is_empty() {
        return Err(ChartError::EmptySelection);
    }

    let labels = dataset
        .numeric_columns
        .iter()
        .map(|&c| dataset.column_names[c].clone())
        .collect();
    let matrix = correlation_matrix(dataset, &rows, &dataset.numeric_columns);
    log::debug!("Heatmap over {} rows", rows.len());

    Ok(HeatmapSpec {
        title: "Correlation Heatmap".to_string(),
        axis_title: "Audio Features".to_string(),
        labels,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn labels_follow_numeric_column_order() {
        let ds = sample_dataset();
        let spec = build_heatmap(&ds, None).unwrap();
        assert_eq!(spec.labels[0], "artist_count");
        assert_eq!(spec.labels[1], "streams");
        assert_eq!(spec.labels.len(), 9);
        assert_eq!(spec.matrix.len(), 9);
        assert!(spec.matrix.iter().all(|row| row.len() == 9));
    }

    #[test]
    fn values_are_bounded() {
        let ds = sample_dataset();
        let spec = build_heatmap(&ds, None).unwrap();
        for v in spec.matrix.iter().flatten().filter(|v| !v.is_nan()) {
            assert!((-1.0..=1.0).contains(v));
        }
        // streams rise as energy rises in the fixture
        let energy = spec.labels.iter().position(|l| l == "energy_%").unwrap();
        assert!((spec.matrix[1][energy] - 0.9).abs() < 0.1);
    }

    #[test]
    fn top_percent_too_small_is_empty() {
        let ds = sample_dataset();
        assert_eq!(build_heatmap(&ds, Some(10.0)), Err(ChartError::EmptySelection));
        // a single row has no variance: all NaN, but still a chart
        let spec = build_heatmap(&ds, Some(34.0)).unwrap();
        assert!(spec.matrix.iter().flatten().all(|v| v.is_nan()));
    }
}
