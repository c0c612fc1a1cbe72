use std::collections::BTreeSet;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Row predicates. Every function takes and returns an ordered set of row
// indices into the dataset so filters can be chained.
// ---------------------------------------------------------------------------

/// Split a comma-separated artist field into trimmed, non-empty names.
pub fn split_artists(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep rows whose artist list contains at least one of `artists`.
/// An empty selection means "no filter".
pub fn filter_by_artists(dataset: &Dataset, rows: &[usize], artists: &BTreeSet<String>) -> Vec<usize> {
    if artists.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .copied()
        .filter(|&i| dataset.tracks[i].artists.iter().any(|a| artists.contains(a)))
        .collect()
}

/// Keep rows with `min <= streams <= max`.
pub fn filter_by_stream_range(dataset: &Dataset, rows: &[usize], range: Option<(i64, i64)>) -> Vec<usize> {
    let Some((min, max)) = range else {
        return rows.to_vec();
    };
    rows.iter()
        .copied()
        .filter(|&i| (min..=max).contains(&dataset.tracks[i].streams))
        .collect()
}

/// Number of rows kept by a top-`percent` selection over `len` rows.
pub fn top_count(len: usize, percent: f64) -> usize {
    let n = (percent / 100.0 * len as f64).floor();
    if !n.is_finite() || n <= 0.0 {
        0
    } else {
        (n as usize).min(len)
    }
}

/// The top `floor(percent/100 * rows.len())` rows by stream count, highest
/// first. Equal stream counts keep their relative order in `rows`.
pub fn top_by_percent(dataset: &Dataset, rows: &[usize], percent: Option<f64>) -> Vec<usize> {
    let Some(percent) = percent else {
        return rows.to_vec();
    };
    let keep = top_count(rows.len(), percent);
    let mut ranked = rows.to_vec();
    ranked.sort_by(|&a, &b| dataset.tracks[b].streams.cmp(&dataset.tracks[a].streams));
    ranked.truncate(keep);
    ranked
}

// ---------------------------------------------------------------------------
// Scatter filter: the three predicates applied in their fixed order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterFilter {
    /// Empty → all artists.
    pub artists: BTreeSet<String>,
    pub stream_range: Option<(i64, i64)>,
    pub top_percent: Option<f64>,
}

impl ScatterFilter {
    /// Artist filter, then stream range, then top percent of what remains.
    pub fn apply(&self, dataset: &Dataset) -> Vec<usize> {
        let rows = dataset.all_rows();
        let rows = filter_by_artists(dataset, &rows, &self.artists);
        let rows = filter_by_stream_range(dataset, &rows, self.stream_range);
        top_by_percent(dataset, &rows, self.top_percent)
    }
}
