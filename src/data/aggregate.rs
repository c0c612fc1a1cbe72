use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::model::{AudioFeature, Dataset, FEATURE_COUNT};

// ---------------------------------------------------------------------------
// Artist counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistCount {
    pub artist: String,
    pub count: usize,
}

/// Count tracks per artist over `rows`. A track with several artists counts
/// once for each of them.
///
/// Sorted by count, highest first; equal counts keep first-appearance order.
pub fn artist_counts(dataset: &Dataset, rows: &[usize]) -> Vec<ArtistCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for &row in rows {
        for artist in &dataset.tracks[row].artists {
            let count = counts.entry(artist.as_str()).or_insert_with(|| {
                order.push(artist.as_str());
                0
            });
            *count += 1;
        }
    }

    let mut result: Vec<ArtistCount> = order
        .into_iter()
        .map(|artist| ArtistCount {
            artist: artist.to_string(),
            count: counts[artist],
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

// ---------------------------------------------------------------------------
// Feature means
// ---------------------------------------------------------------------------

/// Mean of each audio feature over `rows`, or `None` when `rows` is empty.
pub fn average_features(dataset: &Dataset, rows: &[usize]) -> Option<[f64; FEATURE_COUNT]> {
    if rows.is_empty() {
        return None;
    }
    let mut sums = [0.0; FEATURE_COUNT];
    for &row in rows {
        for feature in AudioFeature::ALL {
            sums[feature.index()] += dataset.tracks[row].feature(feature);
        }
    }
    let n = rows.len() as f64;
    Some(sums.map(|s| s / n))
}

// ---------------------------------------------------------------------------
// Collaboration share
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaborationShare {
    /// Distinct track names on which one of the artists collaborates.
    pub track_names: BTreeSet<String>,
    /// `track_names.len()` as a percentage of all tracks in the dataset.
    pub percent: f64,
}

/// Union of the collaboration tracks of every artist in `artists`.
pub fn collaboration_share<S: AsRef<str>>(dataset: &Dataset, artists: &[S]) -> CollaborationShare {
    let mut track_names = BTreeSet::new();
    for artist in artists {
        let artist = artist.as_ref();
        track_names.extend(
            dataset
                .tracks
                .iter()
                .filter(|t| t.is_collaboration_of(artist))
                .map(|t| t.name.clone()),
        );
    }
    let percent = if dataset.is_empty() {
        0.0
    } else {
        track_names.len() as f64 / dataset.len() as f64 * 100.0
    };
    CollaborationShare { track_names, percent }
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over the positions where both series have a value.
///
/// NaN when fewer than two pairs remain or either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let den = (var_x * var_y).sqrt();
    if den == 0.0 {
        f64::NAN
    } else {
        (cov / den).clamp(-1.0, 1.0)
    }
}

/// Square correlation matrix over the given columns, in the given order.
pub fn correlation_matrix(dataset: &Dataset, rows: &[usize], columns: &[usize]) -> Vec<Vec<f64>> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|&col| rows.iter().map(|&row| dataset.cell(row, col).as_f64()).collect())
        .collect();

    let n = series.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn counts_each_artist_on_shared_tracks() {
        let ds = sample_dataset();
        let counts = artist_counts(&ds, &ds.all_rows());
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.artist.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("A", 2), ("B", 1), ("C", 1)]);

        let total: usize = counts.iter().map(|c| c.count).sum();
        let pairs_in_data: usize = ds.tracks.iter().map(|t| t.artists.len()).sum();
        assert_eq!(total, pairs_in_data);
        assert!(total > ds.len());
    }

    #[test]
    fn counts_equal_track_count_without_collaborations() {
        let ds = sample_dataset();
        let solo = [1, 2];
        let total: usize = artist_counts(&ds, &solo).iter().map(|c| c.count).sum();
        assert_eq!(total, solo.len());
    }

    #[test]
    fn averages_every_feature() {
        let ds = sample_dataset();
        let avg = average_features(&ds, &ds.all_rows()).unwrap();
        let expected = [60.0, 30.0, 60.0, 20.0, 1.0, 20.0, 6.0];
        for (got, want) in avg.iter().zip(expected) {
            assert!(approx(*got, want), "{got} != {want}");
        }
        assert!(average_features(&ds, &[]).is_none());
    }

    #[test]
    fn collaboration_share_counts_each_track_once() {
        let ds = sample_dataset();
        let share = collaboration_share(&ds, &["A"]);
        assert_eq!(share.track_names.len(), 1);
        assert!(approx(share.percent, 100.0 / 3.0));

        // track one is a collaboration of both A and B
        let both = collaboration_share(&ds, &["A", "B"]);
        assert_eq!(both.track_names.len(), 1);

        let none = collaboration_share(&ds, &["C"]);
        assert!(none.track_names.is_empty());
        assert_eq!(none.percent, 0.0);
    }

    #[test]
    fn pearson_handles_degenerate_series() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0)];
        assert!(approx(pearson(&x, &y), 1.0));
        assert!(approx(pearson(&x, &z), -1.0));
        assert!(pearson(&x, &[Some(5.0); 3]).is_nan());
        assert!(pearson(&[Some(1.0), None, None], &x).is_nan());
        assert!(approx(pearson(&[Some(1.0), None, Some(3.0), Some(4.0)], &[Some(1.0), Some(9.0), Some(3.0), Some(4.0)]), 1.0));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let ds = sample_dataset();
        let m = correlation_matrix(&ds, &ds.all_rows(), &ds.numeric_columns);
        assert_eq!(m.len(), ds.numeric_columns.len());
        let streams = ds
            .numeric_columns
            .iter()
            .position(|&c| ds.column_names[c] == "streams")
            .unwrap();
        assert!(approx(m[streams][streams], 1.0));
        for i in 0..m.len() {
            for j in 0..m.len() {
                assert!(m[i][j].is_nan() && m[j][i].is_nan() || approx(m[i][j], m[j][i]));
            }
        }
    }
}
