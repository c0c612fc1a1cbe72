use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use super::filter::split_artists;

pub const TRACK_NAME_COLUMN: &str = "track_name";
pub const ARTISTS_COLUMN: &str = "artist(s)_name";
pub const STREAMS_COLUMN: &str = "streams";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV reader would infer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integers, or floats with no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// AudioFeature – the seven percentage-valued feature columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioFeature {
    Danceability,
    Valence,
    Energy,
    Acousticness,
    Instrumentalness,
    Liveness,
    Speechiness,
}

pub const FEATURE_COUNT: usize = 7;

impl AudioFeature {
    pub const ALL: [AudioFeature; FEATURE_COUNT] = [
        AudioFeature::Danceability,
        AudioFeature::Valence,
        AudioFeature::Energy,
        AudioFeature::Acousticness,
        AudioFeature::Instrumentalness,
        AudioFeature::Liveness,
        AudioFeature::Speechiness,
    ];

    /// Column header in the source table.
    pub fn column(self) -> &'static str {
        match self {
            AudioFeature::Danceability => "danceability_%",
            AudioFeature::Valence => "valence_%",
            AudioFeature::Energy => "energy_%",
            AudioFeature::Acousticness => "acousticness_%",
            AudioFeature::Instrumentalness => "instrumentalness_%",
            AudioFeature::Liveness => "liveness_%",
            AudioFeature::Speechiness => "speechiness_%",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    /// The artist field as it appears in the file, e.g. `"A, B"`.
    pub artists_raw: String,
    pub artists: Vec<String>,
    pub streams: i64,
    /// Indexed by [`AudioFeature::index`].
    pub features: [f64; FEATURE_COUNT],
    /// Every cell of the row, aligned with [`Dataset::column_names`].
    pub cells: Vec<CellValue>,
}

impl Track {
    pub fn feature(&self, feature: AudioFeature) -> f64 {
        self.features[feature.index()]
    }

    /// Whether this track lists `artist` next to at least one other artist.
    pub fn is_collaboration_of(&self, artist: &str) -> bool {
        self.artists.len() > 1 && self.artists.iter().any(|a| a == artist)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed table. Built once per load and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tracks: Vec<Track>,
    /// Column names in file order.
    pub column_names: Vec<String>,
    /// Indices into `column_names` of the numeric columns, in file order.
    pub numeric_columns: Vec<usize>,
    column_index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset from raw rows, resolving the required columns.
    ///
    /// Rows whose stream count or feature values are not numeric are skipped.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let column_index: HashMap<String, usize> = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let require = |name: &str| -> Result<usize> {
            column_index
                .get(name)
                .copied()
                .with_context(|| format!("missing required column '{name}'"))
        };

        let name_idx = require(TRACK_NAME_COLUMN)?;
        let artists_idx = require(ARTISTS_COLUMN)?;
        let streams_idx = require(STREAMS_COLUMN)?;
        let mut feature_idx = [0usize; FEATURE_COUNT];
        for feature in AudioFeature::ALL {
            feature_idx[feature.index()] = require(feature.column())?;
        }

        let row_count = rows.len();
        let mut tracks = Vec::with_capacity(row_count);
        for (row_no, mut cells) in rows.into_iter().enumerate() {
            cells.resize(column_names.len(), CellValue::Null);

            let Some(streams) = cells[streams_idx].as_i64() else {
                log::warn!(
                    "Skipping row {row_no}: '{STREAMS_COLUMN}' is not an integer ({})",
                    cells[streams_idx]
                );
                continue;
            };

            let mut features = [0.0; FEATURE_COUNT];
            let mut valid = true;
            for feature in AudioFeature::ALL {
                match cells[feature_idx[feature.index()]].as_f64() {
                    Some(v) => features[feature.index()] = v,
                    None => {
                        log::warn!("Skipping row {row_no}: '{}' is not numeric", feature.column());
                        valid = false;
                        break;
                    }
                }
            }
            if !valid {
                continue;
            }

            let name = cell_text(&cells[name_idx]);
            let artists_raw = cell_text(&cells[artists_idx]);
            let artists = split_artists(&artists_raw);

            tracks.push(Track {
                name,
                artists_raw,
                artists,
                streams,
                features,
                cells,
            });
        }

        if row_count > 0 && tracks.is_empty() {
            bail!("all {row_count} rows were skipped: no row has an integer '{STREAMS_COLUMN}' and numeric features");
        }
        if tracks.len() < row_count {
            log::warn!("Skipped {} of {row_count} rows", row_count - tracks.len());
        }

        let numeric_columns = (0..column_names.len())
            .filter(|&col| {
                let mut seen = false;
                for track in &tracks {
                    match &track.cells[col] {
                        CellValue::Null => {}
                        v if v.is_numeric() => seen = true,
                        _ => return false,
                    }
                }
                seen
            })
            .collect();

        Ok(Dataset {
            tracks,
            column_names,
            numeric_columns,
            column_index,
        })
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All row indices in dataset order.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.tracks.len()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn is_numeric_column(&self, col: usize) -> bool {
        self.numeric_columns.contains(&col)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.tracks[row].cells[col]
    }
}

fn cell_text(value: &CellValue) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn resolves_tracks_and_numeric_columns() {
        let ds = sample_dataset();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.tracks[0].name, "Track One");
        assert_eq!(ds.tracks[0].artists, vec!["A", "B"]);
        assert_eq!(ds.tracks[2].streams, 30);
        assert_eq!(ds.tracks[1].feature(AudioFeature::Energy), 60.0);

        let numeric: Vec<&str> = ds
            .numeric_columns
            .iter()
            .map(|&c| ds.column_names[c].as_str())
            .collect();
        assert!(!numeric.contains(&TRACK_NAME_COLUMN));
        assert!(!numeric.contains(&"key"));
        assert_eq!(numeric[0], "artist_count");
        assert!(numeric.contains(&STREAMS_COLUMN));
    }

    #[test]
    fn skips_rows_with_corrupt_streams() {
        let columns: Vec<String> = [TRACK_NAME_COLUMN, ARTISTS_COLUMN, STREAMS_COLUMN]
            .into_iter()
            .chain(AudioFeature::ALL.iter().map(|f| f.column()))
            .map(str::to_string)
            .collect();
        let good: Vec<CellValue> = vec![
            CellValue::Text("ok".into()),
            CellValue::Text("A".into()),
            CellValue::Integer(10),
        ]
        .into_iter()
        .chain(std::iter::repeat(CellValue::Integer(50)).take(FEATURE_COUNT))
        .collect();
        let mut bad = good.clone();
        bad[2] = CellValue::Text("BPM110KeyAModeMajor".into());

        let ds = Dataset::from_rows(columns, vec![good, bad]).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.tracks[0].name, "ok");
    }

    #[test]
    fn every_row_skipped_is_an_error() {
        let columns: Vec<String> = [TRACK_NAME_COLUMN, ARTISTS_COLUMN, STREAMS_COLUMN]
            .into_iter()
            .chain(AudioFeature::ALL.iter().map(|f| f.column()))
            .map(str::to_string)
            .collect();
        let row: Vec<CellValue> = vec![
            CellValue::Text("x".into()),
            CellValue::Text("A".into()),
            CellValue::Text("not a number".into()),
        ]
        .into_iter()
        .chain(std::iter::repeat(CellValue::Integer(50)).take(FEATURE_COUNT))
        .collect();

        let err = Dataset::from_rows(columns.clone(), vec![row]).unwrap_err();
        assert!(err.to_string().contains("all 1 rows were skipped"));
        // a header-only table is still a valid, empty dataset
        assert!(Dataset::from_rows(columns, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn null_name_reads_as_empty_text() {
        let csv = "\
track_name,artist(s)_name,streams,danceability_%,valence_%,energy_%,acousticness_%,instrumentalness_%,liveness_%,speechiness_%
,A,10,1,2,3,4,5,6,7
";
        let ds = crate::data::loader::read_csv(csv.as_bytes()).unwrap();
        assert!(ds.cell(0, 0).is_null());
        assert_eq!(ds.tracks[0].name, "");
        assert_eq!(ds.tracks[0].artists, vec!["A"]);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = Dataset::from_rows(vec!["track_name".into()], Vec::new()).unwrap_err();
        assert!(err.to_string().contains(ARTISTS_COLUMN));
    }

    #[test]
    fn collaboration_requires_another_artist() {
        let ds = sample_dataset();
        assert!(ds.tracks[0].is_collaboration_of("A"));
        assert!(!ds.tracks[1].is_collaboration_of("A"));
        assert!(!ds.tracks[0].is_collaboration_of("C"));
    }
}
