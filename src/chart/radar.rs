use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;

use super::{ChartError, ChartResult};
use crate::data::aggregate::average_features;
use crate::data::filter::top_by_percent;
use crate::data::model::{AudioFeature, Dataset, FEATURE_COUNT};

/// Selector label of [`SongChoice::Average`].
pub const AVERAGE: &str = "Average";

/// What the radar chart profiles. Kept apart from track names so a track
/// called "Average" is still reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SongChoice {
    #[default]
    Average,
    Named(String),
}

impl SongChoice {
    pub fn label(&self) -> &str {
        match self {
            SongChoice::Average => AVERAGE,
            SongChoice::Named(name) => name,
        }
    }
}

/// Every radial axis spans this range whatever the data.
pub const RADIAL_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSpec {
    pub title: String,
    pub axes: Vec<&'static str>,
    pub values: [f64; FEATURE_COUNT],
}

impl RadarSpec {
    /// `(axis, value)` pairs with the first pair repeated at the end.
    pub fn closed_polygon(&self) -> Vec<(&'static str, f64)> {
        let mut pts: Vec<(&'static str, f64)> = self.axes.iter().copied().zip(self.values).collect();
        if let Some(&first) = pts.first() {
            pts.push(first);
        }
        pts
    }

    /// The closed polygon in plot coordinates, first axis pointing up and
    /// axes running clockwise.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        let n = self.axes.len();
        self.closed_polygon()
            .iter()
            .enumerate()
            .map(|(i, &(_, value))| polar_to_cartesian(i % n, n, value))
            .collect()
    }
}

/// Position of `radius` on the `index`-th of `n` axes.
pub fn polar_to_cartesian(index: usize, n: usize, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - TAU * index as f64 / n as f64;
    [radius * angle.cos(), radius * angle.sin()]
}

/// Feature profile of one song, or the average over the dataset.
///
/// [`SongChoice::Average`] averages the (optionally top-percent) dataset.
/// A named song shows the first track with that exact name, after
/// restricting same-named tracks to their own top percent.
pub fn build_radar(dataset: &Dataset, song: &SongChoice, top_percent: Option<f64>) -> ChartResult<RadarSpec> {
    let axes = AudioFeature::ALL.iter().map(|f| f.column()).collect();

    let (values, title) = match song {
        SongChoice::Average => {
            let rows = top_by_percent(dataset, &dataset.all_rows(), top_percent);
            let values = average_features(dataset, &rows).ok_or(ChartError::EmptySelection)?;
            let title = match top_percent {
                Some(p) => format!("Average Audio Features for Top {p}% of Streams"),
                None => "Average Audio Features".to_string(),
            };
            (values, title)
        }
        SongChoice::Named(song) => {
            let matching: Vec<usize> = dataset
                .tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| &t.name == song)
                .map(|(i, _)| i)
                .collect();
            let rows = top_by_percent(dataset, &matching, top_percent);
            let first = rows
                .first()
                .ok_or_else(|| ChartError::SongNotFound(song.clone()))?;
            (dataset.tracks[*first].features, format!("Audio Features for {song}"))
        }
    };

    log::debug!("Radar '{title}'");
    Ok(RadarSpec { title, axes, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::data::loader::read_csv;

    fn named(song: &str) -> SongChoice {
        SongChoice::Named(song.to_string())
    }

    #[test]
    fn average_is_elementwise_mean() {
        let ds = sample_dataset();
        let spec = build_radar(&ds, &SongChoice::Average, None).unwrap();
        assert_eq!(spec.title, "Average Audio Features");
        let expected = [60.0, 30.0, 60.0, 20.0, 1.0, 20.0, 6.0];
        for (got, want) in spec.values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn average_of_top_percent() {
        let ds = sample_dataset();
        let spec = build_radar(&ds, &SongChoice::Average, Some(67.0)).unwrap();
        assert_eq!(spec.title, "Average Audio Features for Top 67% of Streams");
        assert_eq!(spec.values[0], 70.0);
        assert_eq!(build_radar(&ds, &SongChoice::Average, Some(0.0)), Err(ChartError::EmptySelection));
    }

    #[test]
    fn named_song_uses_its_features() {
        let ds = sample_dataset();
        let spec = build_radar(&ds, &named("Track Three"), None).unwrap();
        assert_eq!(spec.title, "Audio Features for Track Three");
        assert_eq!(spec.values, [40.0, 20.0, 50.0, 30.0, 3.0, 30.0, 9.0]);
    }

    #[test]
    fn duplicate_names_pick_the_most_streamed_under_top_percent() {
        let csv = "\
track_name,artist(s)_name,streams,danceability_%,valence_%,energy_%,acousticness_%,instrumentalness_%,liveness_%,speechiness_%
Home,X,10,1,1,1,1,1,1,1
Home,Y,90,2,2,2,2,2,2,2
";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(build_radar(&ds, &named("Home"), None).unwrap().values[0], 1.0);
        assert_eq!(build_radar(&ds, &named("Home"), Some(50.0)).unwrap().values[0], 2.0);
        assert_eq!(
            build_radar(&ds, &named("Home"), Some(10.0)),
            Err(ChartError::SongNotFound("Home".into()))
        );
    }

    #[test]
    fn track_named_average_is_not_the_average() {
        let csv = "\
track_name,artist(s)_name,streams,danceability_%,valence_%,energy_%,acousticness_%,instrumentalness_%,liveness_%,speechiness_%
Average,X,10,10,10,10,10,10,10,10
Other,Y,90,30,30,30,30,30,30,30
";
        let ds = read_csv(csv.as_bytes()).unwrap();
        let song = build_radar(&ds, &named("Average"), None).unwrap();
        assert_eq!(song.title, "Audio Features for Average");
        assert_eq!(song.values[0], 10.0);

        let mean = build_radar(&ds, &SongChoice::Average, None).unwrap();
        assert_eq!(mean.title, "Average Audio Features");
        assert_eq!(mean.values[0], 20.0);
        assert_eq!(SongChoice::Average.label(), named("Average").label());
    }

    #[test]
    fn unknown_song_is_reported_not_panicked() {
        let ds = sample_dataset();
        assert_eq!(
            build_radar(&ds, &named("Nope"), None),
            Err(ChartError::SongNotFound("Nope".into()))
        );
    }

    #[test]
    fn polygon_is_closed() {
        let ds = sample_dataset();
        let spec = build_radar(&ds, &named("Track One"), None).unwrap();
        let poly = spec.closed_polygon();
        assert_eq!(poly.len(), FEATURE_COUNT + 1);
        assert_eq!(poly.first(), poly.last());

        let outline = spec.outline();
        assert_eq!(outline.first(), outline.last());
        // first axis points straight up
        assert!(outline[0][0].abs() < 1e-9);
        assert!((outline[0][1] - 80.0).abs() < 1e-9);
    }
}
