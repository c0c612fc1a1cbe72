use serde::Serialize;

use crate::data::aggregate::{ArtistCount, artist_counts, collaboration_share};
use crate::data::model::Dataset;

/// Bars shown when no count is given.
pub const DEFAULT_TOP_ARTISTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistBarSpec {
    pub title: String,
    /// Highest count first.
    pub bars: Vec<ArtistCount>,
    /// Share of all tracks that are collaborations of a charted artist.
    pub collaboration_percent: f64,
}

/// Horizontal bar chart of the `top_n` artists by track count.
///
/// `None` falls back to `default_top_n`; `Some(0)` is an empty chart. Never
/// fails: an empty dataset is an empty chart at 0.00%.
pub fn build_artist_bars(dataset: &Dataset, top_n: Option<usize>, default_top_n: usize) -> ArtistBarSpec {
    let top_n = top_n.unwrap_or(default_top_n);
    let mut bars = artist_counts(dataset, &dataset.all_rows());
    bars.truncate(top_n);

    let artists: Vec<&str> = bars.iter().map(|b| b.artist.as_str()).collect();
    let share = collaboration_share(dataset, &artists);
    log::debug!(
        "Top {} artists, {} collaboration tracks",
        bars.len(),
        share.track_names.len()
    );

    ArtistBarSpec {
        title: format!(
            "Top Artists by Track Count ({:.2}% of Total Tracks)",
            share.percent
        ),
        bars,
        collaboration_percent: share.percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn top_artist_collaboration_share() {
        let ds = sample_dataset();
        let spec = build_artist_bars(&ds, Some(1), DEFAULT_TOP_ARTISTS);
        assert_eq!(spec.bars.len(), 1);
        assert_eq!(spec.bars[0].artist, "A");
        assert_eq!(spec.bars[0].count, 2);
        assert!((spec.collaboration_percent - 33.333_333).abs() < 1e-4);
        assert_eq!(spec.title, "Top Artists by Track Count (33.33% of Total Tracks)");
    }

    #[test]
    fn none_uses_default_and_zero_is_empty() {
        let ds = sample_dataset();
        let all = build_artist_bars(&ds, None, DEFAULT_TOP_ARTISTS);
        assert_eq!(all.bars.len(), 3);

        let two = build_artist_bars(&ds, None, 2);
        assert_eq!(two.bars.len(), 2);

        let zero = build_artist_bars(&ds, Some(0), DEFAULT_TOP_ARTISTS);
        assert!(zero.bars.is_empty());
        assert_eq!(zero.collaboration_percent, 0.0);
        assert_eq!(zero.title, "Top Artists by Track Count (0.00% of Total Tracks)");
    }

    #[test]
    fn bars_keep_ranking_order() {
        let ds = sample_dataset();
        let spec = build_artist_bars(&ds, Some(10), DEFAULT_TOP_ARTISTS);
        let counts: Vec<usize> = spec.bars.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
    }
}
