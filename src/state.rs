use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::chart::bar::{ArtistBarSpec, build_artist_bars};
use crate::chart::heatmap::{HeatmapSpec, build_heatmap};
use crate::chart::radar::{RadarSpec, SongChoice, build_radar};
use crate::chart::scatter::{AxisBindings, ScatterSpec, project_scatter};
use crate::chart::ChartResult;
use crate::data::filter::ScatterFilter;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Tabs and inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Scatter,
    Radar,
    Heatmap,
    Artists,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Scatter, Tab::Radar, Tab::Heatmap, Tab::Artists];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Scatter => "Scatter Plot",
            Tab::Radar => "Radar Chart",
            Tab::Heatmap => "Correlation Heatmap",
            Tab::Artists => "Top Artists Bar Chart",
        }
    }
}

/// A numeric input the user may leave blank. A disabled input is "not
/// provided", which is different from a provided zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionalInput<T> {
    pub enabled: bool,
    pub value: T,
}

impl<T: Copy> OptionalInput<T> {
    pub fn off(value: T) -> Self {
        Self { enabled: false, value }
    }

    pub fn get(&self) -> Option<T> {
        self.enabled.then_some(self.value)
    }
}

// ---------------------------------------------------------------------------
// Per-tab state
// ---------------------------------------------------------------------------

pub struct ScatterTab {
    pub bindings: AxisBindings,
    pub artists: BTreeSet<String>,
    /// Text typed into the artist search box.
    pub artist_query: String,
    pub stream_range: OptionalInput<(i64, i64)>,
    pub top_percent: OptionalInput<f64>,
    /// Rows passing the current filter (cached so rebinding skips filtering).
    pub rows: Vec<usize>,
    pub chart: Option<ChartResult<ScatterSpec>>,
}

impl ScatterTab {
    pub fn filter(&self) -> ScatterFilter {
        ScatterFilter {
            artists: self.artists.clone(),
            stream_range: self.stream_range.get(),
            top_percent: self.top_percent.get(),
        }
    }
}

pub struct RadarTab {
    pub song: SongChoice,
    pub top_percent: OptionalInput<f64>,
    pub chart: Option<ChartResult<RadarSpec>>,
}

pub struct HeatmapTab {
    pub top_percent: OptionalInput<f64>,
    pub chart: Option<ChartResult<HeatmapSpec>>,
}

pub struct ArtistTab {
    pub top_n: OptionalInput<usize>,
    pub chart: Option<ArtistBarSpec>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    pub tab: Tab,
    pub scatter: ScatterTab,
    pub radar: RadarTab,
    pub heatmap: HeatmapTab,
    pub artists: ArtistTab,

    /// Individual artist names for the artist selector, sorted.
    pub artist_options: Vec<String>,
    /// Distinct track names for the song selector, in dataset order.
    pub song_options: Vec<String>,
    /// Smallest and largest stream count in the dataset.
    pub stream_bounds: (i64, i64),

    /// Bar count used when the top-N input is blank.
    pub default_top_artists: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(default_top_artists: usize) -> Self {
        Self {
            dataset: None,
            tab: Tab::default(),
            scatter: ScatterTab {
                bindings: AxisBindings::uniform(""),
                artists: BTreeSet::new(),
                artist_query: String::new(),
                stream_range: OptionalInput::off((0, 0)),
                top_percent: OptionalInput::off(10.0),
                rows: Vec::new(),
                chart: None,
            },
            radar: RadarTab {
                song: SongChoice::Average,
                top_percent: OptionalInput::off(10.0),
                chart: None,
            },
            heatmap: HeatmapTab {
                top_percent: OptionalInput::off(10.0),
                chart: None,
            },
            artists: ArtistTab {
                top_n: OptionalInput::off(default_top_artists),
                chart: None,
            },
            artist_options: Vec::new(),
            song_options: Vec::new(),
            stream_bounds: (0, 0),
            default_top_artists,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, reset the controls and build every chart.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let artists: BTreeSet<&str> = dataset
            .tracks
            .iter()
            .flat_map(|t| t.artists.iter().map(String::as_str))
            .collect();
        self.artist_options = artists.into_iter().map(str::to_string).collect();

        self.song_options.clear();
        let mut seen = BTreeSet::new();
        for track in &dataset.tracks {
            if seen.insert(track.name.as_str()) {
                self.song_options.push(track.name.clone());
            }
        }

        let min = dataset.tracks.iter().map(|t| t.streams).min().unwrap_or(0);
        let max = dataset.tracks.iter().map(|t| t.streams).max().unwrap_or(0);
        self.stream_bounds = (min, max);

        self.scatter.bindings = AxisBindings::for_dataset(&dataset);
        self.scatter.artists.clear();
        self.scatter.stream_range = OptionalInput::off((min, max));
        self.radar.song = SongChoice::Average;

        self.dataset = Some(dataset);
        self.status_message = None;
        self.rebuild_all();
    }

    pub fn rebuild_all(&mut self) {
        self.refilter_scatter();
        self.rebuild_radar();
        self.rebuild_heatmap();
        self.rebuild_artists();
    }

    /// Recompute the scatter rows after a filter change, then re-project.
    pub fn refilter_scatter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.scatter.rows = self.scatter.filter().apply(ds);
        }
        self.rebind_scatter();
    }

    /// Re-project the cached scatter rows after an axis binding change.
    pub fn rebind_scatter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.scatter.chart = Some(project_scatter(ds, &self.scatter.rows, &self.scatter.bindings));
        }
    }

    pub fn rebuild_radar(&mut self) {
        if let Some(ds) = &self.dataset {
            self.radar.chart = Some(build_radar(ds, &self.radar.song, self.radar.top_percent.get()));
        }
    }

    pub fn rebuild_heatmap(&mut self) {
        if let Some(ds) = &self.dataset {
            self.heatmap.chart = Some(build_heatmap(ds, self.heatmap.top_percent.get()));
        }
    }

    pub fn rebuild_artists(&mut self) {
        if let Some(ds) = &self.dataset {
            self.artists.chart = Some(build_artist_bars(
                ds,
                self.artists.top_n.get(),
                self.default_top_artists,
            ));
        }
    }

    /// The active tab's chart as pretty-printed JSON, if it built successfully.
    pub fn active_chart_json(&self) -> Result<Option<String>> {
        let json = match self.tab {
            Tab::Scatter => to_json(&self.scatter.chart)?,
            Tab::Radar => to_json(&self.radar.chart)?,
            Tab::Heatmap => to_json(&self.heatmap.chart)?,
            Tab::Artists => self.artists.chart.as_ref().map(spec_json).transpose()?,
        };
        Ok(json)
    }
}

fn to_json<T: serde::Serialize>(chart: &Option<ChartResult<T>>) -> Result<Option<String>> {
    match chart {
        Some(Ok(spec)) => spec_json(spec).map(Some),
        _ => Ok(None),
    }
}

fn spec_json<T: serde::Serialize>(spec: &T) -> Result<String> {
    serde_json::to_string_pretty(spec).context("serialising chart")
}
