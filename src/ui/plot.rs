use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::chart::bar::ArtistBarSpec;
use crate::chart::heatmap::HeatmapSpec;
use crate::chart::radar::{RADIAL_RANGE, RadarSpec, polar_to_cartesian};
use crate::chart::scatter::{ColorEncoding, ScatterSpec};
use crate::chart::{ChartError, ChartResult};
use crate::color::{PointColors, correlation_color, viridis};
use crate::state::{AppState, Tab};

const MIN_MARKER_RADIUS: f32 = 2.0;
const MAX_MARKER_RADIUS: f32 = 12.0;
/// Heatmap cells get a printed value up to this many columns.
const MAX_LABELLED_CELLS: usize = 12;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active tab's chart in the central panel.
pub fn chart_area(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore tracks  (File → Open…)");
        });
        return;
    }

    match state.tab {
        Tab::Scatter => with_chart(ui, &state.scatter.chart, scatter_plot),
        Tab::Radar => with_chart(ui, &state.radar.chart, radar_chart),
        Tab::Heatmap => with_chart(ui, &state.heatmap.chart, heatmap),
        Tab::Artists => {
            if let Some(spec) = &state.artists.chart {
                artist_bars(ui, spec);
            }
        }
    }
}

fn with_chart<T>(ui: &mut Ui, chart: &Option<ChartResult<T>>, draw: fn(&mut Ui, &T)) {
    match chart {
        Some(Ok(spec)) => draw(ui, spec),
        Some(Err(err)) => placeholder(ui, err),
        None => {}
    }
}

fn placeholder(ui: &mut Ui, err: &ChartError) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(format!("Chart unavailable: {err}")).color(Color32::RED));
    });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn marker_radius(size: Option<f64>, size_max: f64) -> f32 {
    match size {
        Some(v) if v > 0.0 && size_max > 0.0 => {
            let t = (v / size_max).sqrt() as f32;
            MIN_MARKER_RADIUS + t * (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS)
        }
        _ => MIN_MARKER_RADIUS,
    }
}

fn scatter_plot(ui: &mut Ui, spec: &ScatterSpec) {
    let colors = PointColors::new(&spec.color);
    let b = &spec.bindings;

    // ---- Colour legend ----
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(format!("{}:", b.color));
        match (&spec.color, &colors) {
            (ColorEncoding::Continuous { min, max }, _) if min <= max => {
                ui.label(RichText::new(format!("{min:.0}")).color(viridis(0.0)));
                ui.label("→");
                ui.label(RichText::new(format!("{max:.0}")).color(viridis(1.0)));
            }
            (_, PointColors::Categorical(map)) => {
                for (label, color) in map.legend_entries() {
                    ui.label(RichText::new(label).color(color));
                }
            }
            _ => {}
        }
        ui.separator();
        ui.label(format!("size: {}", b.size));
    });

    // ---- Track table ----
    egui::TopBottomPanel::bottom("scatter_tracks")
        .resizable(true)
        .default_height(160.0)
        .show_inside(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(format!("Tracks ({})", spec.points.len()))
                .default_open(false)
                .show(ui, |ui: &mut Ui| track_table(ui, spec));
        });

    let (x_name, y_name) = (b.x.clone(), b.y.clone());
    Plot::new("scatter_plot")
        .x_axis_label(b.x.as_str())
        .y_axis_label(b.y.as_str())
        .label_formatter(move |name, value| {
            let coords = format!("{x_name}: {:.2}\n{y_name}: {:.2}", value.x, value.y);
            if name.is_empty() {
                coords
            } else {
                format!("{name}\n{coords}")
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for p in &spec.points {
                let points = Points::new(vec![[p.x, p.y]])
                    .name(format!("{}\n{}", p.track, p.artists))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(marker_radius(p.size, spec.size_max))
                    .color(colors.color_for(&p.color));
                plot_ui.points(points);
            }
        });
}

fn track_table(ui: &mut Ui, spec: &ScatterSpec) {
    let b = &spec.bindings;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Track", "Artists", b.x.as_str(), b.y.as_str()] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, spec.points.len(), |mut row| {
                let p = &spec.points[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&p.track);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&p.artists);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{}", p.x));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{}", p.y));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

fn radar_chart(ui: &mut Ui, spec: &RadarSpec) {
    ui.heading(&spec.title);

    let n = spec.axes.len();
    let (_, r_max) = RADIAL_RANGE;
    let accent = Color32::from_rgb(99, 110, 250);

    Plot::new("radar_chart")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            // rings every 20%
            for step in 1..=5 {
                let r = r_max * step as f64 / 5.0;
                let ring: PlotPoints = (0..=n).map(|i| polar_to_cartesian(i % n, n, r)).collect();
                plot_ui.line(Line::new(ring).color(Color32::from_gray(90)).width(0.5));
            }
            for (i, axis) in spec.axes.iter().enumerate() {
                let tip = polar_to_cartesian(i, n, r_max);
                plot_ui.line(Line::new(vec![[0.0, 0.0], tip]).color(Color32::from_gray(90)).width(0.5));
                let label_pos = polar_to_cartesian(i, n, r_max * 1.12);
                plot_ui.text(
                    Text::new(PlotPoint::new(label_pos[0], label_pos[1]), *axis)
                        .anchor(Align2::CENTER_CENTER),
                );
            }

            plot_ui.polygon(
                Polygon::new(PlotPoints::from(spec.outline()))
                    .name("Selected Song")
                    .fill_color(accent.gamma_multiply(0.35))
                    .stroke(Stroke::new(2.0, accent)),
            );
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, spec: &HeatmapSpec) {
    ui.heading(&spec.title);

    let n = spec.labels.len();
    let axis_labels = |labels: Vec<String>| {
        move |mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        }
    };
    let hover_labels = spec.labels.clone();
    let hover_matrix = spec.matrix.clone();

    Plot::new("correlation_heatmap")
        .x_axis_label(spec.axis_title.as_str())
        .y_axis_label(spec.axis_title.as_str())
        .x_axis_formatter(axis_labels(spec.labels.clone()))
        .y_axis_formatter(axis_labels(spec.labels.clone()))
        .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .y_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .show_grid(false)
        .data_aspect(1.0)
        .label_formatter(move |_, value| {
            let (col, row) = (value.x.round(), value.y.round());
            if col < 0.0 || row < 0.0 {
                return String::new();
            }
            let (col, row) = (col as usize, row as usize);
            match (hover_labels.get(row), hover_labels.get(col)) {
                (Some(r), Some(c)) => format!("{r} / {c}\nr = {:.3}", hover_matrix[row][col]),
                _ => String::new(),
            }
        })
        .show(ui, |plot_ui| {
            for (row, values) in spec.matrix.iter().enumerate() {
                for (col, &r) in values.iter().enumerate() {
                    let (x, y) = (col as f64, row as f64);
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell))
                            .fill_color(correlation_color(r))
                            .stroke(Stroke::NONE),
                    );
                    if n <= MAX_LABELLED_CELLS && !r.is_nan() {
                        plot_ui.text(
                            Text::new(PlotPoint::new(x, y), RichText::new(format!("{r:.2}")).small())
                                .color(Color32::WHITE),
                        );
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Artist bar chart
// ---------------------------------------------------------------------------

fn artist_bars(ui: &mut Ui, spec: &ArtistBarSpec) {
    ui.heading(&spec.title);

    let n = spec.bars.len();
    // rank 0 at the top
    let position = move |rank: usize| (n - 1 - rank) as f64;
    let names: Vec<String> = spec.bars.iter().map(|b| b.artist.clone()).collect();

    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(rank, b)| Bar::new(position(rank), b.count as f64).name(&b.artist))
        .collect();

    Plot::new("artist_bars")
        .x_axis_label("Number of Tracks")
        .y_axis_label("Artist")
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 || i as usize >= n {
                return String::new();
            }
            names[n - 1 - i as usize].clone()
        })
        .y_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(99, 110, 250))
                    .name("Number of Tracks"),
            );
        });
}
