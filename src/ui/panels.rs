use std::path::Path;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::chart::radar::{AVERAGE, SongChoice};
use crate::state::{AppState, OptionalInput, Tab};

// ---------------------------------------------------------------------------
// Left side panel – controls for the active tab
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.tab.label());
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    match state.tab {
        Tab::Scatter => scatter_controls(ui, state),
        Tab::Radar => radar_controls(ui, state),
        Tab::Heatmap => {
            if percent_input(ui, "Top N%", &mut state.heatmap.top_percent) {
                state.rebuild_heatmap();
            }
        }
        Tab::Artists => {
            let default = state.default_top_artists;
            if count_input(ui, "Top N Artists", &mut state.artists.top_n, default) {
                state.rebuild_artists();
            }
        }
    }
}

fn scatter_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    // Clone what we need so we can mutate state below.
    let numeric: Vec<String> = ds
        .numeric_columns
        .iter()
        .map(|&c| ds.column_names[c].clone())
        .collect();
    let all_columns = ds.column_names.clone();
    let (min_streams, max_streams) = state.stream_bounds;

    // ---- Axis bindings: re-project only ----
    let bindings = &mut state.scatter.bindings;
    let mut rebind = false;
    rebind |= column_combo(ui, "X axis", "scatter_x", &mut bindings.x, &numeric);
    rebind |= column_combo(ui, "Y axis", "scatter_y", &mut bindings.y, &numeric);
    rebind |= column_combo(ui, "Color", "scatter_color", &mut bindings.color, &all_columns);
    rebind |= column_combo(ui, "Size", "scatter_size", &mut bindings.size, &numeric);
    ui.separator();

    // ---- Filters: artist → stream range → top percent ----
    let mut refilter = false;

    let selected = state.scatter.artists.len();
    egui::CollapsingHeader::new(RichText::new(format!("Artists  ({selected} selected)")).strong())
        .id_salt("artist_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut state.scatter.artist_query)
                        .hint_text("Select artist(s)"),
                );
                if ui.small_button("Clear").clicked() {
                    state.scatter.artists.clear();
                    refilter = true;
                }
            });
            let query = state.scatter.artist_query.to_lowercase();
            ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui: &mut Ui| {
                    for artist in &state.artist_options {
                        let is_selected = state.scatter.artists.contains(artist);
                        if !is_selected && !artist.to_lowercase().contains(&query) {
                            continue;
                        }
                        let mut checked = is_selected;
                        if ui.checkbox(&mut checked, artist).changed() {
                            if checked {
                                state.scatter.artists.insert(artist.clone());
                            } else {
                                state.scatter.artists.remove(artist);
                            }
                            refilter = true;
                        }
                    }
                });
        });

    ui.add_space(4.0);
    let range = &mut state.scatter.stream_range;
    refilter |= ui.checkbox(&mut range.enabled, "Stream range").changed();
    ui.add_enabled_ui(range.enabled, |ui: &mut Ui| {
        let speed = ((max_streams - min_streams) as f64 / 500.0).max(1.0);
        let (lo, hi) = &mut range.value;
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Min");
            refilter |= ui
                .add(DragValue::new(lo).range(min_streams..=max_streams).speed(speed))
                .changed();
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Max");
            refilter |= ui
                .add(DragValue::new(hi).range(min_streams..=max_streams).speed(speed))
                .changed();
        });
        ui.label(format!("{}M – {}M", *lo / 1_000_000, *hi / 1_000_000));
    });

    ui.add_space(4.0);
    refilter |= percent_input(ui, "Top N%", &mut state.scatter.top_percent);

    if refilter {
        state.refilter_scatter();
    } else if rebind {
        state.rebind_scatter();
    }
}

fn radar_controls(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;
    ui.strong("Song");
    egui::ComboBox::from_id_salt("radar_song")
        .selected_text(state.radar.song.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui
                .selectable_value(&mut state.radar.song, SongChoice::Average, RichText::new(AVERAGE).italics())
                .changed();
            for song in &state.song_options {
                changed |= ui
                    .selectable_value(&mut state.radar.song, SongChoice::Named(song.clone()), song)
                    .changed();
            }
        });
    ui.add_space(4.0);
    changed |= percent_input(ui, "Top N%", &mut state.radar.top_percent);

    if changed {
        state.rebuild_radar();
    }
}

// ---------------------------------------------------------------------------
// Input widgets
// ---------------------------------------------------------------------------

fn column_combo(ui: &mut Ui, label: &str, id: &str, current: &mut String, options: &[String]) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for col in options {
                    changed |= ui.selectable_value(current, col.clone(), col).changed();
                }
            });
    });
    changed
}

/// Checkbox + value. Unchecked means "not provided".
fn percent_input(ui: &mut Ui, label: &str, input: &mut OptionalInput<f64>) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut input.enabled, label).changed();
        changed |= ui
            .add_enabled(
                input.enabled,
                DragValue::new(&mut input.value).range(0.0..=100.0).suffix("%"),
            )
            .changed();
    });
    changed
}

fn count_input(ui: &mut Ui, label: &str, input: &mut OptionalInput<usize>, default: usize) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut input.enabled, label).changed();
        changed |= ui
            .add_enabled(input.enabled, DragValue::new(&mut input.value).range(0..=1000))
            .changed();
    });
    if !input.enabled {
        ui.label(RichText::new(format!("Showing the default top {default}")).weak());
    }
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar and the tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export chart…"))
                .clicked()
            {
                export_chart_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} tracks, {} columns ({} numeric)",
                ds.len(),
                ds.column_names.len(),
                ds.numeric_columns.len()
            ));
            if state.tab == Tab::Scatter {
                ui.label(format!("{} shown", state.scatter.rows.len()));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// Load `path` and replace the current dataset; on failure the old dataset
/// stays and the error is shown in the top bar.
pub fn load_into(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} tracks from {} with columns {:?}",
                dataset.len(),
                path.display(),
                dataset.column_names
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_chart_dialog(state: &mut AppState) {
    let json = match state.active_chart_json() {
        Ok(Some(json)) => json,
        Ok(None) => {
            state.status_message = Some("Nothing to export: the chart did not build".to_string());
            return;
        }
        Err(e) => {
            log::error!("Failed to export chart: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .add_filter("JSON", &["json"])
        .set_file_name("chart.json")
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, json) {
            Ok(()) => log::info!("Exported {} chart to {}", state.tab.label(), path.display()),
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
