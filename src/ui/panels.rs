use std::path::PathBuf;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::{ColorDimension, YearBucket};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Filters");
    ui.separator();

    let present: Vec<YearBucket> = state.table().present_buckets().iter().copied().collect();
    if state.table().is_empty() {
        ui.label("No listing has both a price and an odometer reading.");
    } else if present.is_empty() {
        ui.label("No listing has a known model year.");
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year bucket multi-select ----
            let header_text = format!(
                "Model year range  ({}/{})",
                state.selection.len(),
                present.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("year_bucket_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    for bucket in &present {
                        let mut checked = state.selection.contains(bucket);
                        let mut text = RichText::new(bucket.label());
                        if state.color_dimension == ColorDimension::YearBucket {
                            text = text.color(state.color_map.color_for(Some(bucket.label())));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_bucket(*bucket);
                        }
                    }
                });
            ui.separator();

            // ---- Colour-by selector ----
            ui.strong("Color scatter by");
            let current = state.color_dimension;
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(current.column())
                .show_ui(ui, |ui: &mut Ui| {
                    for dimension in ColorDimension::ALL {
                        if ui
                            .selectable_label(current == dimension, dimension.column())
                            .clicked()
                        {
                            state.set_color_dimension(dimension);
                        }
                    }
                });

            ui.add_space(4.0);
            for (category, color) in state.color_map.legend_entries() {
                ui.label(RichText::new(format!("● {category}")).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns a file the user asked to open.
pub fn top_bar(ui: &mut Ui, state: Option<&DashboardState>) -> Option<PathBuf> {
    let mut requested = None;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                requested = open_file_dialog();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Used-vehicle listings");

        if let Some(state) = state {
            let report = state.table().report();
            ui.separator();
            ui.label(format!(
                "{} listings loaded, {} visible, {} dropped (missing price or odometer)",
                report.rows_retained,
                state.view.len(),
                report.rows_dropped
            ));
        }
    });
    requested
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("Explore mileage, price and their relationship by model year or vehicle type.")
                .small(),
        );
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("Delimited", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
