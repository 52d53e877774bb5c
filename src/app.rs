use std::path::Path;

use eframe::egui::{self, Color32, RichText};

use crate::data::loader::LoadError;
use crate::data::model::ListingTable;
use crate::data::pipeline::load_listings;
use crate::state::DashboardState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// What the window shows: the dashboard, or the terminal load error.
pub enum Screen {
    Dashboard(DashboardState),
    LoadFailed(String),
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VehicleExplorerApp {
    pub screen: Screen,
}

impl VehicleExplorerApp {
    pub fn new(loaded: Result<ListingTable, LoadError>) -> Self {
        let screen = match loaded {
            Ok(table) => Screen::Dashboard(DashboardState::new(table)),
            Err(e) => {
                log::error!("Failed to load data: {e}");
                Screen::LoadFailed(e.to_string())
            }
        };
        Self { screen }
    }

    /// Replace the current screen with a freshly loaded file.
    pub fn open(&mut self, path: &Path) {
        *self = Self::new(load_listings(path));
    }

    pub fn dashboard(&self) -> Option<&DashboardState> {
        match &self.screen {
            Screen::Dashboard(state) => Some(state),
            Screen::LoadFailed(_) => None,
        }
    }
}

impl eframe::App for VehicleExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        let mut requested = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            requested = panels::top_bar(ui, self.dashboard());
        });
        if let Some(path) = requested {
            self.open(&path);
        }

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        match &mut self.screen {
            Screen::LoadFailed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.heading(RichText::new(format!("❌ {message}")).color(Color32::RED));
                    });
                });
            }
            Screen::Dashboard(state) => {
                // ---- Left side panel: filters ----
                egui::SidePanel::left("filter_panel")
                    .default_width(220.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        panels::side_panel(ui, state);
                    });

                // ---- Central panel: charts ----
                egui::CentralPanel::default().show(ctx, |ui| {
                    plot::dashboard(ui, state);
                });
            }
        }
    }
}
