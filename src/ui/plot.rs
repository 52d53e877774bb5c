use std::collections::BTreeMap;

use eframe::egui::{Color32, Pos2, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{PRICE_BAR_COLOR, UNKNOWN_LABEL, pastel_palette};
use crate::data::filter::scatter_size;
use crate::data::histogram::{HISTOGRAM_BINS, Histogram, StackedHistogram};
use crate::data::model::{Listing, YearBucket};
use crate::state::DashboardState;

const CHART_HEIGHT: f32 = 320.0;
const MAX_MARKER_RADIUS: f32 = 6.0;
const MIN_MARKER_RADIUS: f32 = 0.5;
const POINT_OPACITY: f32 = 0.7;
/// Screen distance within which a scatter point counts as hovered.
const HOVER_DISTANCE: f32 = 8.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the three charts for the current view.
pub fn dashboard(ui: &mut Ui, state: &DashboardState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Used-vehicle sale listings");
            ui.label(
                "Distribution of mileage and price, and the relationship between price and \
                 mileage by model year or vehicle type. Use the filters on the left to narrow \
                 the listings.",
            );
            ui.separator();

            ui.heading("Mileage distribution by model year");
            mileage_histogram(ui, state);
            ui.separator();

            ui.heading("Price distribution (trimmed at the 99th percentile)");
            price_histogram(ui, state);
            ui.separator();

            ui.heading(format!("Price vs. mileage by {}", state.color_dimension));
            price_vs_mileage(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Mileage histogram (stacked by year bucket)
// ---------------------------------------------------------------------------

fn mileage_histogram(ui: &mut Ui, state: &DashboardState) {
    let table = state.table();
    let values: Vec<(YearBucket, f64)> = state
        .view
        .listings(table)
        .filter_map(|(_, l)| l.year_bucket.map(|b| (b, l.odometer)))
        .collect();
    let histogram = StackedHistogram::new(&values, HISTOGRAM_BINS);
    let colors = pastel_palette(YearBucket::ALL.len());

    Plot::new("mileage_histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Odometer")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            let Some(histogram) = histogram else {
                return;
            };
            let mut charts: Vec<BarChart> = Vec::with_capacity(histogram.layers.len());
            for (bucket, counts) in &histogram.layers {
                let color = colors[*bucket as usize];
                let bars = bars(counts, |i| histogram.layout.center(i), histogram.layout.width);
                let below: Vec<&BarChart> = charts.iter().collect();
                let chart = BarChart::new(bars)
                    .name(bucket.label())
                    .color(color)
                    .stack_on(&below);
                charts.push(chart);
            }
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Price histogram
// ---------------------------------------------------------------------------

fn price_histogram(ui: &mut Ui, state: &DashboardState) {
    let table = state.table();
    let prices: Vec<f64> = state
        .view
        .price_indices
        .iter()
        .filter_map(|&i| table.get(i))
        .map(|l| l.price)
        .collect();
    let histogram = Histogram::new(&prices, HISTOGRAM_BINS);

    Plot::new("price_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Price (USD)")
        .y_axis_label("Number of vehicles")
        .show(ui, |plot_ui| {
            if let Some(h) = histogram {
                let bars = bars(&h.counts, |i| h.layout.center(i), h.layout.width);
                plot_ui.bar_chart(BarChart::new(bars).name("price").color(PRICE_BAR_COLOR));
            }
        });
}

fn bars(counts: &[usize], center: impl Fn(usize) -> f64, width: f64) -> Vec<Bar> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(center(i), c as f64).width(width))
        .collect()
}

// ---------------------------------------------------------------------------
// Price vs. mileage scatter
// ---------------------------------------------------------------------------

fn price_vs_mileage(ui: &mut Ui, state: &DashboardState) {
    let table = state.table();
    let dimension = state.color_dimension;
    let max_size = state
        .view
        .listings(table)
        .map(|(_, l)| scatter_size(l))
        .fold(0.0_f64, f64::max);

    // One series per (category, marker radius), so each keeps its own size.
    let mut series: BTreeMap<(Option<String>, u32), Vec<[f64; 2]>> = BTreeMap::new();
    for (_, listing) in state.view.listings(table) {
        let radius = marker_radius(scatter_size(listing), max_size);
        let key = (dimension.category_of(listing), (radius * 2.0).round() as u32);
        series
            .entry(key)
            .or_default()
            .push([listing.odometer, listing.price]);
    }

    let response = Plot::new("price_vs_mileage")
        .height(CHART_HEIGHT * 1.4)
        .legend(Legend::default())
        .x_axis_label("Odometer")
        .y_axis_label("Price")
        .show(ui, |plot_ui| {
            for ((category, half_steps), points) in series {
                let color = state
                    .color_map
                    .color_for(category.as_deref())
                    .gamma_multiply(POINT_OPACITY);
                let points: PlotPoints = points.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(category.as_deref().unwrap_or(UNKNOWN_LABEL))
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(half_steps as f32 / 2.0),
                );
            }

            let Some(pointer) = plot_ui.pointer_coordinate() else {
                return None;
            };
            let transform = plot_ui.transform();
            let pointer = transform.position_from_point(&pointer);
            nearest_point(
                state.view.listings(table).map(|(i, l)| {
                    (i, transform.position_from_point(&PlotPoint::new(l.odometer, l.price)))
                }),
                pointer,
                HOVER_DISTANCE,
            )
        });

    if let Some(listing) = response.inner.and_then(|i| table.get(i)) {
        response.response.on_hover_ui_at_pointer(|ui: &mut Ui| {
            hover_details(ui, listing);
        });
    }
}

/// Marker radius for a size value: marker area grows linearly with the
/// value. A zero size still gets a minimal marker.
pub fn marker_radius(size: f64, max_size: f64) -> f32 {
    if max_size <= 0.0 || size <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    let scaled = MAX_MARKER_RADIUS * (size / max_size).sqrt() as f32;
    scaled.max(MIN_MARKER_RADIUS)
}

/// Closest candidate to `pointer` within `max_distance` screen units.
pub fn nearest_point(
    candidates: impl Iterator<Item = (usize, Pos2)>,
    pointer: Pos2,
    max_distance: f32,
) -> Option<usize> {
    candidates
        .map(|(i, pos)| (i, pos.distance_sq(pointer)))
        .filter(|(_, d)| *d <= max_distance * max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn hover_details(ui: &mut Ui, listing: &Listing) {
    ui.label(format!("model: {}", listing.attribute_label("model").unwrap_or_default()));
    ui.label(format!("model_year: {}", listing.model_year_label()));
    ui.label(format!("fuel: {}", listing.attribute_label("fuel").unwrap_or_default()));
    ui.colored_label(Color32::GRAY, format!("price: {}", listing.price));
    ui.colored_label(Color32::GRAY, format!("odometer: {}", listing.odometer));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_still_draws_a_marker() {
        assert_eq!(marker_radius(0.0, 2020.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(0.0, 0.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(2020.0, 2020.0), MAX_MARKER_RADIUS);
        assert!(marker_radius(1000.0, 2020.0) < MAX_MARKER_RADIUS);
    }

    #[test]
    fn nearest_point_respects_distance() {
        let candidates = vec![
            (0, Pos2::new(0.0, 0.0)),
            (1, Pos2::new(10.0, 10.0)),
            (2, Pos2::new(3.0, 4.0)),
        ];
        assert_eq!(
            nearest_point(candidates.clone().into_iter(), Pos2::new(2.0, 3.0), 8.0),
            Some(2)
        );
        assert_eq!(
            nearest_point(candidates.into_iter(), Pos2::new(100.0, 100.0), 8.0),
            None
        );
    }
}
