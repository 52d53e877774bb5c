use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{ColorDimension, ListingTable};

/// Single colour of the price histogram (`#0072B2`).
pub const PRICE_BAR_COLOR: Color32 = Color32::from_rgb(0x00, 0x72, 0xB2);

/// Colour of points whose category is missing.
pub const UNKNOWN_COLOR: Color32 = Color32::GRAY;

/// Legend label of points whose category is missing.
pub const UNKNOWN_LABEL: &str = "unknown";

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    hue_wheel(n, 0.75, 0.55)
}

/// Softer variant of [`generate_palette`] for stacked bars.
pub fn pastel_palette(n: usize) -> Vec<Color32> {
    hue_wheel(n, 0.60, 0.78)
}

fn hue_wheel(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a colour dimension to distinct colours, keeping
/// the categories in legend order.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub dimension: ColorDimension,
    order: Vec<String>,
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map for the given categories, in the given order.
    pub fn new(dimension: ColorDimension, categories: Vec<String>) -> Self {
        let palette = generate_palette(categories.len());
        let mapping = categories.iter().cloned().zip(palette).collect();
        ColorMap {
            dimension,
            order: categories,
            mapping,
        }
    }

    /// Colour map over every category of `dimension` in the table.
    pub fn for_table(table: &ListingTable, dimension: ColorDimension) -> Self {
        Self::new(dimension, table.categories(dimension))
    }

    /// Look up the colour for a category; missing categories are grey.
    pub fn color_for(&self, category: Option<&str>) -> Color32 {
        category
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(UNKNOWN_COLOR)
    }

    /// Return the legend entries (category → colour) in legend order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|c| (c.clone(), self.color_for(Some(c))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let colours = generate_palette(8);
        assert_eq!(colours.len(), 8);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(pastel_palette(3).len(), 3);
    }

    #[test]
    fn legend_keeps_given_order() {
        let map = ColorMap::new(
            ColorDimension::YearBucket,
            vec!["<1990".into(), "2010-14".into(), "2022+".into()],
        );
        let names: Vec<_> = map.legend_entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["<1990", "2010-14", "2022+"]);
    }

    #[test]
    fn unknown_categories_are_grey() {
        let map = ColorMap::new(ColorDimension::Fuel, vec!["gas".into()]);
        assert_eq!(map.color_for(None), UNKNOWN_COLOR);
        assert_eq!(map.color_for(Some("hydrogen")), UNKNOWN_COLOR);
        assert_ne!(map.color_for(Some("gas")), UNKNOWN_COLOR);
    }
}
