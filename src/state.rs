use crate::color::ColorMap;
use crate::data::filter::{BucketSelection, FilteredView, init_bucket_selection};
use crate::data::model::{ColorDimension, ListingTable, YearBucket};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full UI state of a loaded dataset, independent of rendering.
pub struct DashboardState {
    /// Cleaned listings. Never mutated after construction.
    table: ListingTable,

    /// Year buckets ticked in the side panel.
    pub selection: BucketSelection,

    /// Rows and price subset for the current selection (cached).
    pub view: FilteredView,

    /// Categorical field used to colour the scatter.
    pub color_dimension: ColorDimension,

    /// Active colour map for `color_dimension`.
    pub color_map: ColorMap,
}

impl DashboardState {
    /// Take ownership of a cleaned table with everything selected.
    pub fn new(table: ListingTable) -> Self {
        let selection = init_bucket_selection(&table);
        let view = FilteredView::compute(&table, &selection);
        let color_dimension = ColorDimension::default();
        let color_map = ColorMap::for_table(&table, color_dimension);
        Self {
            table,
            selection,
            view,
            color_dimension,
            color_map,
        }
    }

    pub fn table(&self) -> &ListingTable {
        &self.table
    }

    /// Recompute `view` after a selection change.
    pub fn refilter(&mut self) {
        self.view = FilteredView::compute(&self.table, &self.selection);
        log::debug!(
            "{} of {} listings visible, price cutoff {:?}",
            self.view.len(),
            self.table.len(),
            self.view.price_cutoff
        );
    }

    /// Set colour dimension and rebuild the map.
    pub fn set_color_dimension(&mut self, dimension: ColorDimension) {
        if dimension == self.color_dimension {
            return;
        }
        self.color_dimension = dimension;
        self.color_map = ColorMap::for_table(&self.table, dimension);
    }

    /// Toggle a single bucket in the selection.
    pub fn toggle_bucket(&mut self, bucket: YearBucket) {
        if !self.selection.remove(&bucket) {
            self.selection.insert(bucket);
        }
        self.refilter();
    }

    /// Select every bucket present in the table.
    pub fn select_all(&mut self) {
        self.selection = init_bucket_selection(&self.table);
        self.refilter();
    }

    /// Deselect all buckets.
    pub fn select_none(&mut self) {
        self.selection.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::{CellValue, CleaningReport, Listing};

    fn table() -> ListingTable {
        let rows = [
            (2012.0, "gas"),
            (2016.0, "diesel"),
            (1995.0, "gas"),
            (2016.0, "electric"),
        ];
        let listings = rows
            .iter()
            .enumerate()
            .map(|(i, (year, fuel))| Listing {
                price: 1000.0 * (i + 1) as f64,
                odometer: 10_000.0,
                model_year: Some(*year),
                year_bucket: YearBucket::from_model_year(*year),
                attributes: BTreeMap::from([("fuel".to_string(), CellValue::String(fuel.to_string()))]),
            })
            .collect();
        ListingTable::new(listings, Vec::new(), CleaningReport::default())
    }

    #[test]
    fn starts_with_everything_selected() {
        let state = DashboardState::new(table());
        assert_eq!(state.view.len(), 4);
        assert_eq!(state.selection.len(), 3);
        assert_eq!(state.color_dimension, ColorDimension::YearBucket);
    }

    #[test]
    fn toggling_and_bulk_selection_refilter() {
        let mut state = DashboardState::new(table());

        state.toggle_bucket(YearBucket::Mid2010s);
        assert_eq!(state.view.indices, vec![0, 2]);

        state.toggle_bucket(YearBucket::Mid2010s);
        assert_eq!(state.view.len(), 4);

        state.select_none();
        assert!(state.view.is_empty());
        assert!(state.view.price_indices.is_empty());

        state.select_all();
        assert_eq!(state.view.len(), 4);
        assert_eq!(state.table().len(), 4);
    }

    #[test]
    fn colour_dimension_rebuilds_map() {
        let mut state = DashboardState::new(table());
        state.set_color_dimension(ColorDimension::Fuel);
        let names: Vec<_> = state
            .color_map
            .legend_entries()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["diesel", "electric", "gas"]);
        assert_eq!(state.color_map.dimension, ColorDimension::Fuel);
    }
}
