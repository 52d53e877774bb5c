use std::collections::BTreeSet;

use super::model::{Listing, ListingTable, YearBucket};

// ---------------------------------------------------------------------------
// Bucket selection
// ---------------------------------------------------------------------------

/// Year buckets currently selected in the side panel.
pub type BucketSelection = BTreeSet<YearBucket>;

/// Quantile above which prices are left out of the price histogram.
pub const PRICE_QUANTILE: f64 = 0.99;

/// Initial selection: every bucket present in the table.
pub fn init_bucket_selection(table: &ListingTable) -> BucketSelection {
    table.present_buckets().clone()
}

/// Return indices of listings whose year bucket is selected.
///
/// Listings without a bucket never match, and an empty selection matches
/// nothing.
pub fn filtered_indices(table: &ListingTable, selection: &BucketSelection) -> Vec<usize> {
    table
        .listings()
        .iter()
        .enumerate()
        .filter(|(_, l)| l.year_bucket.is_some_and(|b| selection.contains(&b)))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Everything the charts need for one filter state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    /// Listings passing the bucket filter.
    pub indices: Vec<usize>,
    /// Subset of `indices` at or below the price cutoff.
    pub price_indices: Vec<usize>,
    /// 99th percentile of price over `indices`.
    pub price_cutoff: Option<f64>,
}

impl FilteredView {
    pub fn compute(table: &ListingTable, selection: &BucketSelection) -> Self {
        let indices = filtered_indices(table, selection);
        let prices: Vec<f64> = indices
            .iter()
            .filter_map(|&i| table.get(i))
            .map(|l| l.price)
            .collect();
        let price_cutoff = quantile(&prices, PRICE_QUANTILE);
        let price_indices = match price_cutoff {
            Some(cutoff) => indices
                .iter()
                .copied()
                .filter(|&i| table.get(i).is_some_and(|l| l.price <= cutoff))
                .collect(),
            None => Vec::new(),
        };
        FilteredView {
            indices,
            price_indices,
            price_cutoff,
        }
    }

    pub fn listings<'a>(&'a self, table: &'a ListingTable) -> impl Iterator<Item = (usize, &'a Listing)> {
        self.indices.iter().filter_map(move |&i| table.get(i).map(|l| (i, l)))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Quantile with linear interpolation between the two closest ranks.
/// `None` for an empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Scatter size value: the model year, zero when it is unknown.
pub fn scatter_size(listing: &Listing) -> f64 {
    listing.model_year.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::CleaningReport;

    fn listing(price: f64, year: Option<f64>) -> Listing {
        Listing {
            price,
            odometer: 1000.0,
            model_year: year,
            year_bucket: year.and_then(YearBucket::from_model_year),
            attributes: BTreeMap::new(),
        }
    }

    fn table(listings: Vec<Listing>) -> ListingTable {
        ListingTable::new(listings, Vec::new(), CleaningReport::default())
    }

    #[test]
    fn selection_keeps_only_selected_buckets() {
        let t = table(vec![
            listing(1.0, Some(2012.0)),
            listing(2.0, Some(2016.0)),
            listing(3.0, Some(2005.0)),
            listing(4.0, None),
            listing(5.0, Some(2019.0)),
            listing(6.0, Some(2014.0)),
        ]);
        let selection: BucketSelection = [YearBucket::Early2010s, YearBucket::Mid2010s].into();

        let indices = filtered_indices(&t, &selection);
        assert_eq!(indices, vec![0, 1, 5]);
        for i in indices {
            let bucket = t.get(i).and_then(|l| l.year_bucket);
            assert!(matches!(
                bucket,
                Some(YearBucket::Early2010s) | Some(YearBucket::Mid2010s)
            ));
        }
    }

    #[test]
    fn default_selection_excludes_rows_without_bucket() {
        let t = table(vec![
            listing(1.0, Some(1995.0)),
            listing(2.0, None),
            listing(3.0, Some(2030.0)),
        ]);
        let selection = init_bucket_selection(&t);
        assert_eq!(selection, [YearBucket::Nineties].into());
        assert_eq!(filtered_indices(&t, &selection), vec![0]);
    }

    #[test]
    fn empty_selection_gives_empty_view() {
        let t = table(vec![listing(1.0, Some(1995.0))]);
        let view = FilteredView::compute(&t, &BucketSelection::new());
        assert!(view.is_empty());
        assert!(view.price_indices.is_empty());
        assert_eq!(view.price_cutoff, None);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.99), Some(7.0));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(2.5));
        assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 1.0), Some(4.0));
        let q = quantile(&[0.0, 10.0], 0.99).unwrap();
        assert!((q - 9.9).abs() < 1e-9);
    }

    #[test]
    fn price_view_drops_top_percent() {
        let listings: Vec<Listing> = (1..=1000)
            .map(|i| listing(i as f64 * 100.0, Some(2016.0)))
            .collect();
        let t = table(listings);
        let view = FilteredView::compute(&t, &init_bucket_selection(&t));

        assert_eq!(view.len(), 1000);
        assert_eq!(view.price_indices.len(), 990);
        let cutoff = view.price_cutoff.unwrap();
        assert!(cutoff > 99_000.0 && cutoff < 99_100.0);
        assert!(view
            .price_indices
            .iter()
            .all(|&i| t.get(i).unwrap().price <= 99_000.0));
    }

    #[test]
    fn price_cutoff_follows_the_filtered_subset() {
        let mut listings: Vec<Listing> = (1..=100)
            .map(|i| listing(i as f64, Some(2016.0)))
            .collect();
        listings.push(listing(1_000_000.0, Some(1995.0)));
        let t = table(listings);

        let all = FilteredView::compute(&t, &init_bucket_selection(&t));
        let recent = FilteredView::compute(&t, &[YearBucket::Mid2010s].into());

        assert!(all.price_cutoff.unwrap() > recent.price_cutoff.unwrap());
        assert_eq!(recent.len(), 100);
        assert_eq!(recent.price_indices.len(), 99);
    }

    #[test]
    fn missing_model_year_has_zero_size() {
        assert_eq!(scatter_size(&listing(1.0, None)), 0.0);
        assert_eq!(scatter_size(&listing(1.0, Some(2011.0))), 2011.0);
    }
}
