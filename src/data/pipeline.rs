use std::collections::BTreeMap;
use std::path::Path;

use super::loader::{LoadError, load_file};
use super::model::{CellValue, CleaningReport, Listing, ListingTable, RawTable, YearBucket};

pub const PRICE: &str = "price";
pub const ODOMETER: &str = "odometer";
pub const MODEL_YEAR: &str = "model_year";

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a file and run every cleaning step on it.
pub fn load_listings(path: &Path) -> Result<ListingTable, LoadError> {
    let raw = load_file(path)?;
    let table = clean(raw, &path.display().to_string())?;
    let report = table.report();
    log::info!(
        "Loaded {} listings from {} ({} dropped for missing price/odometer, {} without year bucket)",
        report.rows_retained,
        report.source,
        report.rows_dropped,
        report.rows_without_bucket
    );
    Ok(table)
}

/// Normalize, coerce, drop incomplete rows and bucket by model year.
pub fn clean(raw: RawTable, source: &str) -> Result<ListingTable, LoadError> {
    let columns = normalize_headers(&raw.headers);
    let index = column_index(&columns);

    let price_idx = *index
        .get(PRICE)
        .ok_or_else(|| LoadError::MissingColumn(PRICE.to_string()))?;
    let odometer_idx = *index
        .get(ODOMETER)
        .ok_or_else(|| LoadError::MissingColumn(ODOMETER.to_string()))?;
    let year_idx = index.get(MODEL_YEAR).copied();

    // Pass-through columns: everything except the coerced fields, first
    // occurrence of each normalized name only.
    let passthrough: Vec<(usize, &str)> = index
        .iter()
        .filter(|(name, _)| ![PRICE, ODOMETER, MODEL_YEAR].contains(*name))
        .map(|(name, i)| (*i, *name))
        .collect();

    let rows_read = raw.rows.len();
    let mut listings = Vec::with_capacity(rows_read);

    for row in &raw.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&NULL_CELL);

        let (Some(price), Some(odometer)) = (cell(price_idx).to_number(), cell(odometer_idx).to_number())
        else {
            continue;
        };
        let model_year = year_idx.and_then(|i| cell(i).to_number());

        let attributes: BTreeMap<String, CellValue> = passthrough
            .iter()
            .map(|(i, name)| (name.to_string(), cell(*i).clone()))
            .collect();

        listings.push(Listing {
            price,
            odometer,
            model_year,
            year_bucket: model_year.and_then(YearBucket::from_model_year),
            attributes,
        });
    }

    let report = CleaningReport {
        source: source.to_string(),
        rows_read,
        rows_dropped: rows_read - listings.len(),
        ..Default::default()
    };

    Ok(ListingTable::new(listings, dedup(columns), report))
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Trim, lower-case and replace spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_column_name(h)).collect()
}

/// Normalized name → position. A repeated name keeps its first position.
fn column_index(columns: &[String]) -> BTreeMap<&str, usize> {
    let mut index = BTreeMap::new();
    for (i, name) in columns.iter().enumerate() {
        if index.contains_key(name.as_str()) {
            log::warn!("Column '{name}' appears more than once after normalization; keeping the first");
            continue;
        }
        index.insert(name.as_str(), i);
    }
    index
}

fn dedup(columns: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(columns.len());
    for name in columns {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
