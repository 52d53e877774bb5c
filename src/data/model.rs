use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric interpretation of the cell. Unparseable or non-finite
    /// values become `None` instead of an error.
    pub fn to_number(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }
}

// ---------------------------------------------------------------------------
// RawTable – file contents before cleaning
// ---------------------------------------------------------------------------

/// Rows exactly as loaded, with the header names as found in the file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Each row has one cell per header.
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// YearBucket – ordered model-year category
// ---------------------------------------------------------------------------

/// Bin edges for [`YearBucket`]. Bins are right-closed, the first one also
/// includes its lower edge.
pub const YEAR_BOUNDARIES: [f64; 9] = [
    1900.0, 1990.0, 2000.0, 2010.0, 2015.0, 2018.0, 2020.0, 2022.0, 2025.0,
];

/// Model-year range. Declaration order is chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum YearBucket {
    #[serde(rename = "<1990")]
    Before1990,
    #[serde(rename = "1990s")]
    Nineties,
    #[serde(rename = "2000s")]
    TwoThousands,
    #[serde(rename = "2010-14")]
    Early2010s,
    #[serde(rename = "2015-17")]
    Mid2010s,
    #[serde(rename = "2018-19")]
    Late2010s,
    #[serde(rename = "2020-21")]
    Early2020s,
    #[serde(rename = "2022+")]
    Recent,
}

impl YearBucket {
    pub const ALL: [YearBucket; 8] = [
        YearBucket::Before1990,
        YearBucket::Nineties,
        YearBucket::TwoThousands,
        YearBucket::Early2010s,
        YearBucket::Mid2010s,
        YearBucket::Late2010s,
        YearBucket::Early2020s,
        YearBucket::Recent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YearBucket::Before1990 => "<1990",
            YearBucket::Nineties => "1990s",
            YearBucket::TwoThousands => "2000s",
            YearBucket::Early2010s => "2010-14",
            YearBucket::Mid2010s => "2015-17",
            YearBucket::Late2010s => "2018-19",
            YearBucket::Early2020s => "2020-21",
            YearBucket::Recent => "2022+",
        }
    }

    /// Bucket for a model year. Years on an inner edge belong to the lower
    /// bucket; anything outside `[1900, 2025]` has no bucket.
    pub fn from_model_year(year: f64) -> Option<Self> {
        let first = YEAR_BOUNDARIES[0];
        let last = YEAR_BOUNDARIES[YEAR_BOUNDARIES.len() - 1];
        if !year.is_finite() || year < first || year > last {
            return None;
        }
        YEAR_BOUNDARIES[1..]
            .iter()
            .zip(Self::ALL)
            .find(|(upper, _)| year <= **upper)
            .map(|(_, bucket)| bucket)
    }
}

impl fmt::Display for YearBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ColorDimension – categorical field used to colour the scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDimension {
    #[default]
    YearBucket,
    Type,
    Fuel,
    Condition,
}

impl ColorDimension {
    pub const ALL: [ColorDimension; 4] = [
        ColorDimension::YearBucket,
        ColorDimension::Type,
        ColorDimension::Fuel,
        ColorDimension::Condition,
    ];

    /// Normalized column name backing this dimension.
    pub fn column(self) -> &'static str {
        match self {
            ColorDimension::YearBucket => "year_bucket",
            ColorDimension::Type => "type",
            ColorDimension::Fuel => "fuel",
            ColorDimension::Condition => "condition",
        }
    }

    /// Category of a listing along this dimension, `None` when the
    /// attribute is missing.
    pub fn category_of(self, listing: &Listing) -> Option<String> {
        match self {
            ColorDimension::YearBucket => listing.year_bucket.map(|b| b.label().to_string()),
            other => listing.attribute_label(other.column()),
        }
    }
}

impl fmt::Display for ColorDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Listing – one cleaned row
// ---------------------------------------------------------------------------

/// A single vehicle advertisement after cleaning.
#[derive(Debug, Clone)]
pub struct Listing {
    pub price: f64,
    pub odometer: f64,
    pub model_year: Option<f64>,
    pub year_bucket: Option<YearBucket>,
    /// Every other column, keyed by normalized name, untouched.
    pub attributes: BTreeMap<String, CellValue>,
}

impl Listing {
    /// Display text of a pass-through attribute, `None` if absent or null.
    pub fn attribute_label(&self, column: &str) -> Option<String> {
        self.attributes
            .get(column)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
    }

    /// Model year as shown to users: whole years without a fraction.
    pub fn model_year_label(&self) -> String {
        match self.model_year {
            Some(y) if y.fract() == 0.0 => format!("{y:.0}"),
            Some(y) => format!("{y}"),
            None => "unknown".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ListingTable – the cleaned dataset
// ---------------------------------------------------------------------------

/// Per-load statistics of the cleaning steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub source: String,
    pub columns: Vec<String>,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_retained: usize,
    pub rows_without_bucket: usize,
    /// Chronologically ordered (bucket, row count) pairs.
    pub bucket_counts: Vec<(YearBucket, usize)>,
}

/// The cleaned, immutable dataset.
#[derive(Debug, Clone)]
pub struct ListingTable {
    listings: Vec<Listing>,
    /// Normalized column names in file order (excluding `year_bucket`).
    columns: Vec<String>,
    present_buckets: BTreeSet<YearBucket>,
    report: CleaningReport,
}

impl ListingTable {
    pub fn new(listings: Vec<Listing>, columns: Vec<String>, mut report: CleaningReport) -> Self {
        let mut counts: BTreeMap<YearBucket, usize> = BTreeMap::new();
        for listing in &listings {
            if let Some(bucket) = listing.year_bucket {
                *counts.entry(bucket).or_default() += 1;
            }
        }
        let present_buckets = counts.keys().copied().collect();

        report.columns = columns.clone();
        report.rows_retained = listings.len();
        report.rows_without_bucket = listings.iter().filter(|l| l.year_bucket.is_none()).count();
        report.bucket_counts = counts.into_iter().collect();

        ListingTable {
            listings,
            columns,
            present_buckets,
            report,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, index: usize) -> Option<&Listing> {
        self.listings.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Buckets that occur at least once, chronologically.
    pub fn present_buckets(&self) -> &BTreeSet<YearBucket> {
        &self.present_buckets
    }

    pub fn report(&self) -> &CleaningReport {
        &self.report
    }

    /// Distinct categories along a colour dimension. Year buckets come in
    /// chronological order, other attributes alphabetically.
    pub fn categories(&self, dimension: ColorDimension) -> Vec<String> {
        match dimension {
            ColorDimension::YearBucket => self
                .present_buckets
                .iter()
                .map(|b| b.label().to_string())
                .collect(),
            other => self
                .listings
                .iter()
                .filter_map(|l| other.category_of(l))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
