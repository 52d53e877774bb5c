use super::model::YearBucket;

/// Number of bins used by both histograms.
pub const HISTOGRAM_BINS: usize = 50;

/// Equal-width bins over the range of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct BinLayout {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl BinLayout {
    /// Layout covering `values`. A constant input gets a single unit-wide bin.
    pub fn covering(values: impl IntoIterator<Item = f64>, bins: usize) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        if bins == 0 {
            return None;
        }
        if max == min {
            return Some(BinLayout {
                start: min - 0.5,
                width: 1.0,
                count: 1,
            });
        }
        Some(BinLayout {
            start: min,
            width: (max - min) / bins as f64,
            count: bins,
        })
    }

    /// Bin holding `value`; the maximum lands in the last bin.
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.start {
            return None;
        }
        let i = ((value - self.start) / self.width).floor() as usize;
        if i < self.count {
            Some(i)
        } else if value <= self.start + self.width * self.count as f64 * (1.0 + f64::EPSILON) {
            Some(self.count - 1)
        } else {
            None
        }
    }

    /// Centre of bin `i`, used as the bar position.
    pub fn center(&self, i: usize) -> f64 {
        self.start + self.width * (i as f64 + 0.5)
    }

    pub fn tally(&self, values: impl IntoIterator<Item = f64>) -> Vec<usize> {
        let mut counts = vec![0; self.count];
        for v in values {
            if let Some(i) = self.bin_of(v) {
                counts[i] += 1;
            }
        }
        counts
    }
}

/// A single-series histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub layout: BinLayout,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let layout = BinLayout::covering(values.iter().copied(), bins)?;
        let counts = layout.tally(values.iter().copied());
        Some(Histogram { layout, counts })
    }
}

/// Histogram with one layer per year bucket, layers in chronological order
/// and sharing one bin layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedHistogram {
    pub layout: BinLayout,
    pub layers: Vec<(YearBucket, Vec<usize>)>,
}

impl StackedHistogram {
    pub fn new(values: &[(YearBucket, f64)], bins: usize) -> Option<Self> {
        let layout = BinLayout::covering(values.iter().map(|(_, v)| *v), bins)?;
        let layers = YearBucket::ALL
            .into_iter()
            .filter_map(|bucket| {
                let in_bucket = values.iter().filter(|(b, _)| *b == bucket).map(|(_, v)| *v);
                let counts = layout.tally(in_bucket);
                counts.iter().any(|&c| c > 0).then_some((bucket, counts))
            })
            .collect();
        Some(StackedHistogram { layout, layers })
    }
}
