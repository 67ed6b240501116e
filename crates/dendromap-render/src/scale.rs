//! Linear, band and quantile scales (the subset of d3-scale the charts use).

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// A degenerate domain maps everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = if d1 == d0 {
            0.5
        } else {
            (value - d0) / (d1 - d0)
        };
        r0 + (r1 - r0) * t
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = if r1 == r0 {
            0.5
        } else {
            (pixel - r0) / (r1 - r0)
        };
        d0 + (d1 - d0) * t
    }
}

/// Ordinal scale mapping each label to the start of an evenly spaced band.
///
/// Duplicate labels collapse onto their first occurrence. `padding` is applied both between
/// bands and on the outer edges, with the bands centered in the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    domain: IndexSet<String>,
    range: [f64; 2],
    padding: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    pub fn new<I, S>(domain: I, range: [f64; 2], padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scale = Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range,
            padding: padding.clamp(0.0, 1.0),
            step: 0.0,
            bandwidth: 0.0,
            start: 0.0,
        };
        scale.rescale();
        scale
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let [r0, r1] = self.range;
        let (start, stop) = if r1 < r0 { (r1, r0) } else { (r0, r1) };
        let step = (stop - start) / (n - self.padding + self.padding * 2.0).max(1.0);
        self.start = start + (stop - start - step * (n - self.padding)) * 0.5;
        self.step = step;
        self.bandwidth = step * (1.0 - self.padding);
    }

    pub fn apply(&self, label: &str) -> Option<f64> {
        let index = self.domain.get_index_of(label)?;
        Some(self.start + self.step * index as f64)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.domain.get_index_of(label)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    pub fn domain_vec(&self) -> Vec<String> {
        self.domain.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleInput<'a> {
    Number(f64),
    Label(&'a str),
}

impl From<f64> for ScaleInput<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<'a> From<&'a str> for ScaleInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Label(value)
    }
}

/// A dendrogram axis: continuous distance or categorical leaves, picked by orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scale {
    Linear(LinearScale),
    Band(BandScale),
}

impl Scale {
    /// Returns `None` when the input kind does not match the scale or the label is unknown.
    pub fn apply<'a>(&self, input: impl Into<ScaleInput<'a>>) -> Option<f64> {
        match (self, input.into()) {
            (Self::Linear(s), ScaleInput::Number(v)) => Some(s.apply(v)),
            (Self::Band(s), ScaleInput::Label(l)) => s.apply(l),
            _ => None,
        }
    }

    pub fn range(&self) -> [f64; 2] {
        match self {
            Self::Linear(s) => s.range,
            Self::Band(s) => s.range(),
        }
    }

    /// Zero for linear scales.
    pub fn bandwidth(&self) -> f64 {
        match self {
            Self::Linear(_) => 0.0,
            Self::Band(s) => s.bandwidth(),
        }
    }

    pub fn as_linear(&self) -> Option<&LinearScale> {
        match self {
            Self::Linear(s) => Some(s),
            Self::Band(_) => None,
        }
    }

    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Self::Band(s) => Some(s),
            Self::Linear(_) => None,
        }
    }
}

/// Quantile of an ascending slice with linear interpolation between order statistics (R-7).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let v0 = sorted[i0];
    let v1 = sorted[i0 + 1];
    Some(v0 + (v1 - v0) * (i - i0 as f64))
}

/// Discrete scale splitting a sample domain into `range.len()` equally populated groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileScale<R> {
    domain: Vec<f64>,
    range: Vec<R>,
    thresholds: Vec<f64>,
}

impl<R: Clone> QuantileScale<R> {
    pub fn new(domain: impl IntoIterator<Item = f64>, range: Vec<R>) -> Self {
        let mut domain: Vec<f64> = domain.into_iter().filter(|v| !v.is_nan()).collect();
        domain.sort_by(f64::total_cmp);
        let mut scale = Self {
            domain,
            range,
            thresholds: Vec::new(),
        };
        scale.rescale();
        scale
    }

    fn rescale(&mut self) {
        let n = self.range.len();
        self.thresholds = (1..n.max(1))
            .filter_map(|i| quantile_sorted(&self.domain, i as f64 / n as f64))
            .collect();
    }

    pub fn apply(&self, value: f64) -> Option<&R> {
        if value.is_nan() {
            return None;
        }
        let idx = self.thresholds.partition_point(|t| *t <= value);
        self.range.get(idx)
    }

    /// The `range.len() - 1` breakpoints between output buckets.
    pub fn quantiles(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn range(&self) -> &[R] {
        &self.range
    }
}
