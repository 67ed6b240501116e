//! Side table of per-gene box-plot series driven by row label clicks.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const SERIES_COLORS: &[&str] = &["grey", "#bb453e", "#1c677f", "#078c84", "#b4486b"];
pub const FALLBACK_COLOR: &str = "black";

/// Series color by insertion position.
pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS.get(index).copied().unwrap_or(FALLBACK_COLOR)
}

/// Per-tissue expression samples of one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueExpression {
    #[serde(rename = "tissueId")]
    pub tissue_id: String,
    pub data: Vec<f64>,
}

/// Supplies expression samples for a gene; implemented by the embedding application.
pub trait ExpressionSource {
    fn gene_expression(&self, gencode_id: &str) -> std::result::Result<Vec<TissueExpression>, String>;
}

impl<F> ExpressionSource for F
where
    F: Fn(&str) -> std::result::Result<Vec<TissueExpression>, String>,
{
    fn gene_expression(&self, gencode_id: &str) -> std::result::Result<Vec<TissueExpression>, String> {
        self(gencode_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLine {
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMarker {
    pub color: String,
}

/// One box series in the plotting library's trace shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub line: TraceLine,
    pub marker: TraceMarker,
}

/// A tissue in heatmap column order with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueLabel {
    pub id: String,
    pub name: String,
}

impl BoxplotTrace {
    /// Flattens samples tissue by tissue in `tissue_order`; tissues without samples are skipped.
    pub fn from_expression(
        name: &str,
        expression: &[TissueExpression],
        tissue_order: &[TissueLabel],
        use_log: bool,
        color: &str,
    ) -> Self {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for tissue in tissue_order {
            let Some(samples) = expression.iter().find(|e| e.tissue_id == tissue.id) else {
                continue;
            };
            for &v in &samples.data {
                x.push(tissue.name.clone());
                y.push(if use_log { (v + 1.0).log10() } else { v });
            }
        }
        Self {
            x,
            y,
            name: name.to_string(),
            kind: "box".to_string(),
            line: TraceLine { width: 1.0 },
            marker: TraceMarker {
                color: color.to_string(),
            },
        }
    }
}

/// What a click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    Unchanged,
}

/// Insertion-ordered `gencode id -> trace` table plus the set of clicked row labels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoxplotSelection {
    traces: IndexMap<String, BoxplotTrace>,
    clicked: Vec<String>,
    pub use_log: bool,
}

impl BoxplotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traces(&self) -> impl Iterator<Item = &BoxplotTrace> {
        self.traces.values()
    }

    pub fn gencode_ids(&self) -> impl Iterator<Item = &str> {
        self.traces.keys().map(String::as_str)
    }

    pub fn contains(&self, gencode_id: &str) -> bool {
        self.traces.contains_key(gencode_id)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Row labels currently marked `clicked`.
    pub fn clicked_labels(&self) -> &[String] {
        &self.clicked
    }

    pub fn is_clicked(&self, label: &str) -> bool {
        self.clicked.iter().any(|l| l == label)
    }

    /// Drops every series and clicked label.
    pub fn clear(&mut self) {
        self.traces.clear();
        self.clicked.clear();
    }

    /// Plain click toggles `label` exclusively; Alt-click keeps the existing selection.
    pub fn click_label(&mut self, label: &str, alt: bool) {
        if alt {
            if !self.is_clicked(label) {
                self.clicked.push(label.to_string());
            }
            return;
        }
        if self.is_clicked(label) {
            self.clicked.retain(|l| l != label);
        } else {
            self.clear();
            self.clicked.push(label.to_string());
        }
    }

    /// Removes the series when present, otherwise fetches and appends it.
    pub fn toggle(
        &mut self,
        gencode_id: &str,
        tissue_order: &[TissueLabel],
        source: &dyn ExpressionSource,
    ) -> Result<SelectionChange> {
        if self.traces.shift_remove(gencode_id).is_some() {
            self.recolor();
            tracing::debug!(gencode_id, remaining = self.traces.len(), "removed box-plot series");
            return Ok(SelectionChange::Removed);
        }

        let expression =
            source
                .gene_expression(gencode_id)
                .map_err(|message| Error::Expression {
                    gencode_id: gencode_id.to_string(),
                    message,
                })?;
        let color = series_color(self.traces.len());
        let trace =
            BoxplotTrace::from_expression(gencode_id, &expression, tissue_order, self.use_log, color);
        self.traces.insert(gencode_id.to_string(), trace);
        tracing::debug!(gencode_id, color, "added box-plot series");
        Ok(SelectionChange::Added)
    }

    /// A row label click: updates the clicked labels, then toggles the gene's series.
    pub fn click(
        &mut self,
        gencode_id: &str,
        alt: bool,
        tissue_order: &[TissueLabel],
        source: &dyn ExpressionSource,
    ) -> Result<SelectionChange> {
        // A failed fetch leaves the table as it was before the click.
        let traces = self.traces.clone();
        let clicked = self.clicked.clone();
        self.click_label(gencode_id, alt);
        let change = match self.toggle(gencode_id, tissue_order, source) {
            Ok(change) => change,
            Err(err) => {
                self.traces = traces;
                self.clicked = clicked;
                return Err(err);
            }
        };
        if change == SelectionChange::Removed {
            self.clicked.retain(|l| l != gencode_id);
        }
        Ok(change)
    }

    fn recolor(&mut self) {
        for (i, trace) in self.traces.values_mut().enumerate() {
            trace.marker.color = series_color(i).to_string();
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let traces: Vec<&BoxplotTrace> = self.traces.values().collect();
        Ok(serde_json::to_string(&traces)?)
    }
}
