//! Wire format consumed from the expression service and its validation.

use crate::cells::HeatmapCell;
use crate::newick::{TreeNode, parse_newick};
use crate::{Error, ParseOptions, Result};
use serde::{Deserialize, Serialize};

/// Prefix the clustering service uses instead of a tree when there are too few rows or columns.
pub const NOT_ENOUGH_DATA: &str = "Not enough data";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DendroHeatmapInput {
    #[serde(default, rename = "columnTree", skip_serializing_if = "Option::is_none")]
    pub column_tree: Option<String>,
    #[serde(default, rename = "rowTree", skip_serializing_if = "Option::is_none")]
    pub row_tree: Option<String>,
    #[serde(default, alias = "heatmapData", alias = "heatmapCells")]
    pub heatmap: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedTree {
    pub newick: String,
    pub root: TreeNode,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedDendroHeatmap {
    #[serde(rename = "columnTree")]
    pub column_tree: Option<ParsedTree>,
    #[serde(rename = "rowTree")]
    pub row_tree: Option<ParsedTree>,
    pub heatmap: Vec<HeatmapCell>,
}

/// Returns `None` for absent, blank or "Not enough data" tree strings.
pub fn usable_tree(raw: Option<&str>) -> Option<&str> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.starts_with(NOT_ENOUGH_DATA) {
        return None;
    }
    Some(raw)
}

fn parse_tree(raw: Option<&str>, options: ParseOptions) -> Result<Option<ParsedTree>> {
    let Some(newick) = usable_tree(raw) else {
        return Ok(None);
    };
    let root = parse_newick(newick, options)?;
    Ok(Some(ParsedTree {
        newick: newick.to_string(),
        root,
    }))
}

/// Enforces unique `(x, y)` pairs: an error in strict mode, first occurrence wins otherwise.
pub fn dedup_cells(cells: Vec<HeatmapCell>, options: ParseOptions) -> Result<Vec<HeatmapCell>> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        if seen.insert((cell.x.clone(), cell.y.clone())) {
            out.push(cell);
            continue;
        }
        if !options.lenient {
            return Err(Error::DuplicateCell {
                x: cell.x,
                y: cell.y,
            });
        }
        tracing::warn!(x = %cell.x, y = %cell.y, "dropping duplicate heatmap cell");
    }
    Ok(out)
}

pub fn parse_dendro_heatmap(
    input: DendroHeatmapInput,
    options: ParseOptions,
) -> Result<ParsedDendroHeatmap> {
    for cell in &input.heatmap {
        if !cell.value.is_finite() {
            return Err(Error::InvalidInput {
                message: format!("non-finite value for cell ({}, {})", cell.x, cell.y),
            });
        }
    }

    let column_tree = parse_tree(input.column_tree.as_deref(), options)?;
    let row_tree = parse_tree(input.row_tree.as_deref(), options)?;
    let heatmap = dedup_cells(input.heatmap, options)?;

    tracing::debug!(
        cells = heatmap.len(),
        column_leaves = column_tree.as_ref().map(|t| t.root.leaf_count()),
        row_leaves = row_tree.as_ref().map(|t| t.root.leaf_count()),
        "parsed dendro-heatmap input"
    );

    Ok(ParsedDendroHeatmap {
        column_tree,
        row_tree,
        heatmap,
    })
}

/// Deserializes and validates a JSON document in the [`DendroHeatmapInput`] shape.
pub fn parse_input_sync(text: &str, options: ParseOptions) -> Result<ParsedDendroHeatmap> {
    let input: DendroHeatmapInput = serde_json::from_str(text)?;
    parse_dendro_heatmap(input, options)
}

/// Runtime-agnostic async variant of [`parse_input_sync`]; no executor specifics are required.
pub async fn parse_input(text: &str, options: ParseOptions) -> Result<ParsedDendroHeatmap> {
    parse_input_sync(text, options)
}
