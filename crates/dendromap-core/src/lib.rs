#![forbid(unsafe_code)]

//! Newick parser, tree hierarchy and heatmap input model (headless).
//!
//! Design goals:
//! - an explicit, index-based hierarchy (no parent/child ownership cycles)
//! - strict parsing by default, with an opt-in lenient mode for legacy service output
//! - deterministic, testable outputs

pub mod cells;
pub mod error;
pub mod hierarchy;
pub mod input;
pub mod newick;

pub use cells::HeatmapCell;
pub use error::{Error, Result};
pub use hierarchy::{Hierarchy, HierarchyNode, Link, NewickDatum, NodeId};
pub use input::{
    DendroHeatmapInput, ParsedDendroHeatmap, ParsedTree, parse_dendro_heatmap, parse_input,
    parse_input_sync,
};
pub use newick::{TreeNode, parse_newick};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub lenient: bool,
}

impl ParseOptions {
    /// Strict parsing (errors are returned).
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    /// Lenient parsing: malformed trees keep their partial structure and duplicate cells are
    /// dropped instead of returning an error.
    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}
