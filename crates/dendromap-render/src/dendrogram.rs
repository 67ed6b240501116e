//! Rectangular dendrogram layout for a clustered Newick tree.

use crate::model::{
    AxisLayout, AxisTick, DendrogramLayout, DendrogramNodeLayout, LineSegment, NodeMarkerLayout,
};
use crate::scale::{BandScale, LinearScale, Scale};
use crate::{Error, Result};
use dendromap_core::{
    Hierarchy, HierarchyNode, NewickDatum, NodeId, ParseOptions, TreeNode, parse_newick,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

pub const BAND_PADDING: f64 = 0.05;
pub const MARKER_RADIUS: f64 = 2.0;
pub const MARKER_HOVER_RADIUS: f64 = 6.0;
pub const MARKER_FILL: &str = "#8DCDC1";
pub const MARKER_HOVER_FILL: &str = "red";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Leaves stacked along Y, distance along X (row tree).
    Horizontal,
    /// Leaves spread along X, distance along Y (column tree).
    Vertical,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Self::Horizontal),
            "v" | "vertical" => Ok(Self::Vertical),
            other => Err(format!("unknown dendrogram orientation: {other}")),
        }
    }
}

/// `(value, branch length)` ascending; a missing length ties.
fn compare_nodes(a: &HierarchyNode<NewickDatum>, b: &HierarchyNode<NewickDatum>) -> Ordering {
    a.value
        .total_cmp(&b.value)
        .then_with(|| match (a.data.length, b.data.length) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        })
}

#[derive(Debug, Clone)]
pub struct Dendrogram {
    orientation: Orientation,
    root: TreeNode,
    hierarchy: Hierarchy<NewickDatum>,
    leaves: Vec<NodeId>,
    x_scale: Option<Scale>,
    y_scale: Option<Scale>,
    width: f64,
    height: f64,
}

impl Dendrogram {
    pub fn new(newick: &str, orientation: Orientation, options: ParseOptions) -> Result<Self> {
        let root = parse_newick(newick, options)?;
        Ok(Self::from_tree(root, orientation))
    }

    pub fn from_tree(root: TreeNode, orientation: Orientation) -> Self {
        let mut hierarchy = Hierarchy::from_newick(&root);
        hierarchy
            .sum(|d| if d.has_branchset { 0.0 } else { 1.0 })
            .sort(compare_nodes);

        let mut leaves = hierarchy.leaves();
        leaves.sort_by(|&a, &b| compare_nodes(hierarchy.node(a), hierarchy.node(b)));

        tracing::debug!(
            leaves = leaves.len(),
            nodes = hierarchy.len(),
            ?orientation,
            "built dendrogram"
        );

        Self {
            orientation,
            root,
            hierarchy,
            leaves,
            x_scale: None,
            y_scale: None,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn tree(&self) -> &TreeNode {
        &self.root
    }

    pub fn hierarchy(&self) -> &Hierarchy<NewickDatum> {
        &self.hierarchy
    }

    /// Leaf ids ordered by `(value, branch length)`.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn x_scale(&self) -> Option<&Scale> {
        self.x_scale.as_ref()
    }

    pub fn y_scale(&self) -> Option<&Scale> {
        self.y_scale.as_ref()
    }

    fn category_scale(&self) -> Option<&BandScale> {
        match self.orientation {
            Orientation::Horizontal => self.y_scale.as_ref()?.as_band(),
            Orientation::Vertical => self.x_scale.as_ref()?.as_band(),
        }
    }

    fn distance_scale(&self) -> Option<&LinearScale> {
        match self.orientation {
            Orientation::Horizontal => self.x_scale.as_ref()?.as_linear(),
            Orientation::Vertical => self.y_scale.as_ref()?.as_linear(),
        }
    }

    /// Leaf names in the order the band scale lays them out; empty before [`Dendrogram::draw`].
    pub fn category_domain(&self) -> Vec<String> {
        self.category_scale()
            .map(BandScale::domain_vec)
            .unwrap_or_default()
    }

    /// Sum of branch lengths from `node` up to the root; missing lengths count as zero.
    pub fn branch_length_to_root(&self, node: NodeId) -> f64 {
        self.hierarchy
            .path(node, self.hierarchy.root())
            .into_iter()
            .map(|id| self.hierarchy.node(id).data.length_or_zero())
            .sum()
    }

    /// Branch length to root of the first ordered leaf (the tree is assumed ultrametric).
    pub fn max_branch_length(&self) -> f64 {
        self.leaves
            .first()
            .map(|&leaf| self.branch_length_to_root(leaf))
            .unwrap_or(0.0)
    }

    pub fn descendant_leaf_names(&self, node: NodeId) -> Vec<String> {
        self.hierarchy
            .leaves_of(node)
            .into_iter()
            .map(|id| self.hierarchy.node(id).data.name.clone())
            .collect()
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.hierarchy
            .nodes()
            .iter()
            .position(|n| n.data.name == name)
    }

    /// Leaf names in post-order, i.e. the left-to-right order of the sorted tree.
    fn post_order_leaf_names(&self) -> Vec<String> {
        self.hierarchy
            .post_order()
            .into_iter()
            .filter(|&id| self.hierarchy.node(id).is_leaf())
            .map(|id| self.hierarchy.node(id).data.name.clone())
            .collect()
    }

    fn set_scales(&mut self, width: f64, height: f64) {
        let max = self.max_branch_length();
        let names = self.post_order_leaf_names();
        self.width = width;
        self.height = height;
        match self.orientation {
            Orientation::Horizontal => {
                self.x_scale = Some(Scale::Linear(LinearScale::new([0.0, max], [0.0, width])));
                self.y_scale = Some(Scale::Band(BandScale::new(
                    names,
                    [0.0, height],
                    BAND_PADDING,
                )));
            }
            Orientation::Vertical => {
                self.x_scale = Some(Scale::Band(BandScale::new(
                    names,
                    [0.0, width],
                    BAND_PADDING,
                )));
                self.y_scale = Some(Scale::Linear(LinearScale::new([0.0, max], [0.0, height])));
            }
        }
    }

    /// `(category, distance)` per node id; leaves first, parents after all their children.
    fn node_coordinates(&self, band: &BandScale, distance: &LinearScale) -> Result<Vec<(f64, f64)>> {
        let mut order: Vec<NodeId> = (0..self.hierarchy.len()).collect();
        order.sort_by(|&a, &b| {
            let (na, nb) = (self.hierarchy.node(a), self.hierarchy.node(b));
            na.height.cmp(&nb.height).then_with(|| {
                na.data.length_or_zero().total_cmp(&nb.data.length_or_zero())
            })
        });

        let mut coords = vec![(f64::NAN, 0.0); self.hierarchy.len()];
        for id in order {
            let node = self.hierarchy.node(id);
            let category = if node.is_leaf() {
                band.apply(&node.data.name).ok_or_else(|| Error::InvalidModel {
                    message: format!("leaf {:?} missing from the category scale", node.data.name),
                })?
            } else {
                let sum: f64 = node.children.iter().map(|&c| coords[c].0).sum();
                sum / node.children.len() as f64
            };
            coords[id] = (category, distance.apply(self.branch_length_to_root(id)));
        }
        Ok(coords)
    }

    /// Lays the tree out in a `width` x `height` panel.
    ///
    /// Scales are always rebuilt; with `show == false` no primitives are emitted.
    pub fn draw(&mut self, width: f64, height: f64, show: bool) -> Result<DendrogramLayout> {
        self.set_scales(width, height);
        let max = self.max_branch_length();
        let (Some(band), Some(distance)) = (self.category_scale(), self.distance_scale()) else {
            return Err(Error::InvalidModel {
                message: "dendrogram scales were not initialized".to_string(),
            });
        };
        let category_domain = band.domain_vec();
        let bandwidth = band.bandwidth();

        let mut layout = DendrogramLayout {
            orientation: self.orientation,
            width,
            height,
            visible: show,
            max_branch_length: max,
            bandwidth,
            category_domain,
            nodes: Vec::new(),
            branches: Vec::new(),
            arms: Vec::new(),
            markers: Vec::new(),
            axis: None,
        };
        if !show {
            return Ok(layout);
        }

        let coords = self.node_coordinates(band, distance)?;
        let half = bandwidth / 2.0;
        let horizontal = self.orientation == Orientation::Horizontal;
        // Maps (category, distance) to panel (x, y).
        let place = |category: f64, dist: f64| {
            if horizontal {
                (dist, category)
            } else {
                (category, dist)
            }
        };
        let segment = |(c1, d1): (f64, f64), (c2, d2): (f64, f64)| {
            let (x1, y1) = place(c1, d1);
            let (x2, y2) = place(c2, d2);
            LineSegment { x1, y1, x2, y2 }
        };

        for id in self.hierarchy.pre_order() {
            let node = self.hierarchy.node(id);
            let (category, dist) = coords[id];
            let (x, y) = place(category + half, dist);
            layout.nodes.push(DendrogramNodeLayout {
                id,
                name: node.data.name.clone(),
                x,
                y,
                is_leaf: node.is_leaf(),
                branch_length: self.branch_length_to_root(id),
            });

            let own = node.data.length.map(|l| distance.apply(l)).unwrap_or(0.0);
            layout
                .branches
                .push(segment((category + half, dist), (category + half, dist - own)));

            if node.is_leaf() {
                continue;
            }
            let (lo, hi) = node
                .children
                .iter()
                .map(|&c| coords[c].0)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                    (lo.min(c), hi.max(c))
                });
            layout
                .arms
                .push(segment((lo + half, dist), (hi + half, dist)));
            layout.markers.push(NodeMarkerLayout {
                node: id,
                cx: x,
                cy: y,
                r: MARKER_RADIUS,
                fill: MARKER_FILL.to_string(),
                leaves: self.descendant_leaf_names(id),
            });
        }

        layout.axis = Some(self.axis(distance, max));

        tracing::debug!(
            width,
            height,
            branches = layout.branches.len(),
            max_branch_length = max,
            "drew dendrogram"
        );
        Ok(layout)
    }

    /// Two ticks: half the maximum and the maximum, both floored.
    fn axis(&self, distance: &LinearScale, max: f64) -> AxisLayout {
        let ticks = [(max / 2.0).floor(), max.floor()]
            .into_iter()
            .map(|value| AxisTick {
                value,
                position: distance.apply(value),
                label: format!("{value}"),
            })
            .collect();
        let line = match self.orientation {
            Orientation::Horizontal => LineSegment {
                x1: 0.0,
                y1: self.height,
                x2: self.width,
                y2: self.height,
            },
            Orientation::Vertical => LineSegment {
                x1: 0.0,
                y1: 0.0,
                x2: 0.0,
                y2: self.height,
            },
        };
        AxisLayout { line, ticks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(newick: &str, orientation: Orientation) -> Dendrogram {
        Dendrogram::new(newick, orientation, ParseOptions::strict()).unwrap()
    }

    #[test]
    fn branch_length_asymmetry() {
        let d = tree("(A:1,B:2);", Orientation::Horizontal);
        let a = d.find_node("A").unwrap();
        let b = d.find_node("B").unwrap();
        assert_eq!(d.branch_length_to_root(a), 1.0);
        assert_eq!(d.branch_length_to_root(b), 2.0);
        assert_eq!(d.max_branch_length(), 1.0);
    }

    #[test]
    fn leaves_sorted_by_value_then_length() {
        let d = tree("((C:1,D:1):1,A:0.5);", Orientation::Horizontal);
        let names: Vec<&str> = d
            .leaves()
            .iter()
            .map(|&id| d.hierarchy().node(id).data.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn horizontal_draw_places_leaves_on_band_scale() {
        let mut d = tree("((A:1,B:1):1,C:2);", Orientation::Horizontal);
        let layout = d.draw(100.0, 90.0, true).unwrap();
        assert_eq!(layout.category_domain, vec!["C", "A", "B"]);
        assert_eq!(layout.markers.len(), 2);
        assert_eq!(layout.arms.len(), 2);
        assert_eq!(layout.branches.len(), 5);

        let band = d.y_scale().unwrap().as_band().unwrap().clone();
        let half = band.bandwidth() / 2.0;
        let a = layout.nodes.iter().find(|n| n.name == "A").unwrap();
        assert!((a.y - (band.apply("A").unwrap() + half)).abs() < 1e-9);
        // Leaves sit at the full distance.
        assert!((a.x - 100.0).abs() < 1e-9);

        let root = layout.nodes.iter().find(|n| n.id == 0).unwrap();
        assert_eq!(root.x, 0.0);
    }

    #[test]
    fn internal_nodes_sit_between_their_children() {
        let mut d = tree("((A:1,B:1):1,C:2);", Orientation::Vertical);
        let layout = d.draw(90.0, 100.0, true).unwrap();
        let x = |name: &str| layout.nodes.iter().find(|n| n.name == name).unwrap().x;
        let parent = layout
            .nodes
            .iter()
            .find(|n| !n.is_leaf && n.id != 0)
            .unwrap();
        assert!((parent.x - (x("A") + x("B")) / 2.0).abs() < 1e-9);
        assert!((parent.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn arms_span_all_children_of_nary_nodes() {
        let mut d = tree("(A:1,B:1,C:1);", Orientation::Vertical);
        let layout = d.draw(90.0, 10.0, true).unwrap();
        let xs: Vec<f64> = layout.nodes.iter().filter(|n| n.is_leaf).map(|n| n.x).collect();
        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(layout.arms.len(), 1);
        assert!((layout.arms[0].x1 - lo).abs() < 1e-9);
        assert!((layout.arms[0].x2 - hi).abs() < 1e-9);
    }

    #[test]
    fn hidden_tree_still_builds_scales() {
        let mut d = tree("(A:1,B:1);", Orientation::Horizontal);
        let layout = d.draw(50.0, 50.0, false).unwrap();
        assert!(layout.branches.is_empty());
        assert!(layout.axis.is_none());
        assert_eq!(layout.category_domain.len(), 2);
        assert!(d.y_scale().is_some());
    }

    #[test]
    fn axis_ticks_half_and_max() {
        let mut d = tree("(A:5,B:5);", Orientation::Horizontal);
        let layout = d.draw(100.0, 20.0, true).unwrap();
        let axis = layout.axis.unwrap();
        let values: Vec<f64> = axis.ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![2.0, 5.0]);
        assert_eq!(axis.ticks[1].position, 100.0);
    }

    #[test]
    fn zero_length_branch_is_degenerate() {
        let mut d = tree("(A:0,B:1);", Orientation::Horizontal);
        let layout = d.draw(100.0, 20.0, true).unwrap();
        assert!(
            layout
                .branches
                .iter()
                .any(|b| b.x1 == b.x2 && b.y1 == b.y2)
        );
    }

    #[test]
    fn descendant_leaves_for_hover() {
        let d = tree("((A:1,B:1)AB:1,C:2);", Orientation::Horizontal);
        let ab = d.find_node("AB").unwrap();
        let mut names = d.descendant_leaf_names(ab);
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn orientation_parses_short_names() {
        assert_eq!("h".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert_eq!("V".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert!("x".parse::<Orientation>().is_err());
    }
}
