//! Arena-backed tree hierarchy (d3-hierarchy semantics).
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]; `parent` is a navigation
//! index, never an owner. Depth and height are computed once at construction.

use crate::newick::TreeNode;
use serde::Serialize;
use std::cmp::Ordering;

pub type NodeId = usize;

#[derive(Debug, Clone, Serialize)]
pub struct HierarchyNode<T> {
    pub data: T,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// 0 at the root, +1 per level.
    pub depth: usize,
    /// 0 at leaves, otherwise `1 + max(child.height)`.
    pub height: usize,
    /// Aggregate written by [`Hierarchy::sum`]; 0 until then.
    pub value: f64,
}

impl<T> HierarchyNode<T> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
}

/// Per-node payload of a hierarchy built from a parsed Newick tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewickDatum {
    pub name: String,
    pub length: Option<f64>,
    pub has_branchset: bool,
}

impl NewickDatum {
    pub fn length_or_zero(&self) -> f64 {
        self.length.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy<T> {
    nodes: Vec<HierarchyNode<T>>,
}

impl Hierarchy<NewickDatum> {
    pub fn from_newick(tree: &TreeNode) -> Self {
        Self::build(
            tree,
            |node| node.branchset.as_slice(),
            |node| NewickDatum {
                name: node.name.clone(),
                length: node.length,
                has_branchset: !node.branchset.is_empty(),
            },
        )
    }
}

impl<T> Hierarchy<T> {
    /// Builds a hierarchy from `root`, expanding each source node through `children_of` and
    /// storing `project(source)` as the node payload.
    pub fn build<D>(
        root: &D,
        children_of: impl Fn(&D) -> &[D],
        mut project: impl FnMut(&D) -> T,
    ) -> Self {
        let mut nodes = vec![HierarchyNode {
            data: project(root),
            parent: None,
            children: Vec::new(),
            depth: 0,
            height: 0,
            value: 0.0,
        }];

        let mut stack: Vec<(&D, NodeId)> = vec![(root, 0)];
        while let Some((source, id)) = stack.pop() {
            let depth = nodes[id].depth + 1;
            for child in children_of(source) {
                let child_id = nodes.len();
                nodes.push(HierarchyNode {
                    data: project(child),
                    parent: Some(id),
                    children: Vec::new(),
                    depth,
                    height: 0,
                    value: 0.0,
                });
                nodes[id].children.push(child_id);
                stack.push((child, child_id));
            }
        }

        let mut out = Self { nodes };
        out.compute_heights();
        out
    }

    fn compute_heights(&mut self) {
        for leaf in 0..self.nodes.len() {
            if !self.nodes[leaf].is_leaf() {
                continue;
            }
            let mut height = 0usize;
            let mut cur = leaf;
            while let Some(parent) = self.nodes[cur].parent {
                height += 1;
                if self.nodes[parent].height >= height {
                    break;
                }
                self.nodes[parent].height = height;
                cur = parent;
            }
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode<T> {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode<T>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[HierarchyNode<T>] {
        &self.nodes
    }

    /// Level-order ids: all nodes of one depth before any node of the next.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut next = vec![self.root()];
        while !next.is_empty() {
            let mut current = next;
            current.reverse();
            next = Vec::new();
            while let Some(id) = current.pop() {
                out.push(id);
                next.extend(self.nodes[id].children.iter().copied());
            }
        }
        out
    }

    /// Pre-order ids: parent before children.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    /// Post-order ids: children before parent.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().copied());
        }
        out.reverse();
        out
    }

    pub fn each(&self, mut f: impl FnMut(NodeId, &HierarchyNode<T>)) {
        for id in self.descendants() {
            f(id, &self.nodes[id]);
        }
    }

    pub fn each_before(&self, mut f: impl FnMut(NodeId, &HierarchyNode<T>)) {
        for id in self.pre_order() {
            f(id, &self.nodes[id]);
        }
    }

    pub fn each_after(&self, mut f: impl FnMut(NodeId, &HierarchyNode<T>)) {
        for id in self.post_order() {
            f(id, &self.nodes[id]);
        }
    }

    /// Post-order accumulation: `value = value_fn(data) + Σ children.value`.
    pub fn sum(&mut self, value_fn: impl Fn(&T) -> f64) -> &mut Self {
        for id in self.post_order() {
            let own = value_fn(&self.nodes[id].data);
            let children: f64 = self.nodes[id]
                .children
                .iter()
                .map(|&c| self.nodes[c].value)
                .sum();
            self.nodes[id].value = own + children;
        }
        self
    }

    /// Stable in-place sort of every node's children, applied top-down.
    pub fn sort(
        &mut self,
        mut compare: impl FnMut(&HierarchyNode<T>, &HierarchyNode<T>) -> Ordering,
    ) -> &mut Self {
        for id in self.pre_order() {
            if self.nodes[id].children.len() < 2 {
                continue;
            }
            let mut children = std::mem::take(&mut self.nodes[id].children);
            children.sort_by(|&a, &b| compare(&self.nodes[a], &self.nodes[b]));
            self.nodes[id].children = children;
        }
        self
    }

    /// Leaf ids in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Leaf ids beneath `id` (inclusive when `id` is itself a leaf), in pre-order.
    pub fn leaves_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = &self.nodes[cur];
            if node.is_leaf() {
                out.push(cur);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            out.push(parent);
            cur = parent;
        }
        out
    }

    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let mut a_chain = self.ancestors(a);
        let mut b_chain = self.ancestors(b);
        let mut lca = self.root();
        while let (Some(x), Some(y)) = (a_chain.pop(), b_chain.pop()) {
            if x != y {
                break;
            }
            lca = x;
        }
        lca
    }

    /// Nodes from `from` up to the lowest common ancestor and down to `to`, both inclusive.
    pub fn path(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        let lca = self.lowest_common_ancestor(from, to);

        let mut out = vec![from];
        let mut cur = from;
        while cur != lca {
            let Some(parent) = self.nodes[cur].parent else {
                break;
            };
            cur = parent;
            out.push(cur);
        }

        let k = out.len();
        let mut cur = to;
        while cur != lca {
            out.insert(k, cur);
            let Some(parent) = self.nodes[cur].parent else {
                break;
            };
            cur = parent;
        }
        out
    }

    /// `{source: parent, target: node}` for every non-root node, in level order.
    pub fn links(&self) -> Vec<Link> {
        self.descendants()
            .into_iter()
            .filter_map(|id| {
                self.nodes[id].parent.map(|source| Link { source, target: id })
            })
            .collect()
    }
}
