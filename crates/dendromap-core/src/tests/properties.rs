use crate::*;

const TREES: &[(&str, usize)] = &[
    ("(A:1,B:2);", 2),
    ("((A:1,B:1):1,C:2);", 3),
    ("(((A,B),(C,D)),((E,F),G));", 7),
    ("((a:0.1,b:0.1)ab:0.2,(c:0.15,(d:0.05,e:0.05):0.1):0.15)root;", 5),
    ("(A,B,C,D);", 4),
    ("A;", 1),
];

fn leaf_hierarchy(text: &str) -> Hierarchy<NewickDatum> {
    let tree = parse_newick(text, ParseOptions::strict()).unwrap();
    let mut h = Hierarchy::from_newick(&tree);
    h.sum(|d| if d.has_branchset { 0.0 } else { 1.0 });
    h
}

#[test]
fn leaf_count_survives_parse_and_build() {
    for (text, leaves) in TREES {
        let h = leaf_hierarchy(text);
        assert_eq!(h.leaves().len(), *leaves, "{text}");
        assert_eq!(h.node(h.root()).value as usize, *leaves, "{text}");
    }
}

#[test]
fn height_is_zero_exactly_at_leaves() {
    for (text, _) in TREES {
        let h = leaf_hierarchy(text);
        h.each(|id, node| {
            assert_eq!(node.height == 0, node.is_leaf(), "{text} node {id}");
            if let Some(parent) = node.parent {
                assert_eq!(node.depth, h.node(parent).depth + 1, "{text} node {id}");
            }
        });
    }
}

#[test]
fn path_to_root_and_between_leaves_agree_on_lca() {
    for (text, _) in TREES {
        let h = leaf_hierarchy(text);
        let leaves = h.leaves();
        for &a in &leaves {
            for &b in &leaves {
                let up_a = h.path(a, h.root());
                let up_b = h.path(b, h.root());
                let last_common = up_a
                    .iter()
                    .rev()
                    .zip(up_b.iter().rev())
                    .take_while(|(x, y)| x == y)
                    .map(|(x, _)| *x)
                    .last()
                    .unwrap();

                let between = h.path(a, b);
                let first_common = between
                    .iter()
                    .copied()
                    .find(|id| up_a.contains(id) && up_b.contains(id))
                    .unwrap();
                assert_eq!(last_common, first_common, "{text}: {a} -> {b}");
            }
        }
    }
}
