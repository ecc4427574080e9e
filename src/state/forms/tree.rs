//! Section tree flattened into an arena of indexed nodes
//!
//! The template's section forest is walked once with an explicit stack and
//! stored in pre-order, so node ids also give the display order. Rendering
//! walks the arena again (iteratively) to produce the visible node list.

use super::error::FormError;
use super::path::{FieldPath, SectionPath};
use crate::state::template::{Question, Section, SectionImage};

/// Maximum nesting depth accepted from a template
pub const MAX_SECTION_DEPTH: usize = 16;

/// Sections shallower than this start expanded
pub const DEFAULT_EXPANDED_DEPTH: usize = 2;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct SectionNode {
    pub path: SectionPath,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<SectionImage>,
    pub is_group: bool,
    /// Always empty for grouping nodes
    pub questions: Vec<Question>,
}

impl SectionNode {
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    nodes: Vec<SectionNode>,
    roots: Vec<NodeId>,
}

impl SectionTree {
    pub fn build(sections: &[Section]) -> Result<Self, FormError> {
        let mut tree = Self::default();
        let mut stack: Vec<(SectionPath, Option<NodeId>, &Section)> = sections
            .iter()
            .enumerate()
            .rev()
            .map(|(i, s)| (SectionPath::root(i), None, s))
            .collect();

        while let Some((path, parent, section)) = stack.pop() {
            if path.depth() >= MAX_SECTION_DEPTH {
                return Err(FormError::SectionTooDeep {
                    path,
                    max: MAX_SECTION_DEPTH,
                });
            }

            let id = tree.nodes.len();
            match parent {
                Some(p) => tree.nodes[p].children.push(id),
                None => tree.roots.push(id),
            }

            for (i, sub) in section.subsections.iter().enumerate().rev() {
                stack.push((path.child(i), Some(id), sub));
            }

            let is_group = section.is_group();
            tree.nodes.push(SectionNode {
                path,
                parent,
                children: Vec::with_capacity(section.subsections.len()),
                title: section.title.clone(),
                description: section.description.clone(),
                images: section.images.clone(),
                is_group,
                questions: if is_group {
                    Vec::new()
                } else {
                    section.questions.clone()
                },
            });
        }

        Ok(tree)
    }

    pub fn node(&self, id: NodeId) -> Option<&SectionNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[SectionNode] {
        &self.nodes
    }

    /// Every answerable question in display order, with its key
    pub fn leaf_questions(&self) -> impl Iterator<Item = (FieldPath, &Question)> {
        self.nodes
            .iter()
            .filter(|n| !n.is_group)
            .flat_map(|n| {
                n.questions
                    .iter()
                    .enumerate()
                    .map(move |(i, q)| (n.path.question(i), q))
            })
    }

    /// Nodes to display, in order, skipping descendants of collapsed nodes
    pub fn visible<F>(&self, is_expanded: F) -> Vec<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            out.push(id);
            if is_expanded(id) {
                stack.extend(self.nodes[id].children.iter().rev().copied());
            }
        }

        out
    }

    /// Node ids that start expanded for the given depth threshold
    pub fn initially_expanded(&self, expanded_depth: usize) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.depth() < expanded_depth)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::state::template::{Question, ResponseConfig, Section};

    pub fn question(text: &str, kind: &str) -> Question {
        Question {
            id: None,
            text: text.to_string(),
            required: false,
            response_config: ResponseConfig {
                kind: kind.to_string(),
                ..Default::default()
            },
            order: None,
            image: None,
        }
    }

    pub fn leaf(title: &str, questions: Vec<Question>) -> Section {
        Section {
            title: title.to_string(),
            questions,
            ..Default::default()
        }
    }

    pub fn group(title: &str, subsections: Vec<Section>) -> Section {
        Section {
            title: title.to_string(),
            is_parent: true,
            subsections,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::collections::HashSet;

    fn sample_forest() -> Vec<Section> {
        vec![
            leaf("General", vec![question("a", "text"), question("b", "number")]),
            group(
                "Equipos",
                vec![
                    leaf("Arnés", vec![question("c", "si_no_na")]),
                    group(
                        "Conectores",
                        vec![leaf("Mosquetón", vec![question("d", "boolean")])],
                    ),
                ],
            ),
            leaf("Cierre", vec![question("e", "date")]),
        ]
    }

    #[test]
    fn test_build_is_preorder() {
        let tree = SectionTree::build(&sample_forest()).unwrap();
        let titles: Vec<&str> = tree.nodes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["General", "Equipos", "Arnés", "Conectores", "Mosquetón", "Cierre"]
        );
        assert_eq!(tree.roots, vec![0, 1, 5]);
        assert_eq!(tree.node(1).unwrap().children, vec![2, 3]);
        assert_eq!(tree.node(4).unwrap().parent, Some(3));
        assert_eq!(tree.node(4).unwrap().depth(), 2);
    }

    #[test]
    fn test_leaf_question_paths() {
        let tree = SectionTree::build(&sample_forest()).unwrap();
        let keys: Vec<String> = tree.leaf_questions().map(|(p, _)| p.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "responses.s0.q0",
                "responses.s0.q1",
                "responses.s1.sub0.q0",
                "responses.s1.sub1.sub0.q0",
                "responses.s2.q0",
            ]
        );
    }

    #[test]
    fn test_leaf_question_paths_are_unique() {
        // Wide and deep forest with repeated shapes at every level
        let inner = || {
            vec![
                leaf("x", vec![question("1", "text"), question("2", "text")]),
                leaf("y", vec![question("3", "text")]),
            ]
        };
        let forest: Vec<Section> = (0..4)
            .map(|i| {
                if i % 2 == 0 {
                    group("g", vec![group("gg", inner()), leaf("l", vec![question("4", "text")])])
                } else {
                    leaf("l", vec![question("5", "text"); 3])
                }
            })
            .collect();

        let tree = SectionTree::build(&forest).unwrap();
        let keys: Vec<FieldPath> = tree.leaf_questions().map(|(p, _)| p).collect();
        let unique: HashSet<&FieldPath> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert_eq!(keys.len(), 2 * (3 + 1) + 2 * 3);
    }

    #[test]
    fn test_grouping_node_questions_are_dropped() {
        let mut parent = group("g", vec![]);
        parent.questions = vec![question("ignored", "text")];
        let tree = SectionTree::build(&[parent]).unwrap();
        assert_eq!(tree.leaf_questions().count(), 0);
        assert!(tree.node(0).unwrap().questions.is_empty());
    }

    #[test]
    fn test_depth_bound() {
        let mut section = leaf("bottom", vec![question("q", "text")]);
        for _ in 0..MAX_SECTION_DEPTH {
            section = group("level", vec![section]);
        }
        let err = SectionTree::build(&[section]).unwrap_err();
        assert!(matches!(err, FormError::SectionTooDeep { max, .. } if max == MAX_SECTION_DEPTH));
    }

    #[test]
    fn test_depth_at_bound_is_accepted() {
        let mut section = leaf("bottom", vec![question("q", "text")]);
        for _ in 0..(MAX_SECTION_DEPTH - 1) {
            section = group("level", vec![section]);
        }
        let tree = SectionTree::build(&[section]).unwrap();
        assert_eq!(tree.nodes().len(), MAX_SECTION_DEPTH);
    }

    #[test]
    fn test_visible_skips_collapsed_descendants() {
        let tree = SectionTree::build(&sample_forest()).unwrap();
        assert_eq!(tree.visible(|_| true), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(tree.visible(|id| id != 1), vec![0, 1, 5]);
        assert_eq!(tree.visible(|id| id != 3), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_initially_expanded_depth() {
        let tree = SectionTree::build(&sample_forest()).unwrap();
        let expanded = tree.initially_expanded(DEFAULT_EXPANDED_DEPTH);
        // Mosquetón (depth 2) stays collapsed
        assert_eq!(expanded, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_empty_forest() {
        let tree = SectionTree::build(&[]).unwrap();
        assert!(tree.nodes().is_empty());
        assert!(tree.visible(|_| true).is_empty());
    }
}
