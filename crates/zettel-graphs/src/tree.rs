//! Text trees of linked notes

use std::collections::HashSet;

use zettel_common::{truncate_chars, NoteId};

use crate::NoteGraph;

const TITLE_LIMIT: usize = 25;

#[derive(Debug, Clone)]
struct ForestNode {
    id: NoteId,
    title: String,
    children: Vec<usize>,
}

/// Depth-first spanning trees covering every note exactly once.
///
/// Roots are taken in ascending id order among notes not reached yet;
/// children follow the stored order of links. Nodes live in an arena so
/// long chains of links do not recurse.
#[derive(Debug, Clone, Default)]
pub struct NoteForest {
    nodes: Vec<ForestNode>,
    roots: Vec<usize>,
}

impl NoteForest {
    pub fn build(graph: &NoteGraph) -> Self {
        let mut forest = Self::default();
        let mut visited = HashSet::new();

        for root in graph.note_ids() {
            if !visited.insert(root) {
                continue;
            }
            let root_index = forest.push_node(graph, root);
            forest.roots.push(root_index);

            // (node index, next neighbour to look at)
            let mut stack = vec![(root_index, 0usize)];
            while let Some(&(index, cursor)) = stack.last() {
                match graph.neighbors(forest.nodes[index].id).get(cursor) {
                    Some(&next) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        if visited.insert(next) {
                            let child = forest.push_node(graph, next);
                            forest.nodes[index].children.push(child);
                            stack.push((child, 0));
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }

        forest
    }

    fn push_node(&mut self, graph: &NoteGraph, id: NoteId) -> usize {
        let title = truncate_chars(graph.title(id).unwrap_or_default(), TITLE_LIMIT);
        self.nodes.push(ForestNode {
            id,
            title,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Number of trees
    pub fn tree_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of notes across all trees
    pub fn note_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids in the order they are printed
    pub fn preorder(&self) -> Vec<NoteId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            let mut stack = vec![root];
            while let Some(index) = stack.pop() {
                order.push(self.nodes[index].id);
                stack.extend(self.nodes[index].children.iter().rev());
            }
        }
        order
    }

    /// One block per tree, blocks separated by a blank line:
    ///
    /// ```text
    /// 📄 Root
    /// ├── Child
    /// │   └── Grandchild
    /// └── Last child
    /// ```
    pub fn render(&self) -> String {
        self.roots
            .iter()
            .map(|&root| self.render_tree(root))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_tree(&self, root: usize) -> String {
        let mut lines = vec![format!("📄 {}", self.nodes[root].title)];

        // (node index, prefix inherited from ancestors, last among siblings)
        let mut stack: Vec<(usize, String, bool)> = Vec::new();
        push_children(&mut stack, &self.nodes[root].children, "");

        while let Some((index, prefix, is_last)) = stack.pop() {
            let node = &self.nodes[index];
            let branch = if is_last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{branch}{}", node.title));

            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            push_children(&mut stack, &node.children, &child_prefix);
        }

        lines.join("\n")
    }
}

fn push_children(stack: &mut Vec<(usize, String, bool)>, children: &[usize], prefix: &str) {
    let last = children.len().saturating_sub(1);
    for (position, &child) in children.iter().enumerate().rev() {
        stack.push((child, prefix.to_string(), position == last));
    }
}
