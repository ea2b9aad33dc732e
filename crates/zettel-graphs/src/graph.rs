//! Undirected note graph

use std::collections::BTreeMap;

use zettel_common::NoteId;

/// A user's notes as nodes, links as undirected edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteGraph {
    titles: BTreeMap<NoteId, String>,
    /// Neighbours in the order their links were stored
    adjacency: BTreeMap<NoteId, Vec<NoteId>>,
}

impl NoteGraph {
    /// Build the graph, skipping self loops, repeated pairs and links to unknown notes
    pub fn new(
        titles: BTreeMap<NoteId, String>,
        links: impl IntoIterator<Item = (NoteId, NoteId)>,
    ) -> Self {
        let mut adjacency: BTreeMap<NoteId, Vec<NoteId>> =
            titles.keys().map(|id| (*id, Vec::new())).collect();

        for (a, b) in links {
            if a == b || !titles.contains_key(&a) || !titles.contains_key(&b) {
                continue;
            }
            let already_linked = adjacency.get(&a).is_some_and(|n| n.contains(&b));
            if already_linked {
                continue;
            }
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }

        Self { titles, adjacency }
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Note ids in ascending order
    pub fn note_ids(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.titles.keys().copied()
    }

    pub fn title(&self, id: NoteId) -> Option<&str> {
        self.titles.get(&id).map(String::as_str)
    }

    pub fn neighbors(&self, id: NoteId) -> &[NoteId] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: NoteId) -> usize {
        self.neighbors(id).len()
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Each undirected edge once, as `(smaller, larger)`, sorted
    pub fn edges(&self) -> Vec<(NoteId, NoteId)> {
        let mut edges: Vec<(NoteId, NoteId)> = self
            .adjacency
            .iter()
            .flat_map(|(a, neighbors)| neighbors.iter().filter(move |b| a < *b).map(move |b| (*a, *b)))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Notes with at least one link, ascending
    pub fn connected_nodes(&self) -> Vec<NoteId> {
        self.note_ids().filter(|id| self.degree(*id) > 0).collect()
    }

    /// Notes without links, ascending
    pub fn isolated_nodes(&self) -> Vec<NoteId> {
        self.note_ids().filter(|id| self.degree(*id) == 0).collect()
    }

    /// 1-based display numbers assigned in ascending id order
    pub fn numbering(&self) -> BTreeMap<NoteId, usize> {
        self.note_ids().enumerate().map(|(i, id)| (id, i + 1)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(ids: &[i64]) -> BTreeMap<NoteId, String> {
        ids.iter().map(|id| (NoteId(*id), format!("Note {id}"))).collect()
    }

    #[test]
    fn test_duplicate_and_reverse_links_collapse() {
        let graph = NoteGraph::new(
            titles(&[1, 2, 3]),
            [
                (NoteId(1), NoteId(2)),
                (NoteId(2), NoteId(1)),
                (NoteId(1), NoteId(2)),
            ],
        );
        assert_eq!(graph.neighbors(NoteId(1)), &[NoteId(2)]);
        assert_eq!(graph.neighbors(NoteId(2)), &[NoteId(1)]);
        assert_eq!(graph.edges(), vec![(NoteId(1), NoteId(2))]);
    }

    #[test]
    fn test_invalid_links_are_ignored() {
        let graph = NoteGraph::new(
            titles(&[1, 2]),
            [(NoteId(1), NoteId(1)), (NoteId(1), NoteId(99))],
        );
        assert!(graph.edges().is_empty());
        assert_eq!(graph.isolated_nodes(), vec![NoteId(1), NoteId(2)]);
        assert_eq!(graph.max_degree(), 0);
    }

    #[test]
    fn test_degrees_and_partitions() {
        let graph = NoteGraph::new(
            titles(&[1, 2, 3, 4]),
            [(NoteId(1), NoteId(2)), (NoteId(1), NoteId(3))],
        );
        assert_eq!(graph.degree(NoteId(1)), 2);
        assert_eq!(graph.max_degree(), 2);
        assert_eq!(graph.connected_nodes(), vec![NoteId(1), NoteId(2), NoteId(3)]);
        assert_eq!(graph.isolated_nodes(), vec![NoteId(4)]);
        assert_eq!(graph.degree(NoteId(42)), 0);
    }

    #[test]
    fn test_numbering_follows_ids() {
        let graph = NoteGraph::new(titles(&[10, 3, 7]), []);
        let numbers = graph.numbering();
        assert_eq!(numbers[&NoteId(3)], 1);
        assert_eq!(numbers[&NoteId(7)], 2);
        assert_eq!(numbers[&NoteId(10)], 3);
        assert_eq!(graph.title(NoteId(7)), Some("Note 7"));
    }
}
