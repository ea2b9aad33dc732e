//! Deterministic node placement.
//!
//! Linked notes are arranged with a Fruchterman-Reingold simulation in the
//! right part of the canvas; notes without links are stacked in columns on
//! the left. Coordinates are normalized to `0.0..=1.0` on both axes so the
//! renderer can scale them to any canvas size.

use std::collections::{BTreeMap, HashMap};

use zettel_common::NoteId;
use zettel_config::GraphConfig;

use crate::NoteGraph;

/// Normalized position on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
struct Region {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Region {
    const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x: x_min,
            y: y_min,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    fn place(&self, unit: Point) -> Point {
        Point::new(self.x + unit.x * self.width, self.y + unit.y * self.height)
    }
}

const ISOLATED_REGION: Region = Region::new(0.03, 0.25, 0.05, 0.95);
const CONNECTED_REGION: Region = Region::new(0.30, 0.97, 0.05, 0.95);
const FULL_REGION: Region = Region::new(0.05, 0.95, 0.05, 0.95);

/// Rows per column when isolated notes share the canvas with linked ones
const NARROW_COLUMN_ROWS: usize = 15;
const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSettings {
    /// Simulation steps for the linked part
    pub iterations: u32,
    /// Seed for the initial random placement
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            iterations: 300,
            seed: 42,
        }
    }
}

impl LayoutSettings {
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            iterations: config.layout_iterations,
            seed: config.layout_seed,
        }
    }

    /// Position every note of `graph`. The same graph and settings always
    /// produce the same positions.
    pub fn compute(&self, graph: &NoteGraph) -> BTreeMap<NoteId, Point> {
        let connected = graph.connected_nodes();
        let isolated = graph.isolated_nodes();

        let (connected_region, isolated_region) = match (connected.is_empty(), isolated.is_empty()) {
            (false, false) => (CONNECTED_REGION, ISOLATED_REGION),
            _ => (FULL_REGION, FULL_REGION),
        };

        let mut positions = BTreeMap::new();

        if !connected.is_empty() {
            let simulated = self.force_directed(graph, &connected);
            for (id, unit) in connected.iter().zip(simulated) {
                positions.insert(*id, connected_region.place(unit));
            }
        }

        if !isolated.is_empty() {
            let rows = if connected.is_empty() {
                square_rows(isolated.len())
            } else {
                NARROW_COLUMN_ROWS.min(isolated.len())
            };
            for (id, unit) in isolated.iter().zip(grid(isolated.len(), rows)) {
                positions.insert(*id, isolated_region.place(unit));
            }
        }

        positions
    }

    fn force_directed(&self, graph: &NoteGraph, nodes: &[NoteId]) -> Vec<Point> {
        let n = nodes.len();
        if n == 1 {
            return vec![Point::new(0.5, 0.5)];
        }

        let index: HashMap<NoteId, usize> = nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .into_iter()
            .filter_map(|(a, b)| Some((*index.get(&a)?, *index.get(&b)?)))
            .collect();

        let mut rng = fastrand::Rng::with_seed(self.seed);
        let mut pos: Vec<Point> = (0..n).map(|_| Point::new(rng.f64(), rng.f64())).collect();

        #[allow(clippy::cast_precision_loss)]
        let k = (1.0 / n as f64).sqrt();
        let iterations = self.iterations.max(1);
        let start_temperature = 0.1;

        for step in 0..iterations {
            let temperature = start_temperature * (1.0 - f64::from(step) / f64::from(iterations));
            let mut disp = vec![Point::new(0.0, 0.0); n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy, dist) = delta(pos[i], pos[j]);
                    let force = k * k / dist;
                    disp[i].x += dx / dist * force;
                    disp[i].y += dy / dist * force;
                    disp[j].x -= dx / dist * force;
                    disp[j].y -= dy / dist * force;
                }
            }

            for &(a, b) in &edges {
                let (dx, dy, dist) = delta(pos[a], pos[b]);
                let force = dist * dist / k;
                disp[a].x -= dx / dist * force;
                disp[a].y -= dy / dist * force;
                disp[b].x += dx / dist * force;
                disp[b].y += dy / dist * force;
            }

            for (p, d) in pos.iter_mut().zip(&disp) {
                let length = d.x.hypot(d.y);
                if length > 0.0 {
                    let limited = length.min(temperature);
                    p.x += d.x / length * limited;
                    p.y += d.y / length * limited;
                }
            }
        }

        normalize(pos)
    }
}

fn delta(a: Point, b: Point) -> (f64, f64, f64) {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx, dy, dx.hypot(dy).max(MIN_DISTANCE))
}

/// Stretch positions so they span `0.0..=1.0` on each axis
fn normalize(points: Vec<Point>) -> Vec<Point> {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in &points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let scale = |value: f64, min: f64, max: f64| {
        if max - min < f64::EPSILON {
            0.5
        } else {
            (value - min) / (max - min)
        }
    };

    points
        .into_iter()
        .map(|p| Point::new(scale(p.x, min_x, max_x), scale(p.y, min_y, max_y)))
        .collect()
}

fn square_rows(count: usize) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let columns = (count as f64).sqrt().ceil() as usize;
    count.div_ceil(columns.max(1))
}

/// Cell centers filled column by column
#[allow(clippy::cast_precision_loss)]
fn grid(count: usize, rows: usize) -> Vec<Point> {
    let rows = rows.max(1);
    let columns = count.div_ceil(rows).max(1);
    (0..count)
        .map(|i| {
            let column = i / rows;
            let row = i % rows;
            Point::new(
                (column as f64 + 0.5) / columns as f64,
                (row as f64 + 0.5) / rows as f64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(ids: &[i64], links: &[(i64, i64)]) -> NoteGraph {
        NoteGraph::new(
            ids.iter().map(|id| (NoteId(*id), format!("Note {id}"))).collect(),
            links.iter().map(|(a, b)| (NoteId(*a), NoteId(*b))),
        )
    }

    fn in_unit_square(p: Point) -> bool {
        (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
    }

    #[test]
    fn test_same_seed_same_layout() {
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 2), (2, 3), (3, 1), (4, 1)]);
        let settings = LayoutSettings::default();
        assert_eq!(settings.compute(&g), settings.compute(&g));
    }

    #[test]
    fn test_every_note_is_placed_inside_the_canvas() {
        let g = graph(&[1, 2, 3, 4, 5, 6], &[(1, 2), (3, 4)]);
        let positions = LayoutSettings::default().compute(&g);
        assert_eq!(positions.len(), 6);
        assert!(positions.values().copied().all(in_unit_square));
    }

    #[test]
    fn test_isolated_notes_stay_left_of_linked_ones() {
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 2), (2, 3)]);
        let positions = LayoutSettings::default().compute(&g);

        for id in [4, 5] {
            assert!(positions[&NoteId(id)].x <= ISOLATED_REGION.x + ISOLATED_REGION.width);
        }
        for id in [1, 2, 3] {
            assert!(positions[&NoteId(id)].x >= CONNECTED_REGION.x);
        }
    }

    #[test]
    fn test_only_isolated_notes_use_full_width() {
        let g = graph(&[1, 2, 3, 4], &[]);
        let positions = LayoutSettings::default().compute(&g);
        let max_x = positions.values().map(|p| p.x).fold(0.0, f64::max);
        assert!(max_x > CONNECTED_REGION.x);
    }

    #[test]
    fn test_linked_notes_do_not_collapse() {
        let g = graph(&[1, 2, 3], &[(1, 2), (2, 3)]);
        let positions = LayoutSettings::default().compute(&g);
        let a = positions[&NoteId(1)];
        let c = positions[&NoteId(3)];
        assert!((a.x - c.x).hypot(a.y - c.y) > 0.05);
    }

    #[test]
    fn test_grid_fills_columns_first() {
        let cells = grid(5, 2);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0].x, cells[1].x);
        assert!(cells[2].x > cells[0].x);
        assert_eq!(square_rows(9), 3);
        assert_eq!(square_rows(1), 1);
    }
}
