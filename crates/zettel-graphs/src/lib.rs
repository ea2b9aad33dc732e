//! Visualizations of a user's notes and the links between them.
//!
//! - [`NoteGraph`]: undirected adjacency built from stored notes and links
//! - [`NoteForest`]: depth-first spanning trees rendered as text
//! - [`layout`]: deterministic force-directed node placement
//! - [`PngGraphRenderer`]: the graph drawn with plotters and encoded as PNG

pub mod graph;
pub mod layout;
pub mod renderer;
pub mod tree;

pub use graph::NoteGraph;
pub use layout::{LayoutSettings, Point};
pub use renderer::{parse_color, GraphRenderer, PngGraphRenderer, RenderStyle};
pub use tree::NoteForest;
