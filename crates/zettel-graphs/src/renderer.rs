//! Graph image rendering

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, warn};
use zettel_common::{truncate_chars, NoteId, Result, ZettelError};
use zettel_config::GraphConfig;

use crate::{LayoutSettings, NoteGraph};

const LEGEND_TITLE_LIMIT: usize = 30;

/// Renders a note graph into encoded image bytes.
///
/// Rendering is CPU bound; async callers should run it on a blocking thread.
pub trait GraphRenderer: Send + Sync {
    fn render(&self, graph: &NoteGraph) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Parse a `#RRGGBB` color
pub fn parse_color(color: &str) -> Result<RGBColor> {
    let invalid = || ZettelError::validation_field(format!("Invalid color: {color}"), "color");

    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Visual settings for [`PngGraphRenderer`]
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub connected: RGBColor,
    pub isolated: RGBColor,
    pub edge: RGBColor,
    pub font_family: String,
    pub font_size: u32,
    pub max_legend_entries: usize,
    /// Draw node numbers and the legend. Text needs a system font.
    pub labels: bool,
    pub layout: LayoutSettings,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            background: RGBColor(0xFF, 0xFF, 0xFF),
            connected: RGBColor(0x41, 0x69, 0xE1),
            isolated: RGBColor(0xFF, 0x6B, 0x6B),
            edge: RGBColor(0x9E, 0x9E, 0x9E),
            font_family: "sans-serif".to_string(),
            font_size: 16,
            max_legend_entries: 30,
            labels: true,
            layout: LayoutSettings::default(),
        }
    }
}

impl RenderStyle {
    pub fn from_config(config: &GraphConfig) -> Result<Self> {
        Ok(Self {
            width: config.width,
            height: config.height,
            background: parse_color(&config.background_color)?,
            connected: parse_color(&config.connected_color)?,
            isolated: parse_color(&config.isolated_color)?,
            edge: parse_color(&config.edge_color)?,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            max_legend_entries: config.max_legend_entries,
            labels: true,
            layout: LayoutSettings::from_config(config),
        })
    }

    #[must_use]
    pub const fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    fn text_style(&self, color: &RGBColor) -> TextStyle<'_> {
        (self.font_family.as_str(), f64::from(self.font_size))
            .into_font()
            .color(color)
    }
}

/// Draws linked notes in the connected color and notes without links in
/// the isolated color, sized by their number of links.
#[derive(Debug, Clone, Default)]
pub struct PngGraphRenderer {
    style: RenderStyle,
}

impl PngGraphRenderer {
    pub const fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn from_config(config: &GraphConfig) -> Result<Self> {
        Ok(Self::new(RenderStyle::from_config(config)?))
    }

    pub const fn style(&self) -> &RenderStyle {
        &self.style
    }

    fn render_with(&self, style: &RenderStyle, graph: &NoteGraph) -> Result<Vec<u8>> {
        let (width, height) = (style.width, style.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&style.background)?;

            if style.labels {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let graph_width = (width * 3 / 4) as i32;
                let (graph_area, legend_area) = root.split_horizontally(graph_width);
                draw_graph(&graph_area, style, graph)?;
                draw_legend(&legend_area, style, graph)?;
            } else {
                draw_graph(&root, style, graph)?;
            }

            root.present()?;
        }

        encode_png(&buffer, width, height)
    }
}

impl GraphRenderer for PngGraphRenderer {
    fn render(&self, graph: &NoteGraph) -> Result<Vec<u8>> {
        if graph.is_empty() {
            return Err(ZettelError::graph("Nothing to render: the graph has no notes"));
        }

        debug!(notes = graph.len(), edges = graph.edges().len(), "Rendering note graph");

        match self.render_with(&self.style, graph) {
            Ok(png) => Ok(png),
            Err(e) if self.style.labels => {
                warn!(error = %e, "Rendering with labels failed, retrying without text");
                let plain = self.style.clone().without_labels();
                self.render_with(&plain, graph)
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "png_note_graph"
    }
}

fn draw_graph<DB>(area: &DrawingArea<DB, Shift>, style: &RenderStyle, graph: &NoteGraph) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: std::error::Error + Send + Sync + 'static,
{
    let (width, height) = area.dim_in_pixel();
    let positions = style.layout.compute(graph);
    #[allow(clippy::cast_possible_truncation)]
    let to_pixel = |id: NoteId| {
        positions.get(&id).map_or((0, 0), |p| {
            ((p.x * f64::from(width)) as i32, (p.y * f64::from(height)) as i32)
        })
    };

    let edge_style = style.edge.stroke_width(2);
    for (a, b) in graph.edges() {
        area.draw(&PathElement::new(vec![to_pixel(a), to_pixel(b)], edge_style))?;
    }

    #[allow(clippy::cast_possible_wrap)]
    let base_radius = (width.min(height) / 80).clamp(5, 20) as i32;
    let max_degree = graph.max_degree().max(1);
    let numbering = graph.numbering();
    let label_style = style
        .text_style(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for id in graph.note_ids() {
        let degree = graph.degree(id);
        let (color, radius) = if degree == 0 {
            (style.isolated, base_radius)
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
            let extra = (degree * base_radius as usize / max_degree) as i32;
            (style.connected, base_radius + extra)
        };

        let center = to_pixel(id);
        area.draw(&Circle::new(center, radius, color.filled()))?;
        area.draw(&Circle::new(center, radius, BLACK.stroke_width(1)))?;

        if style.labels {
            let number = numbering.get(&id).copied().unwrap_or_default();
            area.draw(&Text::new(number.to_string(), center, label_style.clone()))?;
        }
    }

    Ok(())
}

fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, style: &RenderStyle, graph: &NoteGraph) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: std::error::Error + Send + Sync + 'static,
{
    let text_style = style.text_style(&BLACK);
    #[allow(clippy::cast_possible_wrap)]
    let line_height = (style.font_size + style.font_size / 2) as i32;
    let margin = 10;

    let numbering = graph.numbering();
    let mut y = margin;
    for (id, number) in numbering.iter().take(style.max_legend_entries) {
        let title = truncate_chars(graph.title(*id).unwrap_or_default(), LEGEND_TITLE_LIMIT);
        area.draw(&Text::new(format!("{number}. {title}"), (margin, y), text_style.clone()))?;
        y += line_height;
    }

    let hidden = numbering.len().saturating_sub(style.max_legend_entries);
    if hidden > 0 {
        area.draw(&Text::new(format!("+{hidden}"), (margin, y), text_style))?;
    }

    Ok(())
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(buffer, width, height, ColorType::Rgb8)
        .map_err(|e| ZettelError::graph_with_source("PNG encoding failed", e))?;
    Ok(png)
}
