//! SVG export of the current view.

use crate::camera::Camera;
use crate::snap::HexLattice;
use crate::store::ShapeStore;

/// Stroke width of exported segments, in screen pixels.
pub const LINE_WIDTH: f64 = 2.0;
/// Radius of a grid bubble, in world units.
pub const BUBBLE_RADIUS: f64 = 5.0;

/// What to include besides the segments.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Fill colour for a full-viewport background rectangle.
    pub background: Option<String>,
    /// Lattice to draw as bubbles, if any.
    pub grid: Option<HexLattice>,
    pub grid_color: String,
    pub line_width: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            background: None,
            grid: None,
            grid_color: "rgba(255,255,255,0.6)".to_string(),
            line_width: LINE_WIDTH,
        }
    }
}

/// Render the segments as seen through `camera` into an SVG document the
/// size of the viewport. Segments keep their draw order.
pub fn to_svg(store: &ShapeStore, camera: &Camera, options: &SvgOptions) -> String {
    let viewport = camera.viewport;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = fmt_num(viewport.width),
        h = fmt_num(viewport.height),
    );

    if let Some(background) = &options.background {
        svg.push_str(&format!(
            "  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
            escape_xml(background)
        ));
    }

    if let Some(lattice) = &options.grid {
        let radius = fmt_num(BUBBLE_RADIUS * camera.zoom);
        svg.push_str(&format!(
            "  <g fill=\"none\" stroke=\"{}\" stroke-width=\"1\">\n",
            escape_xml(&options.grid_color)
        ));
        for anchor in lattice.anchors_in_rect(camera.visible_world_rect()) {
            let p = camera.world_to_screen(anchor);
            svg.push_str(&format!(
                "    <circle cx=\"{}\" cy=\"{}\" r=\"{}\"/>\n",
                fmt_num(p.x),
                fmt_num(p.y),
                radius
            ));
        }
        svg.push_str("  </g>\n");
    }

    for segment in store.iter() {
        let a = camera.world_to_screen(segment.a);
        let b = camera.world_to_screen(segment.b);
        svg.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>\n",
            fmt_num(a.x),
            fmt_num(a.y),
            fmt_num(b.x),
            fmt_num(b.y),
            escape_xml(&segment.color),
            fmt_num(options.line_width),
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Up to three decimals, trailing zeros dropped.
fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
