//! SVG export of an overlay frame.

use std::fmt::Write;

use crate::{Overlay, OverlayItem, OverlayLayer, OverlayShape, Point};

const LAYERS: [(OverlayLayer, &str); 3] = [
    (OverlayLayer::Regions, "regions"),
    (OverlayLayer::Lines, "lines"),
    (OverlayLayer::Editing, "editing"),
];

/// Serialize an overlay as an SVG document in image coordinates
/// (`viewBox="0 0 width height"`).
///
/// Hidden layers are kept in the document with `display:none`, mirroring how
/// the groups are toggled in a live viewer.
pub fn to_svg(
    overlay: &Overlay,
    width: f64,
    height: f64,
    visible: impl Fn(OverlayLayer) -> bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
    );

    for (layer, name) in LAYERS {
        if visible(layer) {
            let _ = writeln!(out, r#"  <g data-layer="{name}">"#);
        } else {
            let _ = writeln!(out, r#"  <g data-layer="{name}" style="display:none">"#);
        }
        for item in overlay.items_in(layer) {
            write_item(&mut out, item);
        }
        out.push_str("  </g>\n");
    }

    out.push_str("</svg>\n");
    out
}

fn write_item(out: &mut String, item: &OverlayItem) {
    let s = &item.stroke;
    let fill = match s.fill {
        Some(c) => format!(r#"fill="{}" fill-opacity="{}""#, c.to_hex(), s.fill_opacity),
        None => r#"fill="none""#.to_string(),
    };
    let mut attrs = format!(
        r#"class="{}" {fill} stroke="{}" stroke-opacity="{}" stroke-width="{}""#,
        item.class,
        s.color.to_hex(),
        s.opacity,
        s.width
    );
    if let Some(dash) = s.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
    }
    if let Some(key) = &item.key {
        let _ = write!(attrs, r#" data-key="{}""#, escape(key));
    }

    let (tag, geometry) = match &item.shape {
        OverlayShape::Polygon { vertices } => ("polygon", format!(r#"points="{}""#, points(vertices))),
        OverlayShape::Polyline { vertices } => ("polyline", format!(r#"points="{}""#, points(vertices))),
        OverlayShape::Handle { center, radius } => (
            "circle",
            format!(r#"cx="{}" cy="{}" r="{}""#, center.x, center.y, radius),
        ),
    };

    match &item.title {
        Some(title) => {
            let _ = writeln!(
                out,
                "    <{tag} {geometry} {attrs}><title>{}</title></{tag}>",
                escape(title)
            );
        }
        None => {
            let _ = writeln!(out, "    <{tag} {geometry} {attrs}/>");
        }
    }
}

fn points(vertices: &[Point]) -> String {
    vertices
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
