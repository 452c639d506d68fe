//! Retained SVG element tree.
//!
//! Mirrors what a browser DOM would hold for the diagram: one `<path>` per connector and one
//! `<g>` per step, each tagged with its step index. Serialised on demand with
//! [`SvgSurface::to_document`].

use crate::connector::{ConnectorSegment, format_number as num};
use crate::geometry::Size;
use crate::layout::{Item, Placement};
use crate::render::Surface;
use crate::theme::{ConnectorStyle, ItemStyle, Marker};
use derive_more::{Display, From, Into};
use std::fmt::Write;

const ITEM_CORNER_RADIUS: f64 = 8.0;
const FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct ConnectorNode {
    index: usize,
    d: String,
    style: ConnectorStyle,
}

#[derive(Debug, Clone)]
struct ItemNode {
    index: usize,
    label: String,
    placement: Placement,
    style: ItemStyle,
}

#[derive(Debug, Clone)]
enum Node {
    Connector(ConnectorNode),
    Item(ItemNode),
}

#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    viewport: Size,
    markers: Vec<Marker>,
    nodes: Vec<Node>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn connector_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Connector(_)))
            .count()
    }

    pub fn item_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Item(_)))
            .count()
    }

    pub fn connector_style(&self, id: ElementId) -> Option<&ConnectorStyle> {
        match self.nodes.get(id.0)? {
            Node::Connector(c) => Some(&c.style),
            Node::Item(_) => None,
        }
    }

    pub fn item_style(&self, id: ElementId) -> Option<&ItemStyle> {
        match self.nodes.get(id.0)? {
            Node::Item(i) => Some(&i.style),
            Node::Connector(_) => None,
        }
    }

    /// Step index the element was tagged with.
    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.nodes.get(id.0).map(|n| match n {
            Node::Connector(c) => c.index,
            Node::Item(i) => i.index,
        })
    }

    fn push(&mut self, node: Node) -> ElementId {
        self.nodes.push(node);
        ElementId(self.nodes.len() - 1)
    }

    pub fn to_document(&self) -> String {
        let (w, h) = (num(self.viewport.width), num(self.viewport.height));
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );

        if !self.markers.is_empty() {
            out.push_str("<defs>\n");
            for marker in &self.markers {
                write_marker(&mut out, marker);
            }
            out.push_str("</defs>\n");
        }

        out.push_str(r#"<g class="connectors">"#);
        out.push('\n');
        for node in &self.nodes {
            if let Node::Connector(c) = node {
                write_connector(&mut out, c);
            }
        }
        out.push_str("</g>\n");

        out.push_str(r#"<g class="items">"#);
        out.push('\n');
        for node in &self.nodes {
            if let Node::Item(i) = node {
                write_item(&mut out, i);
            }
        }
        out.push_str("</g>\n</svg>\n");
        out
    }
}

fn write_marker(out: &mut String, marker: &Marker) {
    let size = num(marker.size);
    let _ = writeln!(
        out,
        r#"<marker id="{}" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="{size}" markerHeight="{size}" markerUnits="userSpaceOnUse" orient="auto"><path d="M0,0 L10,5 L0,10 z" fill="{}"/></marker>"#,
        marker.id, marker.color
    );
}

fn write_connector(out: &mut String, c: &ConnectorNode) {
    let _ = writeln!(
        out,
        r#"<path id="connector-{i}" data-index="{i}" class="{}" d="{}" fill="none" stroke="{}" stroke-width="{}" marker-end="url(#{})"/>"#,
        c.style.class(),
        c.d,
        c.style.stroke,
        num(c.style.width),
        c.style.marker,
        i = c.index,
    );
}

fn write_item(out: &mut String, i: &ItemNode) {
    let p = &i.placement;
    let (cx, cy) = (num(p.center.x), num(p.center.y));
    let transform = if i.style.scale != 1.0 {
        format!(
            r#" transform="translate({cx} {cy}) scale({}) translate({} {})""#,
            num(i.style.scale),
            num(-p.center.x),
            num(-p.center.y),
        )
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        r#"<g id="item-{idx}" data-index="{idx}" class="{}" tabindex="0"{transform}><rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}"/><text x="{cx}" y="{cy}" fill="{}" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text></g>"#,
        i.style.class(),
        num(p.origin.x),
        num(p.origin.y),
        num(p.size.width),
        num(p.size.height),
        i.style.fill,
        i.style.text,
        num(FONT_SIZE),
        escape_xml(&i.label),
        idx = i.index,
        r = num(ITEM_CORNER_RADIUS),
    );
}

pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl Surface for SvgSurface {
    type Handle = ElementId;

    fn resize(&mut self, size: Size) {
        self.viewport = size;
    }

    fn clear(&mut self) {
        self.markers.clear();
        self.nodes.clear();
    }

    fn define_marker(&mut self, marker: &Marker) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker.clone());
    }

    fn draw_connector(&mut self, segment: &ConnectorSegment, style: &ConnectorStyle) -> ElementId {
        self.push(Node::Connector(ConnectorNode {
            index: segment.index,
            d: segment.path_data(),
            style: style.clone(),
        }))
    }

    fn draw_item(&mut self, item: &Item, placement: &Placement, style: &ItemStyle) -> ElementId {
        self.push(Node::Item(ItemNode {
            index: item.index,
            label: item.label.to_string(),
            placement: *placement,
            style: style.clone(),
        }))
    }

    fn restyle_connector(&mut self, handle: ElementId, style: &ConnectorStyle) {
        match self.nodes.get_mut(handle.0) {
            Some(Node::Connector(c)) => c.style = style.clone(),
            _ => log::warn!("No connector element {}", handle),
        }
    }

    fn restyle_item(&mut self, handle: ElementId, style: &ItemStyle) {
        match self.nodes.get_mut(handle.0) {
            Some(Node::Item(i)) => i.style = style.clone(),
            _ => log::warn!("No item element {}", handle),
        }
    }
}
