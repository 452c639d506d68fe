use super::theme::ThemeColors;
use cairo::Context;
use phasering::connector::{ConnectorSegment, PathShape};
use phasering::geometry::{Point, Size};
use phasering::layout::{Item, Placement};
use phasering::render::Surface;
use phasering::theme::{ConnectorStyle, HexColor, ItemStyle, Marker};
use std::f64::consts::PI;

const CORNER_RADIUS: f64 = 8.0;
const FONT_SIZE: f64 = 14.0;
const HINT: &str = "1-9 select  ·  ←/→ move  ·  Enter activate  ·  Esc clear";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneHandle {
    Connector(usize),
    Item(usize),
}

#[derive(Debug, Clone)]
struct SceneConnector {
    segment: ConnectorSegment,
    style: ConnectorStyle,
}

#[derive(Debug, Clone)]
struct SceneItem {
    label: String,
    placement: Placement,
    style: ItemStyle,
}

/// Retained primitives for the drawing area. The draw function replays them with cairo.
#[derive(Debug, Clone, Default)]
pub struct CairoScene {
    size: Size,
    markers: Vec<Marker>,
    connectors: Vec<SceneConnector>,
    items: Vec<SceneItem>,
}

impl Surface for CairoScene {
    type Handle = SceneHandle;

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.markers.clear();
        self.connectors.clear();
        self.items.clear();
    }

    fn define_marker(&mut self, marker: &Marker) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker.clone());
    }

    fn draw_connector(&mut self, segment: &ConnectorSegment, style: &ConnectorStyle) -> SceneHandle {
        self.connectors.push(SceneConnector {
            segment: *segment,
            style: style.clone(),
        });
        SceneHandle::Connector(self.connectors.len() - 1)
    }

    fn draw_item(&mut self, item: &Item, placement: &Placement, style: &ItemStyle) -> SceneHandle {
        self.items.push(SceneItem {
            label: item.label.to_string(),
            placement: *placement,
            style: style.clone(),
        });
        SceneHandle::Item(self.items.len() - 1)
    }

    fn restyle_connector(&mut self, handle: SceneHandle, style: &ConnectorStyle) {
        if let SceneHandle::Connector(i) = handle
            && let Some(connector) = self.connectors.get_mut(i)
        {
            connector.style = style.clone();
        }
    }

    fn restyle_item(&mut self, handle: SceneHandle, style: &ItemStyle) {
        if let SceneHandle::Item(i) = handle
            && let Some(item) = self.items.get_mut(i)
        {
            item.style = style.clone();
        }
    }
}

impl CairoScene {
    pub fn highlighted_connectors(&self) -> usize {
        self.connectors.iter().filter(|c| c.style.highlighted).count()
    }

    pub fn paint(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let (r, g, b, a) = colors.background.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.paint()?;

        for connector in &self.connectors {
            self.paint_connector(cr, connector)?;
        }
        for item in &self.items {
            paint_item(cr, item)?;
        }
        paint_hint(cr, self.size, colors)
    }

    fn paint_connector(&self, cr: &Context, connector: &SceneConnector) -> Result<(), cairo::Error> {
        let segment = &connector.segment;
        set_source(cr, connector.style.stroke);
        cr.set_line_width(connector.style.width);
        cr.new_path();

        match segment.shape {
            PathShape::Arc {
                center,
                radius,
                start_angle,
                span,
                sweep,
                ..
            } => {
                // cairo's positive direction is clockwise on screen, like ours
                if sweep {
                    cr.arc(center.x, center.y, radius, start_angle, start_angle + span);
                } else {
                    cr.arc_negative(center.x, center.y, radius, start_angle, start_angle - span);
                }
            }
            PathShape::Cubic { c1, c2 } => {
                cr.move_to(segment.start.x, segment.start.y);
                cr.curve_to(c1.x, c1.y, c2.x, c2.y, segment.end.x, segment.end.y);
            }
        }
        cr.stroke()?;

        match self.markers.iter().find(|m| m.id == connector.style.marker) {
            Some(marker) => paint_arrowhead(cr, segment.end, segment.terminal_tangent(), marker),
            None => Ok(()),
        }
    }
}

/// Triangle with its tip on `tip`, pointing along `heading`.
fn paint_arrowhead(cr: &Context, tip: Point, heading: f64, marker: &Marker) -> Result<(), cairo::Error> {
    let back = Point::polar(tip, marker.size, heading + PI);
    let left = Point::polar(back, marker.size / 2.0, heading - PI / 2.0);
    let right = Point::polar(back, marker.size / 2.0, heading + PI / 2.0);

    set_source(cr, marker.color);
    cr.new_path();
    cr.move_to(tip.x, tip.y);
    cr.line_to(left.x, left.y);
    cr.line_to(right.x, right.y);
    cr.close_path();
    cr.fill()
}

fn paint_item(cr: &Context, item: &SceneItem) -> Result<(), cairo::Error> {
    let p = &item.placement;
    cr.save()?;
    cr.translate(p.center.x, p.center.y);
    cr.scale(item.style.scale, item.style.scale);

    let (w, h) = (p.size.width, p.size.height);
    rounded_rect(cr, -w / 2.0, -h / 2.0, w, h, CORNER_RADIUS.min(h / 2.0));
    set_source(cr, item.style.fill);
    cr.fill()?;

    set_source(cr, item.style.text);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(FONT_SIZE);
    if let Ok(ext) = cr.text_extents(&item.label) {
        cr.move_to(
            -ext.width() / 2.0 - ext.x_bearing(),
            -ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(&item.label)?;
    }
    cr.restore()
}

fn paint_hint(cr: &Context, size: Size, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let (r, g, b, a) = colors.caption.into_components();
    cr.set_source_rgba(r, g, b, a);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(11.0);
    if let Ok(ext) = cr.text_extents(HINT) {
        cr.move_to((size.width - ext.width()) / 2.0, size.height - 12.0);
        cr.show_text(HINT)?;
    }
    Ok(())
}

fn rounded_rect(cr: &Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
    cr.close_path();
}

fn set_source(cr: &Context, color: HexColor) {
    let (r, g, b) = color.components();
    cr.set_source_rgb(r, g, b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasering::diagram::{Diagram, DiagramOptions};
    use phasering::highlight::{Interaction, Target};
    use phasering::layout::{BoxSize, Label};

    fn diagram() -> Diagram<CairoScene> {
        let items = ["Plan", "Do", "Check", "Act"]
            .iter()
            .enumerate()
            .map(|(i, l)| Item::new(i, Label::new(*l), BoxSize::default()))
            .collect();
        let mut d = Diagram::init(Some(CairoScene::default()), items, DiagramOptions::default())
            .unwrap();
        d.relayout(Size::new(400.0, 400.0));
        d
    }

    #[test]
    fn test_scene_tracks_highlight() {
        let mut d = diagram();
        assert_eq!(d.surface().highlighted_connectors(), 0);

        d.handle(Interaction::PointerEnter(Target::Item(1)));
        assert_eq!(d.surface().highlighted_connectors(), 1);

        d.handle(Interaction::PointerLeave(Target::Item(1)));
        assert_eq!(d.surface().highlighted_connectors(), 0);
    }

    #[test]
    fn test_paint_onto_image_surface() {
        let mut d = diagram();
        d.handle(Interaction::PointerEnter(Target::Connector(2)));

        let image = cairo::ImageSurface::create(cairo::Format::ARgb32, 400, 400).unwrap();
        let cr = Context::new(&image).unwrap();
        d.surface().paint(&cr, &ThemeColors::default()).unwrap();
    }

    #[test]
    fn test_restyle_ignores_foreign_handles() {
        let mut scene = CairoScene::default();
        let style = phasering::theme::Theme::default().connector_style(true);
        scene.restyle_connector(SceneHandle::Item(0), &style);
        scene.restyle_connector(SceneHandle::Connector(7), &style);
        assert_eq!(scene.highlighted_connectors(), 0);
    }
}
