use crate::connector::{self, ConnectorSegment, ConnectorSettings};
use crate::geometry::{CircleLayout, Point, Size, deg_to_rad};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const DEFAULT_RATIO: f64 = 0.35;
pub const DEFAULT_START_ANGLE: f64 = -90.0; // degrees, top of the circle
pub const DEFAULT_BOX_WIDTH: f64 = 140.0;
pub const DEFAULT_BOX_HEIGHT: f64 = 56.0;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for BoxSize {
    fn default() -> Self {
        Self::new(DEFAULT_BOX_WIDTH, DEFAULT_BOX_HEIGHT)
    }
}

/// One step of the process. `position` is the top-left pixel offset inside the container,
/// written by [`LayoutEngine::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub index: usize,
    pub label: Label,
    pub size: BoxSize,
    pub position: Option<Point>,
}

impl Item {
    pub fn new(index: usize, label: Label, size: BoxSize) -> Self {
        Self {
            index,
            label,
            size,
            position: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub angle: f64,
    pub center: Point,
    pub origin: Point,
    pub size: BoxSize,
}

impl Placement {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size.height
    }
}

/// Everything one layout pass produces. Recomputed from scratch on every trigger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPass {
    pub size: Size,
    pub circle: Option<CircleLayout>,
    pub placements: Vec<Placement>,
    pub connectors: Vec<ConnectorSegment>,
}

impl LayoutPass {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    ratio: f64,
    start_angle: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO, DEFAULT_START_ANGLE)
    }
}

impl LayoutEngine {
    pub fn new(ratio: f64, start_angle_degrees: f64) -> Self {
        Self {
            ratio,
            start_angle: deg_to_rad(start_angle_degrees),
        }
    }

    pub fn angle_step(count: usize) -> f64 {
        2.0 * PI / count.max(1) as f64
    }

    /// Angles grow clockwise on screen since y points down.
    pub fn angle(&self, index: usize, count: usize) -> f64 {
        self.start_angle + index as f64 * Self::angle_step(count)
    }

    pub fn circle(&self, container: Size) -> Option<CircleLayout> {
        if container.is_empty() {
            return None;
        }
        let circle = CircleLayout::fit(container, self.ratio);
        (circle.radius.is_finite() && circle.radius > 0.0).then_some(circle)
    }

    pub fn place(&self, container: Size, boxes: &[BoxSize]) -> Vec<Placement> {
        let Some(circle) = self.circle(container) else {
            return Vec::new();
        };
        self.place_on(&circle, boxes)
    }

    fn place_on(&self, circle: &CircleLayout, boxes: &[BoxSize]) -> Vec<Placement> {
        let count = boxes.len();
        boxes
            .iter()
            .enumerate()
            .map(|(index, size)| {
                let angle = self.angle(index, count);
                let center = circle.point_at(angle);
                Placement {
                    index,
                    angle,
                    center,
                    origin: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
                    size: *size,
                }
            })
            .collect()
    }

    /// Writes each item's position. Items get `None` when the container is degenerate so no
    /// stale position survives a collapse to zero size.
    pub fn apply(&self, container: Size, items: &mut [Item]) -> Vec<Placement> {
        let boxes: Vec<BoxSize> = items.iter().map(|item| item.size).collect();
        let placements = self.place(container, &boxes);
        write_positions(&placements, items);
        placements
    }

    pub fn pass(
        &self,
        container: Size,
        boxes: &[BoxSize],
        settings: &ConnectorSettings,
    ) -> LayoutPass {
        let circle = self.circle(container);
        let placements = circle
            .as_ref()
            .map(|c| self.place_on(c, boxes))
            .unwrap_or_default();
        let connectors = circle
            .as_ref()
            .map(|c| connector::build(c, &placements, settings))
            .unwrap_or_default();

        LayoutPass {
            size: container,
            circle,
            placements,
            connectors,
        }
    }
}

/// Copies each placement's top-left corner onto its item, `None` for items without one.
pub fn write_positions(placements: &[Placement], items: &mut [Item]) {
    for item in items.iter_mut() {
        item.position = placements.get(item.index).map(|p| p.origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rad_to_deg;

    const EPS: f64 = 1e-9;

    fn boxes(n: usize) -> Vec<BoxSize> {
        vec![BoxSize::default(); n]
    }

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < EPS && (actual.y - y).abs() < EPS,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_four_steps_in_square_container() {
        let engine = LayoutEngine::new(0.35, -90.0);
        let size = Size::new(800.0, 800.0);
        let circle = engine.circle(size).unwrap();
        assert_eq!(circle.center, Point::new(400.0, 400.0));
        assert!((circle.radius - 280.0).abs() < EPS);

        let placements = engine.place(size, &boxes(4));
        assert_point(placements[0].center, 400.0, 120.0);
        assert_point(placements[1].center, 680.0, 400.0);
        assert_point(placements[2].center, 400.0, 680.0);
        assert_point(placements[3].center, 120.0, 400.0);
        assert!((rad_to_deg(placements[0].angle) + 90.0).abs() < EPS);
    }

    #[test]
    fn test_even_spacing_on_circle() {
        let engine = LayoutEngine::default();
        for n in 2..=12 {
            let size = Size::new(640.0, 480.0);
            let circle = engine.circle(size).unwrap();
            let placements = engine.place(size, &boxes(n));
            assert_eq!(placements.len(), n);

            for pair in placements.windows(2) {
                let step = pair[1].angle - pair[0].angle;
                assert!((step - 2.0 * PI / n as f64).abs() < EPS);
            }
            for p in &placements {
                assert!((p.center.distance(circle.center) - circle.radius).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_produce_nothing() {
        let engine = LayoutEngine::default();
        assert!(engine.place(Size::new(800.0, 800.0), &[]).is_empty());
        assert!(engine.place(Size::new(0.0, 800.0), &boxes(4)).is_empty());

        let pass = engine.pass(Size::default(), &boxes(4), &ConnectorSettings::default());
        assert!(pass.is_empty());
        assert!(pass.connectors.is_empty());
        assert!(pass.circle.is_none());
    }

    #[test]
    fn test_apply_writes_top_left_positions() {
        let engine = LayoutEngine::new(0.35, -90.0);
        let mut items: Vec<Item> = ["Plan", "Build"]
            .iter()
            .enumerate()
            .map(|(i, l)| Item::new(i, Label::new(*l), BoxSize::new(100.0, 40.0)))
            .collect();

        engine.apply(Size::new(800.0, 800.0), &mut items);
        let pos = items[0].position.unwrap();
        assert_point(pos, 350.0, 100.0);

        engine.apply(Size::new(0.0, 0.0), &mut items);
        assert!(items.iter().all(|item| item.position.is_none()));
    }

    #[test]
    fn test_pass_positions_match_apply() {
        let engine = LayoutEngine::default();
        let size = Size::new(640.0, 480.0);
        let mut applied: Vec<Item> = (0..5)
            .map(|i| {
                let size = BoxSize::new(90.0 + i as f64, 40.0);
                Item::new(i, Label::new(format!("Step {i}")), size)
            })
            .collect();
        let mut from_pass = applied.clone();

        engine.apply(size, &mut applied);
        let sizes: Vec<BoxSize> = from_pass.iter().map(|item| item.size).collect();
        let pass = engine.pass(size, &sizes, &ConnectorSettings::default());
        write_positions(&pass.placements, &mut from_pass);

        assert_eq!(applied, from_pass);
        assert!(applied.iter().all(|item| item.position.is_some()));
    }

    #[test]
    fn test_pass_is_idempotent() {
        let engine = LayoutEngine::default();
        let settings = ConnectorSettings::default();
        let size = Size::new(913.0, 577.0);
        let first = engine.pass(size, &boxes(7), &settings);
        let second = engine.pass(size, &boxes(7), &settings);
        assert_eq!(first, second);
    }

    #[test]
    fn test_placement_contains() {
        let engine = LayoutEngine::default();
        let placements = engine.place(Size::new(800.0, 800.0), &boxes(4));
        let p = placements[0];
        assert!(p.contains(p.center));
        assert!(!p.contains(Point::new(p.center.x, p.center.y + p.size.height)));
    }
}
