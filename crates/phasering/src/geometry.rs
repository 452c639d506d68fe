use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `angle` (radians, clockwise from +x in screen space) on a circle.
    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Shortest distance from `self` to the segment `a`..`b`.
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Zero, negative or non-finite sides cannot hold a diagram.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn midpoint(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CircleLayout {
    pub center: Point,
    pub radius: f64,
}

impl CircleLayout {
    pub fn fit(container: Size, ratio: f64) -> Self {
        Self {
            center: container.midpoint(),
            radius: ratio * container.min_side(),
        }
    }

    pub fn point_at(&self, angle: f64) -> Point {
        Point::polar(self.center, self.radius, angle)
    }

    /// Angle subtended by a chord of length `chord` starting on this circle.
    pub fn chord_angle(&self, chord: f64) -> f64 {
        if self.radius <= 0.0 || chord <= 0.0 {
            return 0.0;
        }
        2.0 * (chord / (2.0 * self.radius)).min(1.0).asin()
    }
}

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_uses_shorter_side() {
        let circle = CircleLayout::fit(Size::new(1000.0, 600.0), 0.5);
        assert_eq!(circle.center, Point::new(500.0, 300.0));
        assert_eq!(circle.radius, 300.0);
    }

    #[test]
    fn test_empty_sizes() {
        assert!(Size::new(0.0, 100.0).is_empty());
        assert!(Size::new(100.0, -1.0).is_empty());
        assert!(Size::new(f64::NAN, 100.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_chord_angle() {
        let circle = CircleLayout::fit(Size::new(200.0, 200.0), 0.5);
        // chord equal to the radius subtends 60 degrees
        let angle = circle.chord_angle(100.0);
        assert!((rad_to_deg(angle) - 60.0).abs() < 1e-9);
        // chords longer than the diameter saturate at half a turn
        assert!((circle.chord_angle(1000.0) - PI).abs() < 1e-12);
        assert_eq!(circle.chord_angle(0.0), 0.0);
    }

    #[test]
    fn test_distance_to_segment() {
        let p = Point::new(5.0, 5.0);
        let d = p.distance_to_segment(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(d, 5.0);
        let d = p.distance_to_segment(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert!((d - 50.0_f64.sqrt()).abs() < 1e-12);
    }
}
