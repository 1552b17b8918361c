//! Geometry helpers for the evacuation simulation
//!
//! Plan coordinates are 2D with `y` growing downwards, matching the floor
//! plans the simulation is fed with.

use ordered_float::OrderedFloat;

/// A 2D position on a floor plan
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Bearing from this position to another, in radians
    pub fn angle_to(&self, other: &Position) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Unit vector pointing from `origin` to this position.
    /// Returns `None` when the two positions coincide.
    pub fn direction_from(&self, origin: &Position) -> Option<(f32, f32)> {
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len > f32::EPSILON && len.is_finite() {
            Some((dx / len, dy / len))
        } else {
            None
        }
    }

    /// Move `distance` units along the bearing towards `target`
    pub fn step_towards(&self, target: &Position, distance: f32) -> Position {
        let angle = self.angle_to(target);
        Position {
            x: self.x + angle.cos() * distance,
            y: self.y + angle.sin() * distance,
        }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-size or malformed rectangles contain nothing
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edges count as inside
    pub fn contains(&self, point: &Position) -> bool {
        !self.is_degenerate()
            && point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the right edge
    pub fn right_midpoint(&self) -> Position {
        Position::new(self.right(), self.y + self.height / 2.0)
    }

    /// Clamp a contained point across the nearest edge so that it ends up
    /// `clearance` units outside the rectangle. Points outside are returned
    /// unchanged.
    pub fn push_outside(&self, point: Position, clearance: f32) -> Position {
        if !self.contains(&point) {
            return point;
        }

        let to_left = point.x - self.x;
        let to_right = self.right() - point.x;
        let to_top = point.y - self.y;
        let to_bottom = self.bottom() - point.y;
        let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

        if nearest == to_left {
            Position::new(self.x - clearance, point.y)
        } else if nearest == to_right {
            Position::new(self.right() + clearance, point.y)
        } else if nearest == to_top {
            Position::new(point.x, self.y - clearance)
        } else {
            Position::new(point.x, self.bottom() + clearance)
        }
    }
}

/// Find the item closest to `origin`. Ties go to the first item found.
pub fn nearest<T, I, F>(origin: &Position, items: I, position_of: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Position,
{
    items
        .into_iter()
        .min_by_key(|item| OrderedFloat(origin.distance(&position_of(item))))
}
