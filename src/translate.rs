use crate::region::Region;
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local frame of the region to absolute page coordinates.
    ToAbsolute,
    /// Absolute page coordinates to the local frame of the region.
    ToLocal,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::ToAbsolute => Direction::ToLocal,
            Direction::ToLocal => Direction::ToAbsolute,
        }
    }
}

/// Moves `point` between the page frame and the frame anchored at the bottom-left of
/// `bounds`.
///
/// `Region::new` keeps every region edge within ±1e9pt, so for any `point` whose
/// coordinates are also within ±1e9pt the result stays inside `Pt`'s range and
/// translating back with `direction.inverse()` returns `point` exactly. Outside that
/// range the sum saturates and the round trip is lost.
pub fn translate(bounds: &Region, point: Point, direction: Direction) -> Point {
    let origin = bounds.absolute_origin();
    match direction {
        Direction::ToAbsolute => Point::from_pt(point.x + origin.x, point.y + origin.y),
        Direction::ToLocal => Point::from_pt(point.x - origin.x, point.y - origin.y),
    }
}
