use crate::error::LayoutError;
use crate::types::{Point, Pt};

/// Rectangular placement area with its absolute position resolved at construction.
///
/// Relative edges are measured from the region's own bottom-left corner, so `left` and
/// `bottom` are always zero.
/// Largest absolute page coordinate, in millipoints, that a region edge may sit on.
const COORD_LIMIT_MILLI: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    top_left: Point,
    width: Pt,
    height: Pt,
}

impl Region {
    /// `top_left` is in absolute page coordinates. Every edge must lie within
    /// ±1e9pt of the page origin; anything further out (including anchors built from
    /// NaN or infinite input) is a `Geometry` error.
    pub fn new(top_left: Point, width: Pt, height: Pt) -> Result<Self, LayoutError> {
        if !width.is_positive() || !height.is_positive() {
            return Err(LayoutError::Geometry(format!(
                "region must have positive size (got {}x{}pt)",
                width, height
            )));
        }
        let region = Self {
            top_left,
            width,
            height,
        };
        let edges = [
            region.absolute_left(),
            region.absolute_right(),
            region.absolute_top(),
            region.absolute_bottom(),
        ];
        if edges
            .iter()
            .any(|edge| edge.to_milli_i64().abs() > COORD_LIMIT_MILLI)
        {
            return Err(LayoutError::Geometry(format!(
                "region at ({}, {}) sized {}x{}pt leaves the addressable page range",
                top_left.x, top_left.y, width, height
            )));
        }
        Ok(region)
    }

    pub fn width(&self) -> Pt {
        self.width
    }

    pub fn height(&self) -> Pt {
        self.height
    }

    pub fn left(&self) -> Pt {
        Pt::ZERO
    }

    pub fn right(&self) -> Pt {
        self.width
    }

    pub fn top(&self) -> Pt {
        self.height
    }

    pub fn bottom(&self) -> Pt {
        Pt::ZERO
    }

    pub fn absolute_left(&self) -> Pt {
        self.top_left.x
    }

    pub fn absolute_right(&self) -> Pt {
        self.top_left.x + self.width
    }

    pub fn absolute_top(&self) -> Pt {
        self.top_left.y
    }

    pub fn absolute_bottom(&self) -> Pt {
        self.top_left.y - self.height
    }

    pub fn absolute_top_left(&self) -> Point {
        self.top_left
    }

    /// Local frame origin in absolute coordinates.
    pub fn absolute_origin(&self) -> Point {
        Point::from_pt(self.absolute_left(), self.absolute_bottom())
    }
}

/// Optional size overrides; unset keys take a caller-specific default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionOptions {
    pub width: Option<Pt>,
    pub height: Option<Pt>,
}

impl RegionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(Pt::from_f32(width));
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(Pt::from_f32(height));
        self
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self::new().width(width).height(height)
    }

    pub(crate) fn resolve(&self, default_width: Pt, default_height: Pt) -> (Pt, Pt) {
        (
            self.width.unwrap_or(default_width),
            self.height.unwrap_or(default_height),
        )
    }
}
