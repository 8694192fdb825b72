/// Pixel geometry shared by the layout engine and its consumers.
use crate::model::NodeIndex;
use serde::Serialize;

/// Axis-aligned rectangle in integer pixel units, corners `(x1, y1)` and `(x2, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl Rect {
    pub const fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle with its top-left corner at `(x, y)`.
    pub const fn from_origin_size(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }

    /// Inclusive on all four edges, so a point on a shared border hits both
    /// neighbours; callers pick the later placement.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }
}

/// One node placed by the layout engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub node: NodeIndex,
    pub rect: Rect,
    /// Nesting level the node was placed at (the root is 0).
    pub level: usize,
}
