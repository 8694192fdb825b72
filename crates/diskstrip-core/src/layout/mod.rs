/// Layout engine: turns an aggregated [`FileTree`] into pixel rectangles.
///
/// The engine knows nothing about drawing. It returns [`Placement`]s in
/// drawing order (parents before children); keeping a node-to-rectangle map
/// for hit testing is up to the caller.
pub mod rect;
pub mod strip;

pub use rect::{Placement, Rect};
pub use strip::{layout, strip_split};

use crate::model::FileTree;

/// Default number of levels drawn below the root.
pub const DEFAULT_MAX_DRAW_DEPTH: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Directories at this level are drawn but their children are not.
    pub max_draw_depth: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_draw_depth: DEFAULT_MAX_DRAW_DEPTH,
        }
    }
}

/// Lay out the whole tree inside `bounds`, starting from the root at level 0.
///
/// Safe to call repeatedly, e.g. after a resize; the tree is only read.
pub fn layout_tree(tree: &FileTree, bounds: Rect, options: &LayoutOptions) -> Vec<Placement> {
    layout(
        tree,
        tree.root,
        bounds.x1,
        bounds.y1,
        bounds.width(),
        bounds.height(),
        0,
        options.max_draw_depth,
    )
}
