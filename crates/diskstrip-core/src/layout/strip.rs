/// Alternating-strip treemap layout.
///
/// Each directory's rectangle is cut into parallel strips, one per child
/// with a positive size, along whichever axis is longer at that level.
/// Widths come from integer floor division and the last child absorbs the
/// rounding remainder, so a level's strips always tile its rectangle
/// exactly. All arithmetic is integral: the same tree and the same
/// rectangle always yield the same placements.
use super::rect::{Placement, Rect};
use crate::model::{FileTree, NodeIndex};

/// Smallest width or height at which a node is placed at all.
pub const MIN_NODE_EXTENT: i64 = 2;

/// Smallest width or height a directory's inset needs before children are split into it.
pub const MIN_SPLIT_EXTENT: i64 = 4;

/// Gap between a directory's edge and its children, on every side.
pub const INSET: i64 = 2;

/// Lay out `node` in the rectangle at `(x, y)` of the given size.
///
/// Returns `node`'s own placement followed by those of its descendants, in
/// drawing order. Nothing is placed when the rectangle is narrower or
/// shorter than [`MIN_NODE_EXTENT`].
#[allow(clippy::too_many_arguments)]
pub fn layout(
    tree: &FileTree,
    node: NodeIndex,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    level: usize,
    max_draw_depth: usize,
) -> Vec<Placement> {
    let mut engine = Engine::new(tree, max_draw_depth);
    engine.place(node, x, y, width, height, level);
    engine.out
}

/// Split the rectangle at `(x, y)` among `children`, in the given order.
///
/// `level` is passed through unchanged to every child; only the directory
/// step in [`layout`] moves one level deeper.
#[allow(clippy::too_many_arguments)]
pub fn strip_split(
    tree: &FileTree,
    children: &[NodeIndex],
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    level: usize,
    max_draw_depth: usize,
) -> Vec<Placement> {
    let mut engine = Engine::new(tree, max_draw_depth);
    engine.split(children, x, y, width, height, level);
    engine.out
}

struct Engine<'t> {
    tree: &'t FileTree,
    max_draw_depth: usize,
    out: Vec<Placement>,
}

impl<'t> Engine<'t> {
    fn new(tree: &'t FileTree, max_draw_depth: usize) -> Self {
        Self {
            tree,
            max_draw_depth,
            out: Vec::new(),
        }
    }

    fn place(&mut self, node: NodeIndex, x: i64, y: i64, width: i64, height: i64, level: usize) {
        if width < MIN_NODE_EXTENT || height < MIN_NODE_EXTENT {
            return;
        }

        self.out.push(Placement {
            node,
            rect: Rect::from_origin_size(x, y, width, height),
            level,
        });

        if level >= self.max_draw_depth {
            return;
        }
        let Some(children) = self.tree.children(node) else {
            return;
        };

        let mut visible: Vec<NodeIndex> = children
            .into_iter()
            .filter(|&child| self.tree.node(child).size > 0)
            .collect();
        if visible.is_empty() {
            return;
        }
        // Stable: equal sizes keep enumeration order.
        visible.sort_by(|&a, &b| self.tree.node(b).size.cmp(&self.tree.node(a).size));

        self.split(
            &visible,
            x + INSET,
            y + INSET,
            width - 2 * INSET,
            height - 2 * INSET,
            level + 1,
        );
    }

    fn split(
        &mut self,
        children: &[NodeIndex],
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        level: usize,
    ) {
        if children.is_empty() || width < MIN_SPLIT_EXTENT || height < MIN_SPLIT_EXTENT {
            return;
        }

        let total: u128 = children
            .iter()
            .map(|&child| u128::from(self.tree.node(child).size))
            .sum();
        if total == 0 {
            return;
        }

        if let [only] = children {
            self.place(*only, x, y, width, height, level);
            return;
        }

        let vertical = width > height;
        let dimension = if vertical { width } else { height };
        let mut remaining = dimension;
        let mut offset = 0;

        for (i, &child) in children.iter().enumerate() {
            let share = if i + 1 == children.len() {
                remaining
            } else {
                let share = proportional_share(dimension, self.tree.node(child).size, total);
                remaining -= share;
                share
            };
            if share <= 0 {
                continue;
            }

            if vertical {
                self.place(child, x + offset, y, share, height, level);
            } else {
                self.place(child, x, y + offset, width, share, level);
            }
            offset += share;
        }
    }
}

/// `floor(dimension * size / total)`, at least 1 for a positive size.
fn proportional_share(dimension: i64, size: u64, total: u128) -> i64 {
    let Ok(dimension_units) = u128::try_from(dimension) else {
        return 0;
    };
    let share = dimension_units * u128::from(size) / total;
    let share = i64::try_from(share).unwrap_or(dimension);
    if share == 0 && size > 0 {
        1
    } else {
        share
    }
}
