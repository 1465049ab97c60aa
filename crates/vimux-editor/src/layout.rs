//! Layout tree: how the terminal is divided between panes.
//!
//! A binary tree whose leaves are pane ids and whose inner nodes split
//! their area side by side or stacked:
//!
//! ```text
//! Vertical
//! ├── Leaf(0)           ← left pane
//! └── Horizontal
//!     ├── Leaf(1)       ← top-right pane
//!     └── Leaf(2)       ← bottom-right pane
//! ```
//!
//! Both kinds of split keep one cell between the children for a divider,
//! `│` or `─`. Each split carries a pair of weights; [`Layout::layout`]
//! shares the space between the children in that proportion, rounding to
//! whole cells and giving the remainder to the second child, so the leaf
//! rectangles and dividers always tile the area exactly.
//!
//! Structural changes rebuild the affected subtree in place; there are no
//! parent pointers. Zoom is not part of the tree: the session draws the
//! active pane over the whole area and leaves the tree as it was.

use tracing::debug;

/// Pane identifier. Monotonically increasing, never reused.
pub type PaneId = usize;

/// A rectangle on screen: origin (x, y) and dimensions (width, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Columns (side by side) or rows (stacked) along `dir`.
    const fn extent(self, dir: SplitDir) -> u16 {
        match dir {
            SplitDir::Vertical => self.w,
            SplitDir::Horizontal => self.h,
        }
    }
}

/// Which way a split divides its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDir {
    /// Side by side, with a `│` divider column.
    Vertical,
    /// Stacked, with a `─` divider row.
    Horizontal,
}

/// Direction for pane selection and resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

impl Direction {
    const fn axis(self) -> SplitDir {
        match self {
            Self::Left | Self::Right => SplitDir::Vertical,
            Self::Up | Self::Down => SplitDir::Horizontal,
        }
    }
}

/// A divider line between two siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider {
    pub x: u16,
    pub y: u16,
    /// Cells along the divider.
    pub len: u16,
    /// `│` when true, `─` otherwise.
    pub vertical: bool,
}

/// A node in the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Leaf(PaneId),
    Split {
        dir: SplitDir,
        /// Share of the space for the first and second child.
        weights: [u32; 2],
        first: Box<Self>,
        second: Box<Self>,
    },
}

/// Cells for the first and second child of a split of `total` cells, the
/// divider excluded. Below three cells there is no room for a divider and
/// everything goes to the first child.
fn split_sizes(total: u16, weights: [u32; 2]) -> Option<(u16, u16)> {
    if total < 3 {
        return None;
    }
    let avail = u64::from(total - 1);
    let sum = u64::from(weights[0]) + u64::from(weights[1]);
    let first = if sum == 0 {
        avail / 2
    } else {
        (2 * avail * u64::from(weights[0]) + sum) / (2 * sum)
    };
    let first = u16::try_from(first.clamp(1, avail - 1)).unwrap_or(1);
    Some((first, total - 1 - first))
}

/// Areas of the two children and of the divider between them.
fn child_areas(area: Rect, dir: SplitDir, weights: [u32; 2]) -> Option<(Rect, Rect, Divider)> {
    let (a, b) = split_sizes(area.extent(dir), weights)?;
    Some(match dir {
        SplitDir::Vertical => (
            Rect::new(area.x, area.y, a, area.h),
            Rect::new(area.x + a + 1, area.y, b, area.h),
            Divider { x: area.x + a, y: area.y, len: area.h, vertical: true },
        ),
        SplitDir::Horizontal => (
            Rect::new(area.x, area.y, area.w, a),
            Rect::new(area.x, area.y + a + 1, area.w, b),
            Divider { x: area.x, y: area.y + a, len: area.w, vertical: false },
        ),
    })
}

impl Layout {
    #[must_use]
    pub const fn leaf(id: PaneId) -> Self {
        Self::Leaf(id)
    }

    /// An even split of `first` and `second`.
    #[must_use]
    pub fn split(dir: SplitDir, first: Self, second: Self) -> Self {
        Self::Split {
            dir,
            weights: [1, 1],
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    // -- Queries ---------------------------------------------------------------

    /// All pane ids, depth-first, left/top before right/bottom.
    #[must_use]
    pub fn leaves(&self) -> Vec<PaneId> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<PaneId>) {
        match self {
            Self::Leaf(id) => out.push(*id),
            Self::Split { first, second, .. } => {
                first.collect_leaves(out);
                second.collect_leaves(out);
            }
        }
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split { first, second, .. } => first.pane_count() + second.pane_count(),
        }
    }

    #[must_use]
    pub fn contains(&self, id: PaneId) -> bool {
        match self {
            Self::Leaf(p) => *p == id,
            Self::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    // -- Geometry --------------------------------------------------------------

    /// Rectangles of every visible pane. A split too small for a divider
    /// shows only its first child.
    #[must_use]
    pub fn layout(&self, area: Rect) -> Vec<(PaneId, Rect)> {
        let mut out = Vec::new();
        self.walk(area, &mut |node, rect| {
            if let Self::Leaf(id) = node {
                out.push((*id, rect));
            }
        });
        out
    }

    /// Dividers between visible siblings.
    #[must_use]
    pub fn dividers(&self, area: Rect) -> Vec<Divider> {
        let mut out = Vec::new();
        self.walk(area, &mut |node, rect| {
            if let Self::Split { dir, weights, .. } = node {
                if let Some((_, _, divider)) = child_areas(rect, *dir, *weights) {
                    out.push(divider);
                }
            }
        });
        out
    }

    /// Rectangle of pane `id`, if it is visible.
    #[must_use]
    pub fn rect_of(&self, id: PaneId, area: Rect) -> Option<Rect> {
        self.layout(area).into_iter().find(|(p, _)| *p == id).map(|(_, r)| r)
    }

    /// Visit every visible node with its area, parents first.
    fn walk(&self, area: Rect, f: &mut impl FnMut(&Self, Rect)) {
        f(self, area);
        if let Self::Split { dir, weights, first, second } = self {
            match child_areas(area, *dir, *weights) {
                Some((a, b, _)) => {
                    first.walk(a, f);
                    second.walk(b, f);
                }
                None => first.walk(area, f),
            }
        }
    }

    /// Smallest extent along `dir` the subtree can be drawn in.
    fn min_extent(&self, dir: SplitDir) -> u16 {
        match self {
            Self::Leaf(_) => 1,
            Self::Split { dir: d, first, second, .. } if *d == dir => {
                first.min_extent(dir) + second.min_extent(dir) + 1
            }
            Self::Split { first, second, .. } => first.min_extent(dir).max(second.min_extent(dir)),
        }
    }

    // -- Mutations --------------------------------------------------------------

    /// Split pane `target`: it keeps the left or top half and `new_id`
    /// takes the other. Returns `false` when the target is missing.
    pub fn split_pane(&mut self, target: PaneId, new_id: PaneId, dir: SplitDir) -> bool {
        match self {
            Self::Leaf(id) if *id == target => {
                *self = Self::split(dir, Self::Leaf(target), Self::Leaf(new_id));
                true
            }
            Self::Leaf(_) => false,
            Self::Split { first, second, .. } => {
                first.split_pane(target, new_id, dir) || second.split_pane(target, new_id, dir)
            }
        }
    }

    /// Remove pane `target`; its parent split collapses into the sibling.
    /// The last pane cannot be removed.
    pub fn remove(&mut self, target: PaneId) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Split { first, second, .. } => {
                if matches!(first.as_ref(), Self::Leaf(id) if *id == target) {
                    let sibling = std::mem::replace(second.as_mut(), Self::Leaf(target));
                    *self = sibling;
                    return true;
                }
                if matches!(second.as_ref(), Self::Leaf(id) if *id == target) {
                    let sibling = std::mem::replace(first.as_mut(), Self::Leaf(target));
                    *self = sibling;
                    return true;
                }
                first.remove(target) || second.remove(target)
            }
        }
    }

    /// Move the divider nearest to `target` across `dir`'s axis by
    /// `amount` cells in that direction. Each side keeps room for its
    /// panes. Returns `false` when nothing moved.
    pub fn resize(&mut self, target: PaneId, dir: Direction, amount: u16, area: Rect) -> bool {
        let Some(path) = self.path_to(target) else {
            return false;
        };
        let axis = dir.axis();

        // Deepest split on the path that divides along the axis.
        let mut node: &Self = self;
        let mut rect = area;
        let mut found = None;
        for (depth, &go_second) in path.iter().enumerate() {
            let Self::Split { dir: d, weights, first, second } = node else { break };
            let Some((a, b, _)) = child_areas(rect, *d, *weights) else { break };
            if *d == axis {
                found = Some((depth, rect));
            }
            (node, rect) = if go_second { (second.as_ref(), b) } else { (first.as_ref(), a) };
        }
        let Some((depth, rect)) = found else {
            return false;
        };

        let node = self.node_mut(&path[..depth]);
        let Self::Split { weights, first, second, .. } = node else {
            return false;
        };
        let total = rect.extent(axis);
        let Some((a, _)) = split_sizes(total, *weights) else {
            return false;
        };
        let lo = first.min_extent(axis);
        let hi = (total - 1).saturating_sub(second.min_extent(axis)).max(lo);
        let moved = match dir {
            Direction::Right | Direction::Down => a.saturating_add(amount),
            Direction::Left | Direction::Up => a.saturating_sub(amount),
        }
        .clamp(lo, hi);
        if moved == a {
            return false;
        }
        debug!(target: "layout", pane = target, ?dir, from = a, to = moved, "resize");
        *weights = [u32::from(moved), u32::from(total - 1 - moved)];
        true
    }

    /// Turns taken from the root to reach `target`; `true` is the second
    /// child.
    fn path_to(&self, target: PaneId) -> Option<Vec<bool>> {
        match self {
            Self::Leaf(id) => (*id == target).then(Vec::new),
            Self::Split { first, second, .. } => {
                let (child, turn) = if first.contains(target) {
                    (first, false)
                } else {
                    (second, true)
                };
                let mut path = child.path_to(target)?;
                path.insert(0, turn);
                Some(path)
            }
        }
    }

    fn node_mut(&mut self, path: &[bool]) -> &mut Self {
        match (path.split_first(), self) {
            (Some((&go_second, rest)), Self::Split { first, second, .. }) => {
                if go_second { second.node_mut(rest) } else { first.node_mut(rest) }
            }
            (_, node) => node,
        }
    }

    // -- Navigation ------------------------------------------------------------

    /// The pane after `current` in tree order, wrapping.
    #[must_use]
    pub fn cycle_next(&self, current: PaneId) -> PaneId {
        let leaves = self.leaves();
        let pos = leaves.iter().position(|&id| id == current).unwrap_or(0);
        leaves.get((pos + 1) % leaves.len().max(1)).copied().unwrap_or(current)
    }

    /// The pane across the divider from `current` in `dir`, wrapping to
    /// the far edge when `current` is at the edge of the area.
    ///
    /// Among panes along that edge, the one whose centre is closest to
    /// the centre of `current` wins; ties go to the earlier pane.
    #[must_use]
    pub fn neighbor(&self, current: PaneId, dir: Direction, area: Rect) -> Option<PaneId> {
        let rects = self.layout(area);
        if rects.len() <= 1 {
            return None;
        }
        let cur = rects.iter().find(|(id, _)| *id == current)?.1;
        let right_edge = area.x + area.w;
        let bottom_edge = area.y + area.h;

        let adjacent = |r: &Rect, wrapped: bool| -> bool {
            let overlaps_rows = r.y < cur.y + cur.h && cur.y < r.y + r.h;
            let overlaps_cols = r.x < cur.x + cur.w && cur.x < r.x + r.w;
            match (dir, wrapped) {
                (Direction::Left, false) => overlaps_rows && r.x + r.w + 1 == cur.x,
                (Direction::Left, true) => overlaps_rows && r.x + r.w == right_edge,
                (Direction::Right, false) => overlaps_rows && cur.x + cur.w + 1 == r.x,
                (Direction::Right, true) => overlaps_rows && r.x == area.x,
                (Direction::Up, false) => overlaps_cols && r.y + r.h + 1 == cur.y,
                (Direction::Up, true) => overlaps_cols && r.y + r.h == bottom_edge,
                (Direction::Down, false) => overlaps_cols && cur.y + cur.h + 1 == r.y,
                (Direction::Down, true) => overlaps_cols && r.y == area.y,
            }
        };

        let mid = |r: &Rect| match dir.axis() {
            SplitDir::Vertical => i32::from(r.y) * 2 + i32::from(r.h),
            SplitDir::Horizontal => i32::from(r.x) * 2 + i32::from(r.w),
        };
        let pick = |wrapped: bool| {
            rects
                .iter()
                .filter(|(id, r)| *id != current && adjacent(r, wrapped))
                .min_by_key(|(_, r)| (mid(r) - mid(&cur)).abs())
                .map(|(id, _)| *id)
        };
        pick(false).or_else(|| pick(true))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
