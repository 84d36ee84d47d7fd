//! Block positions and axis-aligned cuboid regions.
//!
//! All bounds are inclusive: a region from `(0,0,0)` to `(0,0,0)` is one block.
//! Nothing here knows about lands or players, so the geometry can be tested on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer block coordinate in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    const fn with(mut self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// The two axes orthogonal to this one.
    #[must_use]
    pub const fn others(self) -> [Self; 2] {
        match self {
            Self::X => [Self::Y, Self::Z],
            Self::Y => [Self::X, Self::Z],
            Self::Z => [Self::X, Self::Y],
        }
    }
}

/// An axis-aligned cuboid, always stored with `min <= max` on every axis.
///
/// Equality is by corners only. Adjacency bookkeeping lives in
/// [`RegionGraph`](crate::graph::RegionGraph), keyed by handle, so two equal
/// regions can still be distinct nodes there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRegion")]
pub struct Region {
    min: BlockPos,
    max: BlockPos,
}

/// Unchecked wire form; deserialization normalizes through [`Region::new`].
#[derive(Deserialize)]
struct RawRegion {
    min: BlockPos,
    max: BlockPos,
}

impl From<RawRegion> for Region {
    fn from(raw: RawRegion) -> Self {
        Self::new(raw.min, raw.max)
    }
}

impl Region {
    /// Create a region from two arbitrary corners; auto-sorts min/max.
    #[must_use]
    pub fn new(corner1: BlockPos, corner2: BlockPos) -> Self {
        Self {
            min: BlockPos::new(
                corner1.x.min(corner2.x),
                corner1.y.min(corner2.y),
                corner1.z.min(corner2.z),
            ),
            max: BlockPos::new(
                corner1.x.max(corner2.x),
                corner1.y.max(corner2.y),
                corner1.z.max(corner2.z),
            ),
        }
    }

    /// Shorthand for `Region::new` from six coordinates.
    #[must_use]
    pub fn from_coords(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32) -> Self {
        Self::new(BlockPos::new(x1, y1, z1), BlockPos::new(x2, y2, z2))
    }

    #[must_use]
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Inclusive `(low, high)` bounds along one axis.
    #[must_use]
    pub const fn span(&self, axis: Axis) -> (i32, i32) {
        (self.min.get(axis), self.max.get(axis))
    }

    /// Returns true if the block position is inside this region (inclusive min/max).
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let (lo, hi) = self.span(axis);
            (lo..=hi).contains(&pos.get(axis))
        })
    }

    /// True if `other` lies entirely inside this region.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    fn spans_intersect(&self, other: &Self, axis: Axis) -> bool {
        let (a_lo, a_hi) = self.span(axis);
        let (b_lo, b_hi) = other.span(axis);
        a_lo <= b_hi && b_lo <= a_hi
    }

    fn spans_touch(&self, other: &Self, axis: Axis) -> bool {
        let (a_lo, a_hi) = self.span(axis);
        let (b_lo, b_hi) = other.span(axis);
        // Widened so i32::MAX + 1 cannot wrap.
        i64::from(a_hi) + 1 == i64::from(b_lo) || i64::from(b_hi) + 1 == i64::from(a_lo)
    }

    /// Standard AABB test: the ranges intersect on all three axes.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        Axis::ALL.iter().all(|&axis| self.spans_intersect(other, axis))
    }

    /// The axis along which the two regions share a face, if they do.
    ///
    /// Touching along one axis makes the regions disjoint on it, so at most one
    /// axis can qualify. Overlapping regions are never adjacent.
    #[must_use]
    pub fn adjacency_axis(&self, other: &Self) -> Option<Axis> {
        Axis::ALL.into_iter().find(|&axis| {
            self.spans_touch(other, axis)
                && axis
                    .others()
                    .iter()
                    .all(|&o| self.spans_intersect(other, o))
        })
    }

    /// Face-adjacent along exactly one axis, with the other two ranges intersecting.
    #[must_use]
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.adjacency_axis(other).is_some()
    }

    /// Adjacent, and identical in extent on both axes orthogonal to the shared face.
    /// Such a pair unions into a single cuboid.
    #[must_use]
    pub fn is_same_plane_as(&self, other: &Self) -> bool {
        self.adjacency_axis(other).is_some_and(|axis| {
            axis.others()
                .iter()
                .all(|&o| self.span(o) == other.span(o))
        })
    }

    /// The overlapping cuboid, or `None` when the regions are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            min: BlockPos::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: BlockPos::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        })
    }

    /// Slab decomposition of `self` minus `other`.
    ///
    /// Without overlap the result is `[self]`. When `other` encloses `self` the
    /// result is empty. Otherwise up to six disjoint slabs are produced: the X
    /// slabs take the full Y/Z extent, the Y slabs are confined to the cut's X
    /// range, and the Z slabs to the cut's X and Y ranges.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        let Some(cut) = self.intersection(other) else {
            return vec![*self];
        };

        let mut slabs = Vec::with_capacity(6);
        // Bounds of the part of `self` not yet handed out to a slab.
        let mut core = *self;
        for axis in Axis::ALL {
            let (lo, hi) = core.span(axis);
            let (cut_lo, cut_hi) = cut.span(axis);
            if cut_lo > lo {
                slabs.push(Self {
                    min: core.min,
                    max: core.max.with(axis, cut_lo - 1),
                });
            }
            if cut_hi < hi {
                slabs.push(Self {
                    min: core.min.with(axis, cut_hi + 1),
                    max: core.max,
                });
            }
            core.min = core.min.with(axis, cut_lo);
            core.max = core.max.with(axis, cut_hi);
        }
        slabs
    }

    /// Bounding cuboid of two coplanar neighbours; `None` when they cannot fuse.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.is_same_plane_as(other) {
            return None;
        }
        Some(Self::new(
            BlockPos::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            BlockPos::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        ))
    }

    /// Number of blocks inside the region. Never zero.
    ///
    /// Saturates at `u64::MAX`, which only a region spanning most of the i32
    /// range on all three axes can reach.
    #[must_use]
    pub fn volume(&self) -> u64 {
        Axis::ALL.iter().fold(1u64, |acc, &axis| {
            let (lo, hi) = self.span(axis);
            let extent = (i64::from(hi) - i64::from(lo) + 1).unsigned_abs();
            acc.saturating_mul(extent)
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.min, self.max)
    }
}
