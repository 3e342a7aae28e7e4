use core::ops::Range;
use serde::{Deserialize, Serialize};




/**
 * Identifier for a Cartesian axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    I,
    J,
    K,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::I, Axis::J, Axis::K];
}




#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * Represents a rectangular region in a discrete 3D index space. Indexes are
 * `(i, j, k)` tuples; in memory the `i` index increases fastest and `k`
 * slowest.
 */
pub struct IndexSpace {
    di: Range<i64>,
    dj: Range<i64>,
    dk: Range<i64>,
}




// ============================================================================
impl IndexSpace {


    pub fn new(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> Self {

        assert!(
            di.start < di.end && dj.start < dj.end && dk.start < dk.end,
            "index space has non-positive volume");

        Self { di, dj, dk }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize, usize) {
        ((self.di.end - self.di.start) as usize,
         (self.dj.end - self.dj.start) as usize,
         (self.dk.end - self.dk.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m, n) = self.dim();
        l * m * n
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> (i64, i64, i64) {
        (self.di.start, self.dj.start, self.dk.start)
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> (i64, i64, i64) {
        (self.di.end, self.dj.end, self.dk.end)
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: (i64, i64, i64)) -> bool {
        self.di.contains(&index.0) && self.dj.contains(&index.1) && self.dk.contains(&index.2)
    }


    /**
     * Expand this index space by the given number of elements on both ends
     * of one axis.
     */
    pub fn extend(&self, delta: i64, axis: Axis) -> Self {
        self.with_range(axis, |r| r.start - delta..r.end + delta)
    }


    /**
     * Expand only the upper end of this index space on the given axis. A
     * cell space extended by one on its upper end is the space of faces
     * normal to that axis.
     */
    pub fn extend_upper(&self, delta: i64, axis: Axis) -> Self {
        self.with_range(axis, |r| r.start..r.end + delta)
    }


    fn with_range<F>(&self, axis: Axis, f: F) -> Self
    where
        F: Fn(&Range<i64>) -> Range<i64>
    {
        match axis {
            Axis::I => Self::new(f(&self.di), self.dj.clone(), self.dk.clone()),
            Axis::J => Self::new(self.di.clone(), f(&self.dj), self.dk.clone()),
            Axis::K => Self::new(self.di.clone(), self.dj.clone(), f(&self.dk)),
        }
    }


    /**
     * Return the linear offset for the given index, in a memory buffer
     * aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: (i64, i64, i64)) -> usize {
        let (l, m, _) = self.dim();
        let i = (index.0 - self.di.start) as usize;
        let j = (index.1 - self.dj.start) as usize;
        let k = (index.2 - self.dk.start) as usize;
        (k * m + j) * l + i
    }


    /**
     * Inverse of `row_major_offset`: return the index at a linear offset.
     */
    pub fn index_at(&self, offset: usize) -> (i64, i64, i64) {
        let (l, m, _) = self.dim();
        let i = (offset % l) as i64;
        let j = ((offset / l) % m) as i64;
        let k = (offset / (l * m)) as i64;
        (self.di.start + i, self.dj.start + j, self.dk.start + k)
    }


    /**
     * Return an iterator which traverses the index space in memory order
     * (the `i` index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64, i64)> + '_ {
        self.dk.clone().flat_map(move |k| {
            self.dj.clone().flat_map(move |j| self.di.clone().map(move |i| (i, j, k)))
        })
    }
}




/**
 * Shift a single index by `delta` along an axis.
 */
pub fn offset_index(index: (i64, i64, i64), delta: i64, axis: Axis) -> (i64, i64, i64) {
    match axis {
        Axis::I => (index.0 + delta, index.1, index.2),
        Axis::J => (index.0, index.1 + delta, index.2),
        Axis::K => (index.0, index.1, index.2 + delta),
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range3d(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> IndexSpace {
    IndexSpace::new(di, dj, dk)
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{offset_index, range3d, Axis};

    #[test]
    fn offsets_and_indexes_are_inverse() {
        let space = range3d(-2..6, 3..7, 0..2);
        for (n, index) in space.iter().enumerate() {
            assert_eq!(space.row_major_offset(index), n);
            assert_eq!(space.index_at(n), index);
        }
        assert_eq!(space.iter().count(), space.len());
    }

    #[test]
    fn i_index_increases_fastest() {
        let space = range3d(0..4, 0..3, 0..2);
        assert_eq!(space.row_major_offset((1, 0, 0)), 1);
        assert_eq!(space.row_major_offset((0, 1, 0)), 4);
        assert_eq!(space.row_major_offset((0, 0, 1)), 12);
    }

    #[test]
    fn face_space_has_one_extra_face() {
        let cells = range3d(0..10, 0..5, 0..1);
        let faces = cells.extend_upper(1, Axis::J);
        assert_eq!(faces.dim(), (10, 6, 1));
        assert!(faces.contains((3, 5, 0)));
        assert!(!cells.contains((3, 5, 0)));
    }

    #[test]
    fn extend_moves_the_right_axis() {
        let space = range3d(0..10, 0..10, 0..10);
        assert_eq!(space.extend(2, Axis::I).dim(), (14, 10, 10));
        assert_eq!(offset_index((1, 2, 3), -1, Axis::J), (1, 1, 3));
    }
}
