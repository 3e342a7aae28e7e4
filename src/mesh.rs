use crate::index_space::{offset_index, range3d, Axis, IndexSpace};
use serde::{Deserialize, Serialize};




/**
 * Number of active spatial dimensions. This is a per-simulation setting; an
 * axis is active when the blocks have more than one zone along it.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimensionality {
    OneD,
    TwoD,
    ThreeD,
}




/**
 * A collection of equally-shaped rectilinear blocks. Each block has the same
 * interior (real) index space and number of guard zones, and its own cell
 * spacing.
 */
#[derive(Clone, Debug)]
pub struct Mesh {
    interior: IndexSpace,
    num_guard: i64,
    spacing: Vec<[f64; 3]>,
}




// ============================================================================
impl Mesh {

    /**
     * Create a mesh of blocks with `block_size` interior zones each, indexed
     * from zero, and the given cell spacing for every block.
     */
    pub fn new(block_size: (i64, i64, i64), num_guard: i64, spacing: Vec<[f64; 3]>) -> Self {
        assert!(!spacing.is_empty(), "mesh must have at least one block");
        assert!(num_guard >= 1, "at least one guard zone is needed for face fluxes");
        let interior = range3d(0..block_size.0, 0..block_size.1, 0..block_size.2);
        Self { interior, num_guard, spacing }
    }

    /**
     * Create a mesh where all blocks have the same cell spacing.
     */
    pub fn uniform(num_blocks: usize, block_size: (i64, i64, i64), num_guard: i64, spacing: [f64; 3]) -> Self {
        Self::new(block_size, num_guard, vec![spacing; num_blocks])
    }

    pub fn num_blocks(&self) -> usize {
        self.spacing.len()
    }

    /// The real (non-guard) cells of each block.
    pub fn interior(&self) -> &IndexSpace {
        &self.interior
    }

    pub fn dimensionality(&self) -> Dimensionality {
        let (_, m, n) = self.interior.dim();
        if n > 1 {
            Dimensionality::ThreeD
        } else if m > 1 {
            Dimensionality::TwoD
        } else {
            Dimensionality::OneD
        }
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        match (axis, self.dimensionality()) {
            (Axis::I, _) => true,
            (Axis::J, Dimensionality::OneD) => false,
            (Axis::J, _) => true,
            (Axis::K, d) => d == Dimensionality::ThreeD,
        }
    }

    pub fn active_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.iter().cloned().filter(move |&a| self.is_active(a))
    }

    /**
     * The interior extended by the guard zones, on active axes only.
     */
    pub fn extended(&self) -> IndexSpace {
        self.active_axes()
            .fold(self.interior.clone(), |space, axis| space.extend(self.num_guard, axis))
    }

    /**
     * The index space of faces normal to the given axis: face `f` sits
     * between cells `f - 1` and `f`.
     */
    pub fn face_space(&self, axis: Axis) -> IndexSpace {
        self.interior.extend_upper(1, axis)
    }

    pub fn cell_spacing(&self, block: usize, axis: Axis) -> f64 {
        match axis {
            Axis::I => self.spacing[block][0],
            Axis::J => self.spacing[block][1],
            Axis::K => self.spacing[block][2],
        }
    }

    pub fn total_zones(&self) -> usize {
        self.interior.len() * self.num_blocks()
    }

    /**
     * Neighbor lookup for blocks laid end to end along `axis`, in block
     * order. Returns the block and interior index holding the data of zone
     * `index` of `block`, or `None` if that zone lies past either end of the
     * row, or outside the interior on another axis.
     */
    pub fn chained_along(&self, axis: Axis, block: usize, index: (i64, i64, i64)) -> Option<(usize, (i64, i64, i64))> {
        let (ni, nj, nk) = self.interior.dim();
        let (n, x) = match axis {
            Axis::I => (ni as i64, index.0),
            Axis::J => (nj as i64, index.1),
            Axis::K => (nk as i64, index.2),
        };

        let (b, shift) = if x < 0 {
            (block.checked_sub(1)?, n)
        } else if x >= n {
            (block + 1, -n)
        } else {
            (block, 0)
        };
        let target = offset_index(index, shift, axis);

        if b < self.num_blocks() && self.interior.contains(target) {
            Some((b, target))
        } else {
            None
        }
    }
}
