use crate::index_space::{offset_index, Axis, IndexSpace};
use crate::patch::Patch;
use super::geometry::Direction;




/// Slots of the six independent spatial metric components.
pub const G11: usize = 0;
pub const G12: usize = 1;
pub const G13: usize = 2;
pub const G22: usize = 3;
pub const G23: usize = 4;
pub const G33: usize = 5;

/// Number of fields per zone in a `MetricField`: six spatial metric
/// components, three shift components, and the lapse.
pub const NUM_METRIC_FIELDS: usize = 10;




/**
 * The 3+1 geometric quantities at one point: the symmetric spatial metric
 * (lower indexes), the shift vector (upper index), and the lapse.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metric {
    pub spatial: [f64; 6],
    pub shift: [f64; 3],
    pub lapse: f64,
}




// ============================================================================
impl Metric {

    pub fn minkowski() -> Self {
        Self {
            spatial: [1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
            shift: [0.0; 3],
            lapse: 1.0,
        }
    }

    pub fn from_slice(g: &[f64]) -> Self {
        Self {
            spatial: [g[0], g[1], g[2], g[3], g[4], g[5]],
            shift: [g[6], g[7], g[8]],
            lapse: g[9],
        }
    }

    pub fn write_to_slice(&self, g: &mut [f64]) {
        g[..6].copy_from_slice(&self.spatial);
        g[6..9].copy_from_slice(&self.shift);
        g[9] = self.lapse;
    }

    /**
     * Component `g_ab` of the spatial metric, for `a, b` in `0..3`.
     */
    pub fn component(&self, a: usize, b: usize) -> f64 {
        const SLOT: [[usize; 3]; 3] = [[G11, G12, G13], [G12, G22, G23], [G13, G23, G33]];
        self.spatial[SLOT[a][b]]
    }

    pub fn determinant(&self) -> f64 {
        let g = &self.spatial;
        g[G11] * (g[G22] * g[G33] - g[G23] * g[G23])
            - g[G12] * (g[G12] * g[G33] - g[G23] * g[G13])
            + g[G13] * (g[G12] * g[G23] - g[G22] * g[G13])
    }

    pub fn sqrt_determinant(&self) -> f64 {
        self.determinant().sqrt()
    }

    /**
     * The inverse spatial metric `g^ab`, in the same six-slot layout.
     */
    pub fn inverse(&self) -> [f64; 6] {
        let g = &self.spatial;
        let idet = 1.0 / self.determinant();
        [
            (g[G22] * g[G33] - g[G23] * g[G23]) * idet,
            (g[G13] * g[G23] - g[G12] * g[G33]) * idet,
            (g[G12] * g[G23] - g[G13] * g[G22]) * idet,
            (g[G11] * g[G33] - g[G13] * g[G13]) * idet,
            (g[G12] * g[G13] - g[G11] * g[G23]) * idet,
            (g[G11] * g[G22] - g[G12] * g[G12]) * idet,
        ]
    }

    /**
     * Lower the index of a contravariant vector: `v_a = g_ab v^b`.
     */
    pub fn lower(&self, v: [f64; 3]) -> [f64; 3] {
        let mut w = [0.0; 3];
        for a in 0..3 {
            for b in 0..3 {
                w[a] += self.component(a, b) * v[b]
            }
        }
        w
    }

    /**
     * Raise the index of a covariant vector with the inverse metric.
     */
    pub fn raise(&self, w: [f64; 3]) -> [f64; 3] {
        let inv = Metric { spatial: self.inverse(), ..*self };
        inv.lower(w)
    }

    /**
     * Express this metric in the frame where `direction` is the first axis,
     * matching `Primitive::rotate`.
     */
    pub fn rotate(&self, direction: Direction) -> Self {
        let p = direction.permutation();
        let g = |a: usize, b: usize| self.component(p[a], p[b]);
        Self {
            spatial: [g(0, 0), g(0, 1), g(0, 2), g(1, 1), g(1, 2), g(2, 2)],
            shift: direction.rotate(self.shift),
            lapse: self.lapse,
        }
    }

    fn average(a: &Self, b: &Self) -> Self {
        let mut spatial = [0.0; 6];
        let mut shift = [0.0; 3];
        for n in 0..6 {
            spatial[n] = 0.5 * (a.spatial[n] + b.spatial[n])
        }
        for n in 0..3 {
            shift[n] = 0.5 * (a.shift[n] + b.shift[n])
        }
        Self { spatial, shift, lapse: 0.5 * (a.lapse + b.lapse) }
    }
}




/**
 * Cell-centered metric data over every block of a mesh, including guard
 * zones. Face values are obtained by averaging the two cells that share the
 * face.
 */
#[derive(Clone, Debug)]
pub struct MetricField {
    data: Patch,
}




// ============================================================================
impl MetricField {

    /**
     * Sample a metric function at every cell of the given space.
     */
    pub fn from_function<F>(num_blocks: usize, space: IndexSpace, f: F) -> Self
    where
        F: Fn(usize, (i64, i64, i64)) -> Metric
    {
        let data = Patch::from_function(num_blocks, NUM_METRIC_FIELDS, space, |m, index, g| {
            f(m, index).write_to_slice(g)
        });
        Self { data }
    }

    pub fn minkowski(num_blocks: usize, space: IndexSpace) -> Self {
        Self::from_function(num_blocks, space, |_, _| Metric::minkowski())
    }

    pub fn index_space(&self) -> &IndexSpace {
        self.data.index_space()
    }

    pub fn at_cell(&self, block: usize, index: (i64, i64, i64)) -> Metric {
        Metric::from_slice(self.data.get_slice(block, index))
    }

    /**
     * The metric at face `index` normal to `axis`, which lies between cells
     * `index - 1` and `index` along that axis. Both cells must be inside the
     * field.
     */
    pub fn at_face(&self, block: usize, axis: Axis, index: (i64, i64, i64)) -> Metric {
        let l = self.at_cell(block, offset_index(index, -1, axis));
        let r = self.at_cell(block, index);
        Metric::average(&l, &r)
    }
}
