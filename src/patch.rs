use crate::index_space::IndexSpace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};




/**
 * A patch is a mapping from a rectangular index space, repeated over a
 * number of mesh blocks, to associated field values. It is backed by one
 * flat buffer; each zone owns a contiguous chunk of `num_fields` values.
 * Values are addressed logically by `(block, field, k, j, i)`. Blocks are
 * the slowest-varying dimension, the `i` index the fastest after the field.
 *
 * Parallel traversals hand out disjoint per-zone slices, so kernels that
 * write one zone each never need any synchronization.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patch {
    num_blocks: usize,
    num_fields: usize,
    space: IndexSpace,
    data: Vec<f64>,
}




// ============================================================================
impl Patch {


    /**
     * Create a patch with all values set to zero.
     */
    pub fn zeros(num_blocks: usize, num_fields: usize, space: IndexSpace) -> Self {
        let data = vec![0.0; num_blocks * space.len() * num_fields];
        Self { num_blocks, num_fields, space, data }
    }


    /**
     * Generate a patch with values defined from a closure, which writes the
     * fields of the zone at `(block, index)` into the given slice.
     */
    pub fn from_function<F>(num_blocks: usize, num_fields: usize, space: IndexSpace, f: F) -> Self
    where
        F: Fn(usize, (i64, i64, i64), &mut [f64])
    {
        let mut patch = Self::zeros(num_blocks, num_fields, space);
        let n = patch.space.len();
        let space = patch.space.clone();

        for (z, slice) in patch.data.chunks_exact_mut(num_fields).enumerate() {
            f(z / n, space.index_at(z % n), slice)
        }
        patch
    }


    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }


    fn zone_offset(&self, block: usize, index: (i64, i64, i64)) -> usize {
        self.validate(block, index);
        (block * self.space.len() + self.space.row_major_offset(index)) * self.num_fields
    }


    /**
     * Return the field values of one zone.
     */
    pub fn get_slice(&self, block: usize, index: (i64, i64, i64)) -> &[f64] {
        let s = self.zone_offset(block, index);
        &self.data[s..s + self.num_fields]
    }


    /**
     * Return the field values of one zone, mutably.
     */
    pub fn get_slice_mut(&mut self, block: usize, index: (i64, i64, i64)) -> &mut [f64] {
        let s = self.zone_offset(block, index);
        let n = self.num_fields;
        &mut self.data[s..s + n]
    }


    /**
     * Read a single value at `(block, field, index)`.
     */
    pub fn get(&self, block: usize, field: usize, index: (i64, i64, i64)) -> f64 {
        self.get_slice(block, index)[field]
    }


    /**
     * Write a single value at `(block, field, index)`.
     */
    pub fn set(&mut self, block: usize, field: usize, index: (i64, i64, i64), value: f64) {
        self.get_slice_mut(block, index)[field] = value
    }


    /**
     * Iterate over `(block, index, slice)` for every zone, in memory order.
     */
    pub fn iter_zones(&self) -> impl Iterator<Item = (usize, (i64, i64, i64), &[f64])> + '_ {
        let n = self.space.len();
        let space = &self.space;
        self.data
            .chunks_exact(self.num_fields)
            .enumerate()
            .map(move |(z, slice)| (z / n, space.index_at(z % n), slice))
    }


    /**
     * Parallel iterator over `(block, index, slice)` for every zone. Each
     * mutable slice is handed to exactly one task.
     */
    pub fn par_zones_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, (i64, i64, i64), &mut [f64])> + '_ {
        let n = self.space.len();
        let space = &self.space;
        self.data
            .par_chunks_exact_mut(self.num_fields)
            .enumerate()
            .map(move |(z, slice)| (z / n, space.index_at(z % n), slice))
    }


    fn validate(&self, block: usize, index: (i64, i64, i64)) {
        if block >= self.num_blocks || !self.space.contains(index) {
            let (s, e) = (self.space.start(), self.space.end());
            panic!("zone {} {:?} out of range on patch with {} blocks over {:?}..{:?}",
                block,
                index,
                self.num_blocks,
                s,
                e);
        }
    }
}
