use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::config::StageCoefficients;
use crate::hydro::eos::{EquationOfState, Recovery};
use crate::hydro::euler::{Conserved, Primitive};
use crate::hydro::geometry::Direction;
use crate::hydro::metric::{Metric, MetricField};
use crate::hydro::riemann::riemann_llf;
use crate::index_space::{offset_index, IndexSpace};
use crate::mesh::Mesh;
use crate::patch::Patch;
use super::flux::Fluxes;
use super::update::flux_difference;




/**
 * One correction flag per zone of every block, over the interior and its
 * guard layer. Interior flags are set by the realizability test; guard flags
 * mirror the flags of the neighboring block so that both copies of a face on
 * a block boundary see the same pair of flags.
 */
#[derive(Clone, Debug)]
pub struct CorrectionFlags {
    interior: IndexSpace,
    space: IndexSpace,
    num_blocks: usize,
    data: Vec<bool>,
}




// ============================================================================
impl CorrectionFlags {

    pub fn new(num_blocks: usize, interior: IndexSpace, space: IndexSpace) -> Self {
        Self { data: vec![false; num_blocks * space.len()], interior, space, num_blocks }
    }

    /// Whether the zone is flagged. Zones outside the guard layer never are.
    pub fn get(&self, block: usize, index: (i64, i64, i64)) -> bool {
        block < self.num_blocks
            && self.space.contains(index)
            && self.data[block * self.space.len() + self.space.row_major_offset(index)]
    }

    /// Number of flagged interior cells.
    pub fn count(&self) -> usize {
        self.flagged().count()
    }

    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|f| *f = false)
    }

    /**
     * Iterate over the `(block, index)` of every flagged interior cell.
     */
    pub fn flagged(&self) -> impl Iterator<Item = (usize, (i64, i64, i64))> + '_ {
        let n = self.space.len();
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f)
            .map(move |(z, _)| (z / n, self.space.index_at(z % n)))
            .filter(move |(_, index)| self.interior.contains(*index))
    }

    /**
     * Set each guard flag from the interior flag it mirrors. `source` maps a
     * guard zone `(block, index)` to the interior zone of the block holding
     * its data, or `None` at a domain boundary, where the guard flag is
     * cleared.
     */
    pub fn fill_guards<G>(&mut self, source: G)
    where
        G: Fn(usize, (i64, i64, i64)) -> Option<(usize, (i64, i64, i64))> + Sync
    {
        let snapshot = self.data.clone();
        let n = self.space.len();
        let nb = self.num_blocks;
        let space = &self.space;
        let interior = &self.interior;

        self.data.par_iter_mut().enumerate().for_each(|(z, flag)| {
            let (m, index) = (z / n, space.index_at(z % n));

            if !interior.contains(index) {
                *flag = match source(m, index) {
                    Some((b, i)) if b < nb && interior.contains(i) => snapshot[b * n + space.row_major_offset(i)],
                    _ => false,
                }
            }
        })
    }
}




/**
 * Health counters of one correction pass.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FofcReport {
    pub flagged_cells: usize,
    pub corrected_faces: usize,
}




/**
 * First-order flux correction. Each pass predicts the stage update from the
 * primary fluxes, flags the cells whose predicted state has no physical
 * primitive counterpart, and replaces the fluxes on every face of a flagged
 * cell by the local Lax-Friedrichs flux. The three phases run as separate
 * parallel passes: repair reads flags set by either neighbor of a face, so
 * it starts only after every cell has been tested.
 */
#[derive(Clone, Debug)]
pub struct FluxCorrection {
    trial: Patch,
    flags: CorrectionFlags,
}




// ============================================================================
impl FluxCorrection {

    pub fn new(mesh: &Mesh) -> Self {
        let interior = mesh.interior().clone();
        Self {
            trial: Patch::zeros(mesh.num_blocks(), 5, interior.clone()),
            flags: CorrectionFlags::new(mesh.num_blocks(), interior, mesh.extended()),
        }
    }

    /// Flags set by the most recent pass.
    pub fn flags(&self) -> &CorrectionFlags {
        &self.flags
    }

    /// The predicted conserved state of the most recent pass.
    pub fn trial_state(&self) -> &Patch {
        &self.trial
    }

    /**
     * Write the trial state `gam0 u0 + gam1 u1 - beta dt div(F)` for every
     * interior cell.
     */
    pub fn predict(&mut self, mesh: &Mesh, stage: &StageCoefficients, dt: f64, u0: &Patch, u1: &Patch, fluxes: &Fluxes) {
        let beta_dt = stage.beta * dt;

        self.trial.par_zones_mut().for_each(|(m, index, u)| {
            let divf = flux_difference(mesh, fluxes, beta_dt, m, index);
            let a = u0.get_slice(m, index);
            let b = u1.get_slice(m, index);

            for n in 0..u.len().min(a.len()) {
                u[n] = stage.gam0 * a[n] + stage.gam1 * b[n] - divf[n]
            }
        })
    }

    /**
     * Flag every interior cell whose trial state fails primitive recovery,
     * and return the number of flagged cells. Guard flags are cleared.
     */
    pub fn test(&mut self, eos: &EquationOfState, metric: Option<&MetricField>) -> usize {
        let n = self.flags.space.len();
        let space = &self.flags.space;
        let interior = &self.flags.interior;
        let trial = &self.trial;

        self.flags.data
            .par_iter_mut()
            .enumerate()
            .map(|(z, flag)| {
                let (m, index) = (z / n, space.index_at(z % n));

                *flag = interior.contains(index) && {
                    let g = metric.map_or_else(Metric::minkowski, |g| g.at_cell(m, index));
                    let u = Conserved::from_slice(trial.get_slice(m, index));
                    eos.cons_to_prim(&u, &g, Recovery::Diagnostic).is_err()
                };
                *flag as usize
            })
            .sum()
    }

    /**
     * Overwrite the flux on every face adjacent to a flagged cell with the
     * local Lax-Friedrichs flux of the stored primitive states on either
     * side. Each face is visited once per axis, so a face shared by two
     * flagged cells is written once. A face on a block boundary is stored
     * by both blocks; each copy reads the guard flags, so both are
     * corrected and each counts toward the returned number of corrected
     * faces. The primitive guard zones must hold the neighbor data.
     */
    pub fn repair(
        &self,
        mesh: &Mesh,
        eos: &EquationOfState,
        primitive: &Patch,
        metric: Option<&MetricField>,
        fluxes: &mut Fluxes) -> usize
    {
        let flags = &self.flags;
        let mut corrected = 0;

        for axis in mesh.active_axes() {
            let direction = Direction::from(axis);

            if let Some(flux) = fluxes.along_mut(axis) {
                corrected += flux.par_zones_mut()
                    .map(|(m, index, f)| {
                        let l = offset_index(index, -1, axis);

                        if flags.get(m, l) || flags.get(m, index) {
                            let pl = Primitive::from_slice(primitive.get_slice(m, l));
                            let pr = Primitive::from_slice(primitive.get_slice(m, index));
                            let g = metric.map_or_else(Metric::minkowski, |g| g.at_face(m, axis, index));
                            riemann_llf(eos, &pl, &pr, direction, &g).write_to_slice(f);
                            1
                        } else {
                            0
                        }
                    })
                    .sum::<usize>()
            }
        }
        corrected
    }

    /**
     * Run a full correction pass on `fluxes`: clear the flags, predict,
     * test, fill the guard flags from `guard_source` (see
     * `CorrectionFlags::fill_guards`), and repair the faces of any flagged
     * cells.
     */
    pub fn apply<G>(
        &mut self,
        mesh: &Mesh,
        eos: &EquationOfState,
        stage: &StageCoefficients,
        dt: f64,
        u0: &Patch,
        u1: &Patch,
        primitive: &Patch,
        metric: Option<&MetricField>,
        fluxes: &mut Fluxes,
        guard_source: G) -> FofcReport
    where
        G: Fn(usize, (i64, i64, i64)) -> Option<(usize, (i64, i64, i64))> + Sync
    {
        self.flags.clear();
        self.predict(mesh, stage, dt, u0, u1, fluxes);

        let flagged_cells = self.test(eos, metric);
        let corrected_faces = if flagged_cells > 0 {
            self.flags.fill_guards(guard_source);
            self.repair(mesh, eos, primitive, metric, fluxes)
        } else {
            0
        };

        if flagged_cells > 0 {
            debug!("fofc: {} cells flagged, {} faces corrected", flagged_cells, corrected_faces);
        }
        FofcReport { flagged_cells, corrected_faces }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{CorrectionFlags, FluxCorrection};
    use crate::config::TimeIntegrator;
    use crate::hydro::eos::EquationOfState;
    use crate::hydro::euler::Primitive;
    use crate::hydro::metric::{Metric, MetricField};
    use crate::index_space::Axis;
    use crate::mesh::Mesh;
    use crate::patch::Patch;
    use crate::solvers::flux::Fluxes;
    use crate::solvers::update::conserved_from_primitive;

    fn uniform(mesh: &Mesh, eos: &EquationOfState) -> (Patch, Patch) {
        let w = Patch::from_function(mesh.num_blocks(), 5, mesh.extended(), |_, _, p| {
            Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0).write_to_slice(p)
        });
        let mut u = Patch::zeros(mesh.num_blocks(), 5, mesh.extended());
        conserved_from_primitive(eos, &w, None, &mut u);
        (w, u)
    }

    #[test]
    fn guard_flags_mirror_the_neighboring_block() {
        let mesh = Mesh::uniform(2, (4, 1, 1), 1, [0.1; 3]);
        let mut flags = CorrectionFlags::new(2, mesh.interior().clone(), mesh.extended());
        let z = flags.space.row_major_offset((3, 0, 0));
        flags.data[z] = true;
        flags.fill_guards(|m, index| mesh.chained_along(Axis::I, m, index));

        assert!(flags.get(0, (3, 0, 0)));
        assert!(flags.get(1, (-1, 0, 0)));
        assert!(!flags.get(0, (4, 0, 0)));
        assert!(!flags.get(0, (-1, 0, 0)));
        assert!(!flags.get(1, (-2, 0, 0)));
        assert!(!flags.get(2, (0, 0, 0)));
        assert_eq!(flags.count(), 1);
        assert_eq!(flags.flagged().collect::<Vec<_>>(), vec![(0, (3, 0, 0))]);
        flags.clear();
        assert!(!flags.get(1, (-1, 0, 0)));
        assert_eq!(flags.count(), 0);
    }

    #[test]
    fn negative_predicted_density_repairs_both_faces() {
        let mesh = Mesh::uniform(1, (6, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let (w, u) = uniform(&mesh, &eos);
        let mut fluxes = Fluxes::new(&mesh, 5);
        fluxes.along_mut(Axis::I).unwrap().set(0, 0, (3, 0, 0), 100.0);

        let stage = TimeIntegrator::Rk1.stages()[0];
        let mut fofc = FluxCorrection::new(&mesh);
        let report = fofc.apply(&mesh, &eos, &stage, 0.1, &u, &u, &w, None, &mut fluxes, |_, _| None);

        assert_eq!(report.flagged_cells, 1);
        assert_eq!(report.corrected_faces, 2);
        assert!(fofc.flags().get(0, (2, 0, 0)));
        assert!(fofc.trial_state().get(0, 0, (2, 0, 0)) < 0.0);

        let f = fluxes.along(Axis::I).unwrap();
        assert_eq!(f.get_slice(0, (2, 0, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.get_slice(0, (3, 0, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.get_slice(0, (1, 0, 0)), &[0.0; 5]);
        assert_eq!(f.get_slice(0, (4, 0, 0)), &[0.0; 5]);
    }

    #[test]
    fn physical_predictions_leave_fluxes_alone() {
        let mesh = Mesh::uniform(2, (6, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let (w, u) = uniform(&mesh, &eos);
        let mut fluxes = Fluxes::new(&mesh, 5);
        fluxes.along_mut(Axis::I).unwrap().set(1, 0, (3, 0, 0), 0.1);
        let before = fluxes.clone();

        let stage = TimeIntegrator::Rk2.stages()[1];
        let mut fofc = FluxCorrection::new(&mesh);
        let report = fofc.apply(&mesh, &eos, &stage, 0.1, &u, &u, &w, None, &mut fluxes, |_, _| None);

        assert_eq!(report.flagged_cells, 0);
        assert_eq!(report.corrected_faces, 0);
        assert_eq!(fluxes.along(Axis::I).unwrap().as_slice(), before.along(Axis::I).unwrap().as_slice());
    }

    #[test]
    fn two_dimensional_repair_touches_faces_on_both_axes() {
        let mesh = Mesh::uniform(1, (4, 4, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let (w, u) = uniform(&mesh, &eos);
        let mut fluxes = Fluxes::new(&mesh, 5);
        fluxes.along_mut(Axis::J).unwrap().set(0, 0, (2, 3, 0), 100.0);

        let stage = TimeIntegrator::Rk1.stages()[0];
        let mut fofc = FluxCorrection::new(&mesh);
        let report = fofc.apply(&mesh, &eos, &stage, 0.1, &u, &u, &w, None, &mut fluxes, |_, _| None);

        assert_eq!(report.flagged_cells, 1);
        assert_eq!(report.corrected_faces, 4);
        assert!(fofc.flags().get(0, (2, 2, 0)));

        let fi = fluxes.along(Axis::I).unwrap();
        let fj = fluxes.along(Axis::J).unwrap();
        assert_eq!(fi.get_slice(0, (2, 2, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(fi.get_slice(0, (3, 2, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(fj.get_slice(0, (2, 2, 0)), &[0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(fj.get_slice(0, (2, 3, 0)), &[0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(fi.get_slice(0, (2, 1, 0)), &[0.0; 5]);
    }

    #[test]
    fn block_boundary_face_is_repaired_in_both_blocks() {
        let mesh = Mesh::uniform(2, (4, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let (w, u) = uniform(&mesh, &eos);
        let mut fluxes = Fluxes::new(&mesh, 5);
        {
            let f = fluxes.along_mut(Axis::I).unwrap();
            f.set(0, 0, (4, 0, 0), 100.0);
            f.set(1, 0, (0, 0, 0), 100.0);
        }

        let stage = TimeIntegrator::Rk1.stages()[0];
        let mut fofc = FluxCorrection::new(&mesh);
        let report = fofc.apply(&mesh, &eos, &stage, 0.1, &u, &u, &w, None, &mut fluxes, |m, index| {
            mesh.chained_along(Axis::I, m, index)
        });

        assert_eq!(report.flagged_cells, 1);
        assert_eq!(report.corrected_faces, 3);
        assert_eq!(fofc.flags().flagged().collect::<Vec<_>>(), vec![(0, (3, 0, 0))]);
        assert!(fofc.flags().get(1, (-1, 0, 0)));

        let f = fluxes.along(Axis::I).unwrap();
        assert_eq!(f.get_slice(0, (4, 0, 0)), f.get_slice(1, (0, 0, 0)));
        assert_eq!(f.get_slice(0, (3, 0, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.get_slice(1, (0, 0, 0)), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.get_slice(1, (1, 0, 0)), &[0.0; 5]);
    }

    #[test]
    fn relativistic_repair_uses_the_metric() {
        let mesh = Mesh::uniform(1, (6, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::relativistic(4.0 / 3.0, 1.0);
        let metric = MetricField::from_function(1, mesh.extended(), |_, (i, _, _)| Metric {
            lapse: 1.0 + 0.1 * i as f64,
            ..Metric::minkowski()
        });
        let w = Patch::from_function(1, 5, mesh.extended(), |_, _, p| {
            Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0).write_to_slice(p)
        });
        let mut u = Patch::zeros(1, 5, mesh.extended());
        conserved_from_primitive(&eos, &w, Some(&metric), &mut u);

        let mut fluxes = Fluxes::new(&mesh, 5);
        fluxes.along_mut(Axis::I).unwrap().set(0, 0, (3, 0, 0), 100.0);

        let stage = TimeIntegrator::Rk1.stages()[0];
        let mut fofc = FluxCorrection::new(&mesh);
        let report = fofc.apply(&mesh, &eos, &stage, 0.1, &u, &u, &w, Some(&metric), &mut fluxes, |_, _| None);

        assert_eq!(report.flagged_cells, 1);
        assert_eq!(report.corrected_faces, 2);

        // Static state: the momentum flux is alpha sqrt(g) p with the face lapse.
        let f = fluxes.along(Axis::I).unwrap();
        for (face, lapse) in [(2, 1.15), (3, 1.25)] {
            let g = metric.at_face(0, Axis::I, (face, 0, 0));
            assert!((g.lapse - lapse).abs() < 1e-12);
            assert!(f.get(0, 0, (face, 0, 0)).abs() < 1e-12);
            assert!((f.get(0, 1, (face, 0, 0)) - g.lapse * g.sqrt_determinant() * 1.0).abs() < 1e-12);
        }
    }
}
