use std::ops::Add;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::hydro::eos::EquationOfState;
use crate::hydro::euler::Primitive;
use crate::hydro::geometry::Direction;
use crate::hydro::metric::{Metric, MetricField};
use crate::hydro::riemann::riemann_hlle;
use crate::index_space::{offset_index, Axis};
use crate::mesh::Mesh;
use crate::patch::Patch;




/**
 * Reconstructed primitive states on the faces normal to one axis. Both
 * patches span the mesh face space for that axis: `left` at face `f` is the
 * state extrapolated from cell `f - 1`, `right` the state from cell `f`.
 */
#[derive(Clone, Debug)]
pub struct FaceStates {
    pub axis: Axis,
    pub left: Patch,
    pub right: Patch,
}




// ============================================================================
impl FaceStates {

    /**
     * First-order (piecewise constant) reconstruction: the face states are
     * the adjacent cell values. The primitive patch must include the guard
     * zones of the mesh.
     */
    pub fn piecewise_constant(mesh: &Mesh, primitive: &Patch, axis: Axis) -> Self {
        let space = mesh.face_space(axis);
        let nb = primitive.num_blocks();
        let nq = primitive.num_fields();

        let left = Patch::from_function(nb, nq, space.clone(), |m, index, p| {
            p.copy_from_slice(primitive.get_slice(m, offset_index(index, -1, axis)))
        });
        let right = Patch::from_function(nb, nq, space, |m, index, p| {
            p.copy_from_slice(primitive.get_slice(m, index))
        });
        Self { axis, left, right }
    }
}




/**
 * Face fluxes, one patch per active axis. The patch for axis `a` covers the
 * face space of that axis.
 */
#[derive(Clone, Debug)]
pub struct Fluxes {
    faces: [Option<Patch>; 3],
}




// ============================================================================
impl Fluxes {

    pub fn new(mesh: &Mesh, num_fields: usize) -> Self {
        let patch = |axis| {
            if mesh.is_active(axis) {
                Some(Patch::zeros(mesh.num_blocks(), num_fields, mesh.face_space(axis)))
            } else {
                None
            }
        };
        Self { faces: [patch(Axis::I), patch(Axis::J), patch(Axis::K)] }
    }

    fn slot(axis: Axis) -> usize {
        match axis {
            Axis::I => 0,
            Axis::J => 1,
            Axis::K => 2,
        }
    }

    /// The flux patch normal to `axis`, if that axis is active.
    pub fn along(&self, axis: Axis) -> Option<&Patch> {
        self.faces[Self::slot(axis)].as_ref()
    }

    pub fn along_mut(&mut self, axis: Axis) -> Option<&mut Patch> {
        self.faces[Self::slot(axis)].as_mut()
    }
}




/**
 * Counters gathered by a flux pass.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiemannStats {
    pub faces: u64,

    /// Faces where the Roe-averaged (or characteristic) sound speed radicand
    /// was negative and clipped to zero.
    pub clipped_sound_speed: u64,
}

impl Add for RiemannStats {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            faces: self.faces + other.faces,
            clipped_sound_speed: self.clipped_sound_speed + other.clipped_sound_speed,
        }
    }
}




// ============================================================================
/**
 * Solve the Riemann problem on every face of every block along each axis
 * for which face states are given, writing the HLLE fluxes. Faces are
 * independent, so each axis is a single parallel map over the face space.
 * Relativistic flow uses the face metric from `metric`, or flat space if it
 * is `None`.
 */
pub fn compute_fluxes(
    eos: &EquationOfState,
    states: &[FaceStates],
    metric: Option<&MetricField>,
    fluxes: &mut Fluxes) -> RiemannStats
{
    let mut stats = RiemannStats::default();

    for s in states {
        if let Some(flux) = fluxes.along_mut(s.axis) {
            stats = stats + compute_flux(eos, s, metric, flux)
        }
    }

    if stats.clipped_sound_speed > 0 {
        debug!("clipped {} negative sound speed radicands on {} faces", stats.clipped_sound_speed, stats.faces);
    }
    stats
}

fn compute_flux(eos: &EquationOfState, states: &FaceStates, metric: Option<&MetricField>, flux: &mut Patch) -> RiemannStats {
    let axis = states.axis;
    let direction = Direction::from(axis);

    flux.par_zones_mut()
        .map(|(m, index, f)| {
            let pl = Primitive::from_slice(states.left.get_slice(m, index));
            let pr = Primitive::from_slice(states.right.get_slice(m, index));
            let g = metric.map_or_else(Metric::minkowski, |g| g.at_face(m, axis, index));
            let solution = riemann_hlle(eos, &pl, &pr, direction, &g);
            solution.flux.write_to_slice(f);
            RiemannStats { faces: 1, clipped_sound_speed: solution.clipped as u64 }
        })
        .reduce(RiemannStats::default, |a, b| a + b)
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{compute_fluxes, FaceStates, Fluxes};
    use crate::hydro::eos::EquationOfState;
    use crate::hydro::euler::Primitive;
    use crate::hydro::geometry::Direction;
    use crate::hydro::metric::{Metric, MetricField};
    use crate::index_space::Axis;
    use crate::mesh::Mesh;
    use crate::patch::Patch;

    fn sod(mesh: &Mesh) -> Patch {
        Patch::from_function(mesh.num_blocks(), 5, mesh.extended(), |m, (i, _, _), p| {
            let w = if m == 0 && i < 4 {
                Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0)
            } else {
                Primitive::new(0.125, 0.0, 0.0, 0.0, 0.1)
            };
            w.write_to_slice(p)
        })
    }

    #[test]
    fn face_states_straddle_the_face() {
        let mesh = Mesh::uniform(1, (8, 4, 1), 1, [0.1; 3]);
        let prim = Patch::from_function(1, 5, mesh.extended(), |_, (i, j, _), p| {
            p[0] = (i + 10 * j) as f64;
        });
        let s = FaceStates::piecewise_constant(&mesh, &prim, Axis::J);
        assert_eq!(s.left.get(0, 0, (3, 2, 0)), 13.0);
        assert_eq!(s.right.get(0, 0, (3, 2, 0)), 23.0);
        assert_eq!(s.left.index_space(), &mesh.face_space(Axis::J));
    }

    #[test]
    fn flux_pass_fills_every_face_once() {
        let mesh = Mesh::uniform(2, (8, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let prim = sod(&mesh);
        let states = [FaceStates::piecewise_constant(&mesh, &prim, Axis::I)];
        let mut fluxes = Fluxes::new(&mesh, 5);
        let stats = compute_fluxes(&eos, &states, None, &mut fluxes);

        assert_eq!(stats.faces, 2 * 9);
        assert_eq!(stats.clipped_sound_speed, 0);
        assert!(fluxes.along(Axis::J).is_none());

        let f = fluxes.along(Axis::I).unwrap();
        assert!(f.get(0, 0, (4, 0, 0)) > 0.0);
        assert_eq!(f.get(0, 0, (2, 0, 0)), 0.0);
        assert_eq!(f.get(1, 1, (4, 0, 0)), 0.1);
    }

    #[test]
    fn flux_pass_counts_the_clipped_face() {
        let mesh = Mesh::uniform(3, (4, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let prim = Patch::from_function(3, 5, mesh.extended(), |m, index, p| {
            let pressure = if m == 1 && index == (-1, 0, 0) { -1.0 } else { 0.1 };
            Primitive::new(1.0, 0.0, 0.0, 0.0, pressure).write_to_slice(p)
        });
        let states = [FaceStates::piecewise_constant(&mesh, &prim, Axis::I)];
        let mut fluxes = Fluxes::new(&mesh, 5);
        let stats = compute_fluxes(&eos, &states, None, &mut fluxes);

        assert_eq!(stats.faces, 3 * 5);
        assert_eq!(stats.faces, (mesh.num_blocks() * mesh.face_space(Axis::I).len()) as u64);
        assert_eq!(stats.clipped_sound_speed, 1);
    }

    #[test]
    fn shared_face_holds_one_value_for_both_cells() {
        use crate::hydro::riemann::riemann_hlle;

        let mesh = Mesh::uniform(1, (8, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::gamma_law(1.4);
        let prim = sod(&mesh);
        let states = [FaceStates::piecewise_constant(&mesh, &prim, Axis::I)];
        let mut fluxes = Fluxes::new(&mesh, 5);
        compute_fluxes(&eos, &states, None, &mut fluxes);

        let pl = Primitive::from_slice(prim.get_slice(0, (3, 0, 0)));
        let pr = Primitive::from_slice(prim.get_slice(0, (4, 0, 0)));
        let expected = riemann_hlle(&eos, &pl, &pr, Direction::I, &Metric::minkowski()).flux;
        let stored = fluxes.along(Axis::I).unwrap().get_slice(0, (4, 0, 0));
        assert_eq!(stored, &expected.as_array()[..]);
    }

    #[test]
    fn relativistic_pass_uses_the_face_metric() {
        let mesh = Mesh::uniform(1, (4, 1, 1), 1, [0.1; 3]);
        let eos = EquationOfState::relativistic(4.0 / 3.0, 1.0);
        let prim = Patch::from_function(1, 5, mesh.extended(), |_, _, p| {
            Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0).write_to_slice(p)
        });
        let metric = MetricField::from_function(1, mesh.extended(), |_, (i, _, _)| Metric {
            lapse: 1.0 + 0.1 * i as f64,
            ..Metric::minkowski()
        });
        let states = [FaceStates::piecewise_constant(&mesh, &prim, Axis::I)];
        let mut fluxes = Fluxes::new(&mesh, 5);
        compute_fluxes(&eos, &states, Some(&metric), &mut fluxes);

        // Momentum flux of a static state is alpha sqrt(g) p at the face.
        let f = fluxes.along(Axis::I).unwrap();
        assert!((f.get(0, 1, (2, 0, 0)) - 1.15).abs() < 1e-12);
        assert!(f.get(0, 0, (2, 0, 0)).abs() < 1e-12);
    }
}
