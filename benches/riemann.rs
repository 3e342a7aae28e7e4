#![feature(test)]
extern crate test;

use gridflux::config::TimeIntegrator;
use gridflux::hydro::eos::EquationOfState;
use gridflux::hydro::euler::Primitive;
use gridflux::hydro::geometry::Direction;
use gridflux::hydro::metric::Metric;
use gridflux::hydro::riemann::riemann_hlle;
use gridflux::index_space::Axis;
use gridflux::mesh::Mesh;
use gridflux::patch::Patch;
use gridflux::solvers::flux::{compute_fluxes, FaceStates, Fluxes};
use gridflux::solvers::fofc::FluxCorrection;
use gridflux::solvers::update::conserved_from_primitive;

const NI: i64 = 64;
const NJ: i64 = 64;




fn sod_states() -> (Primitive, Primitive) {
    (Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0), Primitive::new(0.125, 0.0, 0.0, 0.0, 0.1))
}

fn blast(mesh: &Mesh) -> Patch {
    Patch::from_function(mesh.num_blocks(), 5, mesh.extended(), |_, (i, j, _), p| {
        let r2 = ((i - NI / 2) * (i - NI / 2) + (j - NJ / 2) * (j - NJ / 2)) as f64;
        let pg = if r2 < 36.0 { 100.0 } else { 1e-3 };
        Primitive::new(1.0, 0.0, 0.0, 0.0, pg).write_to_slice(p)
    })
}




// ============================================================================
#[bench]
fn hlle_newtonian(b: &mut test::Bencher) {
    let eos = EquationOfState::gamma_law(1.4);
    let (pl, pr) = sod_states();
    let g = Metric::minkowski();
    b.iter(|| riemann_hlle(&eos, &pl, &pr, Direction::J, &g).flux);
}




// ============================================================================
#[bench]
fn hlle_relativistic(b: &mut test::Bencher) {
    let eos = EquationOfState::relativistic(4.0 / 3.0, 1.0);
    let (pl, pr) = sod_states();
    let g = Metric { lapse: 0.9, shift: [0.1, 0.0, 0.0], ..Metric::minkowski() };
    b.iter(|| riemann_hlle(&eos, &pl, &pr, Direction::I, &g).flux);
}




// ============================================================================
#[bench]
fn flux_and_correction_pass_2d(b: &mut test::Bencher) {
    let mesh = Mesh::uniform(1, (NI, NJ, 1), 1, [1.0 / NI as f64, 1.0 / NJ as f64, 1.0]);
    let eos = EquationOfState::gamma_law(1.4);
    let primitive = blast(&mesh);
    let mut u = Patch::zeros(1, 5, mesh.extended());
    conserved_from_primitive(&eos, &primitive, None, &mut u);

    let states = [
        FaceStates::piecewise_constant(&mesh, &primitive, Axis::I),
        FaceStates::piecewise_constant(&mesh, &primitive, Axis::J),
    ];
    let stage = TimeIntegrator::Rk1.stages()[0];
    let mut fluxes = Fluxes::new(&mesh, 5);
    let mut correction = FluxCorrection::new(&mesh);

    b.iter(|| {
        compute_fluxes(&eos, &states, None, &mut fluxes);
        correction.apply(&mesh, &eos, &stage, 1e-3, &u, &u, &primitive, None, &mut fluxes, |_, _| None)
    });
}
